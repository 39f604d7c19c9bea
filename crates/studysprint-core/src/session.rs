//! Study session records.
//!
//! A [`Session`] is one recorded focus interval: either a completed block
//! with its configured minutes, or a zero-minute entry left behind by a
//! skip. The timer engine never builds full records itself; it emits a
//! [`SessionDraft`] and the caller materializes it with an id and the
//! local timezone.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Label attached to a session record, derived from its minutes.
///
/// Labels are never stored free-form: a positive-minute session is a
/// focus session, a zero-minute one is a skip marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionLabel {
    #[serde(rename = "Focus Session")]
    Focus,
    #[serde(rename = "Skipped Session")]
    Skipped,
}

impl SessionLabel {
    pub fn for_minutes(minutes: u32) -> Self {
        if minutes > 0 {
            SessionLabel::Focus
        } else {
            SessionLabel::Skipped
        }
    }
}

impl fmt::Display for SessionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionLabel::Focus => write!(f, "Focus Session"),
            SessionLabel::Skipped => write!(f, "Skipped Session"),
        }
    }
}

/// One recorded focus interval, in the backend's wire shape.
///
/// `date` and `time` are denormalized from `started_at` in the timezone
/// of the machine that recorded the session; aggregation buckets by
/// `date` so a day never splits across a UTC boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Backend-assigned id. Empty only on the way to the server.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    /// Local calendar day the interval started on (YYYY-MM-DD).
    pub date: NaiveDate,
    /// Human-readable local start time, e.g. "09:30 AM".
    pub time: String,
    pub minutes: u32,
    pub label: SessionLabel,
    pub task_id: Option<String>,
}

impl Session {
    /// A session counts toward totals and streaks only if it actually
    /// accumulated focus time.
    pub fn is_qualifying(&self) -> bool {
        self.minutes > 0
    }
}

/// Payload emitted by the timer engine when an interval completes or is
/// skipped. Carries only what the engine knows; everything derived
/// (date, time, label) is filled in by [`SessionDraft::into_session_in`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    pub minutes: u32,
    pub task_id: Option<String>,
}

impl SessionDraft {
    pub fn label(&self) -> SessionLabel {
        SessionLabel::for_minutes(self.minutes)
    }

    /// Materialize the draft into a full record, deriving the calendar
    /// fields in the given timezone. An empty `id` is valid for records
    /// that the backend will assign an id to.
    pub fn into_session_in<Tz: TimeZone>(self, id: String, tz: &Tz) -> Session
    where
        Tz::Offset: fmt::Display,
    {
        let local = self.started_at.with_timezone(tz);
        Session {
            id,
            user_id: self.user_id,
            started_at: self.started_at,
            date: local.date_naive(),
            time: local.format("%I:%M %p").to_string(),
            minutes: self.minutes,
            label: SessionLabel::for_minutes(self.minutes),
            task_id: self.task_id,
        }
    }

    /// [`SessionDraft::into_session_in`] in the system timezone.
    pub fn into_session(self, id: String) -> Session {
        self.into_session_in(id, &Local)
    }
}

/// Calendar day of an instant in the given timezone.
pub fn local_date_in<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}
