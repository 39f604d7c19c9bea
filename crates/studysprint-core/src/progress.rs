//! Weekly progress aggregation.
//!
//! Pure functions over a slice of [`Session`] records and an explicit
//! `today`. Nothing here reads the clock or talks to a store, which is
//! what keeps week boundaries and streak arithmetic testable.
//!
//! Only qualifying sessions (`minutes > 0`) count toward totals,
//! streaks and the per-day breakdown. Zero-minute skip markers still
//! show up in the recent-activity feed.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Furthest a streak scan walks back from today.
const STREAK_SCAN_DAYS: i64 = 365;

const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// A Monday-through-Sunday window around some day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekWindow {
    pub monday: NaiveDate,
    pub sunday: NaiveDate,
}

impl WeekWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.monday && date <= self.sunday
    }
}

/// The calendar week `today` falls in. Weeks start on Monday.
pub fn week_window(today: NaiveDate) -> WeekWindow {
    let monday = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));
    WeekWindow {
        monday,
        sunday: monday + Duration::days(6),
    }
}

/// Totals for the current week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyTotals {
    pub total_minutes: u32,
    pub session_count: u32,
}

/// Sum of qualifying focus minutes and sessions inside this week.
pub fn weekly_totals(sessions: &[Session], today: NaiveDate) -> WeeklyTotals {
    let window = week_window(today);
    let mut totals = WeeklyTotals::default();
    for session in sessions {
        if session.is_qualifying() && window.contains(session.date) {
            totals.total_minutes += session.minutes;
            totals.session_count += 1;
        }
    }
    totals
}

/// Consecutive days with at least one qualifying session, counting
/// backwards from `today`. A day without study ends the walk, so a
/// missing today means zero. Capped at a year.
pub fn streak_days(sessions: &[Session], today: NaiveDate) -> u32 {
    let studied: HashSet<NaiveDate> = sessions
        .iter()
        .filter(|s| s.is_qualifying())
        .map(|s| s.date)
        .collect();

    let mut streak = 0;
    for offset in 0..STREAK_SCAN_DAYS {
        if studied.contains(&(today - Duration::days(offset))) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// One bucket of the Monday..Sunday breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayMinutes {
    /// Weekday label, "Mon" through "Sun".
    pub label: String,
    pub date: NaiveDate,
    pub minutes: u32,
}

/// Qualifying minutes per day of the current week. Always exactly
/// seven entries, zero-filled for days without study.
pub fn weekly_breakdown(sessions: &[Session], today: NaiveDate) -> Vec<DayMinutes> {
    let window = week_window(today);
    (0..7)
        .map(|offset| {
            let date = window.monday + Duration::days(offset);
            let minutes = sessions
                .iter()
                .filter(|s| s.is_qualifying() && s.date == date)
                .map(|s| s.minutes)
                .sum();
            DayMinutes {
                label: DAY_LABELS[offset as usize].to_string(),
                date,
                minutes,
            }
        })
        .collect()
}

/// Most recent sessions first, skip markers included.
pub fn recent_sessions(sessions: &[Session], limit: usize) -> Vec<Session> {
    let mut recent = sessions.to_vec();
    recent.sort_by(|a, b| b.started_at.cmp(&a.started_at));
    recent.truncate(limit);
    recent
}

/// Everything the progress view needs, bundled for one pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    pub week: WeekWindow,
    pub totals: WeeklyTotals,
    pub streak_days: u32,
    pub breakdown: Vec<DayMinutes>,
    pub recent: Vec<Session>,
}

impl ProgressReport {
    pub const DEFAULT_RECENT_LIMIT: usize = 3;

    pub fn compute(sessions: &[Session], today: NaiveDate, recent_limit: usize) -> Self {
        ProgressReport {
            week: week_window(today),
            totals: weekly_totals(sessions, today),
            streak_days: streak_days(sessions, today),
            breakdown: weekly_breakdown(sessions, today),
            recent: recent_sessions(sessions, recent_limit),
        }
    }
}
