use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session::SessionDraft;
use crate::timer::{TimerMode, TimerPhase};

/// Every observable timer transition produces an event.
/// The CLI prints them; callers embedding the engine subscribe to them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TimerEvent {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerResumed {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. `session` is present only for Focus
    /// intervals; breaks complete silently.
    TimerCompleted {
        mode: TimerMode,
        session: Option<SessionDraft>,
        at: DateTime<Utc>,
    },
    /// The interval was abandoned. A Focus skip leaves a zero-minute
    /// session draft behind; the mode toggle lands after a short delay.
    TimerSkipped {
        from_mode: TimerMode,
        next_mode: TimerMode,
        session: Option<SessionDraft>,
        at: DateTime<Utc>,
    },
    ModeChanged {
        mode: TimerMode,
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: TimerPhase,
        mode: TimerMode,
        remaining_secs: u32,
        total_secs: u32,
        session_started_at: Option<DateTime<Utc>>,
        task_id: Option<String>,
        at: DateTime<Utc>,
    },
}
