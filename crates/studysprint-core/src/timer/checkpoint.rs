//! Timer checkpoints.
//!
//! A running or paused timer survives process restarts through a small
//! group of per-user keys in the key-value store:
//!
//! ```text
//! timer_<user>_end            countdown end, ms since epoch (running)
//! timer_<user>_mode           mode token, e.g. "short_break"
//! timer_<user>_paused         "true" while paused
//! timer_<user>_seconds        frozen remaining seconds (paused)
//! timer_<user>_session_start  RFC 3339 start of the interval
//! ```
//!
//! The group is written as a whole after every engine command and
//! cleared as a whole on reset and natural completion. Restoring is
//! fail-open: anything missing or unparseable degrades to an idle
//! timer rather than an error, since a broken checkpoint must never
//! block starting a fresh interval.
//!
//! The selected task lives under its own `timer_<user>_selected_task`
//! key so that reset and completion do not unpick the user's choice.

use chrono::{DateTime, TimeZone, Utc};
use tracing::warn;

use super::engine::TimerEngine;
use super::mode::{ModeDurations, TimerMode, TimerPhase};
use crate::error::DatabaseError;
use crate::session::SessionDraft;
use crate::storage::KeyValueStore;

const KEY_END: &str = "end";
const KEY_MODE: &str = "mode";
const KEY_PAUSED: &str = "paused";
const KEY_SECONDS: &str = "seconds";
const KEY_SESSION_START: &str = "session_start";
const KEY_SELECTED_TASK: &str = "selected_task";

fn key(user_id: &str, name: &str) -> String {
    format!("timer_{user_id}_{name}")
}

/// Result of [`restore`]: the rebuilt engine, plus the session a
/// checkpoint that expired while no process was running still owes.
#[derive(Debug)]
pub struct RestoredTimer {
    pub engine: TimerEngine,
    /// Draft for a Focus interval that finished unobserved. The caller
    /// records it; the checkpoint is already cleared so it cannot be
    /// produced twice.
    pub missed: Option<SessionDraft>,
}

/// Write the checkpoint group to match the engine's current phase.
pub fn save(kv: &impl KeyValueStore, engine: &TimerEngine) -> Result<(), DatabaseError> {
    let user = engine.user_id();
    match engine.phase() {
        TimerPhase::Running => {
            if let Some(end) = engine.end_at_ms() {
                kv.set(&key(user, KEY_END), &end.to_string())?;
            }
            kv.set(&key(user, KEY_MODE), engine.mode().as_str())?;
            write_session_start(kv, user, engine.session_started_at())?;
            kv.remove(&key(user, KEY_PAUSED))?;
            kv.remove(&key(user, KEY_SECONDS))?;
        }
        TimerPhase::Paused => {
            kv.set(&key(user, KEY_PAUSED), "true")?;
            kv.set(
                &key(user, KEY_SECONDS),
                &engine.frozen_remaining_secs().to_string(),
            )?;
            kv.set(&key(user, KEY_MODE), engine.mode().as_str())?;
            write_session_start(kv, user, engine.session_started_at())?;
            kv.remove(&key(user, KEY_END))?;
        }
        TimerPhase::Idle => match engine.pending_target() {
            // A skip toggle that has not landed in-process lands here:
            // the next process restores straight into the target mode.
            Some(target) => {
                kv.set(&key(user, KEY_MODE), target.as_str())?;
                kv.remove(&key(user, KEY_END))?;
                kv.remove(&key(user, KEY_PAUSED))?;
                kv.remove(&key(user, KEY_SECONDS))?;
                kv.remove(&key(user, KEY_SESSION_START))?;
            }
            None => clear(kv, user)?,
        },
    }
    Ok(())
}

/// Remove the whole checkpoint group for a user. Leaves the selected
/// task untouched.
pub fn clear(kv: &impl KeyValueStore, user_id: &str) -> Result<(), DatabaseError> {
    for name in [KEY_END, KEY_MODE, KEY_PAUSED, KEY_SECONDS, KEY_SESSION_START] {
        kv.remove(&key(user_id, name))?;
    }
    Ok(())
}

/// Rebuild an engine from the checkpoint group.
///
/// Priority order: a paused flag wins, then a live end instant, then a
/// stale end (which auto-completes the interval), then idle. The saved
/// mode applies in every branch; the configured durations decide the
/// fresh countdown length, not the checkpoint.
pub fn restore(
    kv: &impl KeyValueStore,
    user_id: &str,
    durations: ModeDurations,
    now: DateTime<Utc>,
) -> RestoredTimer {
    let mode = read(kv, user_id, KEY_MODE)
        .and_then(|s| s.parse::<TimerMode>().ok())
        .unwrap_or(TimerMode::Focus);
    let task_id = load_selected_task(kv, user_id);
    let paused = read(kv, user_id, KEY_PAUSED).is_some();
    let seconds = read(kv, user_id, KEY_SECONDS).and_then(|s| s.parse::<u32>().ok());
    let end_at_ms = read(kv, user_id, KEY_END).and_then(|s| s.parse::<u64>().ok());
    let session_started_at = read(kv, user_id, KEY_SESSION_START)
        .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    if paused {
        if let Some(seconds) = seconds.filter(|s| *s > 0) {
            let engine = TimerEngine::restore_paused(
                user_id.to_string(),
                durations,
                mode,
                seconds,
                session_started_at,
                task_id,
            );
            return RestoredTimer {
                engine,
                missed: None,
            };
        }
        warn!(user_id, "paused checkpoint without remaining seconds, dropping");
    }

    if let Some(end) = end_at_ms {
        if end > now.timestamp_millis().max(0) as u64 {
            let engine = TimerEngine::restore_running(
                user_id.to_string(),
                durations,
                mode,
                end,
                session_started_at,
                task_id.clone(),
                now,
            );
            return RestoredTimer {
                engine,
                missed: None,
            };
        }

        // The countdown ran out while nothing was watching. Settle it:
        // emit the session it would have produced and clear the group.
        let missed = mode.is_focus().then(|| {
            let minutes = durations.minutes(TimerMode::Focus);
            let started_at = session_started_at.unwrap_or_else(|| {
                let start_ms = end.saturating_sub(u64::from(minutes) * 60_000);
                Utc.timestamp_millis_opt(start_ms as i64)
                    .single()
                    .unwrap_or(now)
            });
            SessionDraft {
                user_id: user_id.to_string(),
                started_at,
                minutes,
                task_id: task_id.clone(),
            }
        });
        if let Err(err) = clear(kv, user_id) {
            warn!(user_id, %err, "failed to clear expired timer checkpoint");
        }
        let engine = TimerEngine::restore_idle(user_id.to_string(), durations, mode, task_id);
        return RestoredTimer { engine, missed };
    }

    let engine = TimerEngine::restore_idle(user_id.to_string(), durations, mode, task_id);
    RestoredTimer {
        engine,
        missed: None,
    }
}

pub fn save_selected_task(
    kv: &impl KeyValueStore,
    user_id: &str,
    task_id: Option<&str>,
) -> Result<(), DatabaseError> {
    match task_id {
        Some(task_id) => kv.set(&key(user_id, KEY_SELECTED_TASK), task_id),
        None => kv.remove(&key(user_id, KEY_SELECTED_TASK)),
    }
}

pub fn load_selected_task(kv: &impl KeyValueStore, user_id: &str) -> Option<String> {
    read(kv, user_id, KEY_SELECTED_TASK)
}

fn read(kv: &impl KeyValueStore, user_id: &str, name: &str) -> Option<String> {
    match kv.get(&key(user_id, name)) {
        Ok(value) => value,
        Err(err) => {
            warn!(user_id, name, %err, "failed to read timer checkpoint key");
            None
        }
    }
}

fn write_session_start(
    kv: &impl KeyValueStore,
    user_id: &str,
    started_at: Option<DateTime<Utc>>,
) -> Result<(), DatabaseError> {
    match started_at {
        Some(at) => kv.set(&key(user_id, KEY_SESSION_START), &at.to_rfc3339()),
        None => kv.remove(&key(user_id, KEY_SESSION_START)),
    }
}
