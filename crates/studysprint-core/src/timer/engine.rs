//! Timer engine implementation.
//!
//! The timer engine is a wall-clock-based state machine. It owns no
//! thread and reads no clock - every transition takes the current
//! instant from the caller, and the caller invokes `tick()` periodically
//! for progress and completion.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> ... -> Idle (completed)
//! ```
//!
//! Remaining time is never decremented. While running the engine stores
//! the instant the countdown ends and recomputes
//! `ceil((end - now) / 1000)` on every query, so a suspended or busy
//! host makes the timer finish exactly on schedule instead of late.
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new("user-1", ModeDurations::default());
//! engine.start(Utc::now());
//! // In a loop:
//! engine.tick(Utc::now()); // Returns Some(TimerCompleted) at zero
//! ```

use chrono::{DateTime, Duration, Utc};

use super::mode::{ModeDurations, TimerMode, TimerPhase};
use crate::events::TimerEvent;
use crate::session::SessionDraft;

/// How long a skip keeps showing the old mode before toggling.
pub const MODE_SWITCH_DELAY_MS: u64 = 1_000;

/// A mode toggle scheduled by `skip`, applied by `tick` once due.
#[derive(Debug, Clone, Copy)]
struct PendingSwitch {
    at_epoch_ms: u64,
    to: TimerMode,
}

/// Core timer engine.
///
/// Operates on caller-supplied instants -- no internal thread, no
/// hidden clock. The caller is responsible for calling `tick()`
/// periodically while the timer runs.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    user_id: String,
    task_id: Option<String>,
    durations: ModeDurations,
    mode: TimerMode,
    phase: TimerPhase,
    /// Authoritative remaining seconds while Idle or Paused.
    remaining_secs: u32,
    /// Instant the countdown ends (ms since epoch), present while Running.
    end_at_ms: Option<u64>,
    /// When the current interval was first started. Survives pause and
    /// resume so the recorded session keeps its true start.
    session_started_at: Option<DateTime<Utc>>,
    pending_switch: Option<PendingSwitch>,
}

impl TimerEngine {
    /// Create an idle engine in Focus mode for the given user.
    pub fn new(user_id: impl Into<String>, durations: ModeDurations) -> Self {
        Self {
            user_id: user_id.into(),
            task_id: None,
            durations,
            mode: TimerMode::Focus,
            phase: TimerPhase::Idle,
            remaining_secs: durations.secs(TimerMode::Focus),
            end_at_ms: None,
            session_started_at: None,
            pending_switch: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn durations(&self) -> ModeDurations {
        self.durations
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session_started_at
    }

    /// Seconds left on the countdown as of `now`.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> u32 {
        match self.end_at_ms {
            Some(end) => remaining_from_end(end, epoch_ms(now)),
            None => self.remaining_secs,
        }
    }

    /// Full length of the current mode's interval.
    pub fn total_secs(&self) -> u32 {
        self.durations.secs(self.mode)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now: DateTime<Utc>) -> TimerEvent {
        TimerEvent::StateSnapshot {
            phase: self.phase,
            mode: self.mode,
            remaining_secs: self.remaining_secs(now),
            total_secs: self.total_secs(),
            session_started_at: self.session_started_at,
            task_id: self.task_id.clone(),
            at: now,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin counting down, or resume if paused. No-op while running.
    pub fn start(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        match self.phase {
            TimerPhase::Running => None,
            TimerPhase::Paused => self.resume(now),
            TimerPhase::Idle => {
                // A due skip toggle lands first; an undue one is
                // overridden by the explicit start.
                if let Some(pending) = self.pending_switch.take() {
                    if epoch_ms(now) >= pending.at_epoch_ms {
                        self.apply_switch(pending.to);
                    }
                }
                let remaining = self.remaining_secs;
                self.session_started_at = Some(now);
                self.end_at_ms = Some(epoch_ms(now) + u64::from(remaining) * 1_000);
                self.phase = TimerPhase::Running;
                Some(TimerEvent::TimerStarted {
                    mode: self.mode,
                    remaining_secs: remaining,
                    at: now,
                })
            }
        }
    }

    /// Freeze the countdown, snapshotting the remaining seconds.
    pub fn pause(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs(now);
        self.end_at_ms = None;
        self.phase = TimerPhase::Paused;
        Some(TimerEvent::TimerPaused {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    /// Continue a paused countdown from its frozen remaining seconds.
    pub fn resume(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Paused {
            return None;
        }
        self.end_at_ms = Some(epoch_ms(now) + u64::from(self.remaining_secs) * 1_000);
        self.phase = TimerPhase::Running;
        Some(TimerEvent::TimerResumed {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    /// Abandon the current interval. A Focus skip leaves a zero-minute
    /// session draft; the Focus<->Short Break toggle is scheduled and
    /// applied by `tick` after [`MODE_SWITCH_DELAY_MS`].
    pub fn skip(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        let from = self.mode;
        let next = from.skip_target();
        let session = from.is_focus().then(|| SessionDraft {
            user_id: self.user_id.clone(),
            started_at: self.session_started_at.unwrap_or(now),
            minutes: 0,
            task_id: self.task_id.clone(),
        });
        self.phase = TimerPhase::Idle;
        self.end_at_ms = None;
        self.session_started_at = None;
        self.remaining_secs = self.durations.secs(from);
        self.pending_switch = Some(PendingSwitch {
            at_epoch_ms: epoch_ms(now) + MODE_SWITCH_DELAY_MS,
            to: next,
        });
        Some(TimerEvent::TimerSkipped {
            from_mode: from,
            next_mode: next,
            session,
            at: now,
        })
    }

    /// Return to Idle with the current mode's full duration. Records
    /// nothing and is safe to call in any phase.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        self.phase = TimerPhase::Idle;
        self.end_at_ms = None;
        self.session_started_at = None;
        self.pending_switch = None;
        self.remaining_secs = self.durations.secs(self.mode);
        Some(TimerEvent::TimerReset {
            mode: self.mode,
            at: now,
        })
    }

    /// Select a different interval kind. Only honored while Idle.
    pub fn set_mode(&mut self, mode: TimerMode, now: DateTime<Utc>) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Idle {
            return None;
        }
        if mode == self.mode && self.pending_switch.is_none() {
            return None;
        }
        self.pending_switch = None;
        self.apply_switch(mode);
        Some(TimerEvent::ModeChanged {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: now,
        })
    }

    /// Install new interval lengths. The visible countdown only follows
    /// immediately while Idle; a running or paused interval keeps the
    /// length it started with.
    pub fn set_durations(&mut self, durations: ModeDurations) {
        self.durations = durations;
        if self.phase == TimerPhase::Idle {
            self.remaining_secs = self.durations.secs(self.mode);
        }
    }

    /// Attach (or clear) the task recorded sessions will reference.
    pub fn set_task(&mut self, task_id: Option<String>) {
        self.task_id = task_id;
    }

    /// Call periodically. Applies a due skip toggle and detects
    /// completion; returns the resulting event, if any.
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<TimerEvent> {
        if let Some(pending) = self.pending_switch {
            if epoch_ms(now) >= pending.at_epoch_ms {
                self.pending_switch = None;
                self.apply_switch(pending.to);
                return Some(TimerEvent::ModeChanged {
                    mode: self.mode,
                    remaining_secs: self.remaining_secs,
                    at: now,
                });
            }
        }
        if self.phase != TimerPhase::Running {
            return None;
        }
        if self.remaining_secs(now) > 0 {
            return None;
        }
        Some(self.complete(now))
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete(&mut self, now: DateTime<Utc>) -> TimerEvent {
        let mode = self.mode;
        let session = mode.is_focus().then(|| {
            let minutes = self.durations.minutes(mode);
            let started_at = self
                .session_started_at
                .unwrap_or_else(|| now - Duration::seconds(i64::from(minutes) * 60));
            SessionDraft {
                user_id: self.user_id.clone(),
                started_at,
                minutes,
                task_id: self.task_id.clone(),
            }
        });
        self.phase = TimerPhase::Idle;
        self.end_at_ms = None;
        self.session_started_at = None;
        self.remaining_secs = self.durations.secs(mode);
        TimerEvent::TimerCompleted {
            mode,
            session,
            at: now,
        }
    }

    fn apply_switch(&mut self, mode: TimerMode) {
        self.mode = mode;
        self.remaining_secs = self.durations.secs(mode);
    }

    // ── Checkpoint plumbing ──────────────────────────────────────────

    pub(crate) fn end_at_ms(&self) -> Option<u64> {
        self.end_at_ms
    }

    /// Remaining seconds while not running, where no clock is needed.
    pub(crate) fn frozen_remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    /// Target of a scheduled skip toggle that has not landed yet. A
    /// fresh process restores straight into this mode.
    pub(crate) fn pending_target(&self) -> Option<TimerMode> {
        self.pending_switch.map(|p| p.to)
    }

    pub(crate) fn restore_running(
        user_id: String,
        durations: ModeDurations,
        mode: TimerMode,
        end_at_ms: u64,
        session_started_at: Option<DateTime<Utc>>,
        task_id: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            task_id,
            durations,
            mode,
            phase: TimerPhase::Running,
            remaining_secs: remaining_from_end(end_at_ms, epoch_ms(now)),
            end_at_ms: Some(end_at_ms),
            session_started_at,
            pending_switch: None,
        }
    }

    pub(crate) fn restore_paused(
        user_id: String,
        durations: ModeDurations,
        mode: TimerMode,
        remaining_secs: u32,
        session_started_at: Option<DateTime<Utc>>,
        task_id: Option<String>,
    ) -> Self {
        Self {
            user_id,
            task_id,
            durations,
            mode,
            phase: TimerPhase::Paused,
            remaining_secs,
            end_at_ms: None,
            session_started_at,
            pending_switch: None,
        }
    }

    pub(crate) fn restore_idle(
        user_id: String,
        durations: ModeDurations,
        mode: TimerMode,
        task_id: Option<String>,
    ) -> Self {
        Self {
            user_id,
            task_id,
            durations,
            mode,
            phase: TimerPhase::Idle,
            remaining_secs: durations.secs(mode),
            end_at_ms: None,
            session_started_at: None,
            pending_switch: None,
        }
    }
}

fn epoch_ms(at: DateTime<Utc>) -> u64 {
    at.timestamp_millis().max(0) as u64
}

fn remaining_from_end(end_ms: u64, now_ms: u64) -> u32 {
    end_ms
        .saturating_sub(now_ms)
        .div_ceil(1_000)
        .min(u64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn focus_engine() -> TimerEngine {
        TimerEngine::new("u1", ModeDurations::default())
    }

    #[test]
    fn full_focus_interval_records_session() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();

        assert!(engine.start(t0).is_some());
        assert_eq!(engine.phase(), TimerPhase::Running);
        assert_eq!(engine.remaining_secs(t0), 1500);

        // Nothing happens mid-flight.
        assert!(engine.tick(t0 + Duration::minutes(10)).is_none());

        let done = engine.tick(t0 + Duration::seconds(1500));
        match done {
            Some(TimerEvent::TimerCompleted {
                mode,
                session: Some(session),
                ..
            }) => {
                assert_eq!(mode, TimerMode::Focus);
                assert_eq!(session.minutes, 25);
                assert_eq!(session.started_at, t0);
                assert_eq!(session.user_id, "u1");
                assert_eq!(session.task_id, None);
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(engine.phase(), TimerPhase::Idle);
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert_eq!(engine.remaining_secs(t0 + Duration::seconds(1500)), 1500);
    }

    #[test]
    fn remaining_is_recomputed_from_the_clock() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.start(t0);

        assert_eq!(engine.remaining_secs(t0 + Duration::seconds(1)), 1499);

        let paused = engine.pause(t0 + Duration::seconds(3));
        match paused {
            Some(TimerEvent::TimerPaused { remaining_secs, .. }) => {
                assert_eq!(remaining_secs, 1497)
            }
            other => panic!("expected pause, got {other:?}"),
        }

        // A minute of wall time passes while paused; nothing is lost.
        let t1 = t0 + Duration::seconds(60);
        engine.resume(t1);
        assert_eq!(engine.remaining_secs(t1 + Duration::seconds(2)), 1495);
    }

    #[test]
    fn suspension_completes_on_schedule() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.start(t0);

        // Host slept well past the end; first tick afterwards completes.
        let late = t0 + Duration::minutes(40);
        assert_eq!(engine.remaining_secs(late), 0);
        match engine.tick(late) {
            Some(TimerEvent::TimerCompleted {
                session: Some(session),
                ..
            }) => assert_eq!(session.minutes, 25),
            other => panic!("expected completion, got {other:?}"),
        }
        // And only once.
        assert!(engine.tick(late + Duration::seconds(1)).is_none());
    }

    #[test]
    fn partial_second_rounds_up() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.start(t0);
        // 400ms in: 1499.6s left, displayed as 1500.
        assert_eq!(
            engine.remaining_secs(t0 + Duration::milliseconds(400)),
            1500
        );
        assert_eq!(
            engine.remaining_secs(t0 + Duration::milliseconds(1400)),
            1499
        );
    }

    #[test]
    fn skip_records_zero_minutes_and_toggles_after_delay() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.start(t0);

        let skipped = engine.skip(t0 + Duration::seconds(5));
        match skipped {
            Some(TimerEvent::TimerSkipped {
                from_mode,
                next_mode,
                session: Some(session),
                ..
            }) => {
                assert_eq!(from_mode, TimerMode::Focus);
                assert_eq!(next_mode, TimerMode::ShortBreak);
                assert_eq!(session.minutes, 0);
                assert_eq!(session.started_at, t0);
            }
            other => panic!("expected skip, got {other:?}"),
        }
        assert_eq!(engine.phase(), TimerPhase::Idle);
        // Old mode and duration are still showing within the delay.
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert_eq!(engine.remaining_secs(t0 + Duration::seconds(5)), 1500);
        assert!(engine.tick(t0 + Duration::milliseconds(5_500)).is_none());

        let toggled = engine.tick(t0 + Duration::milliseconds(6_100));
        match toggled {
            Some(TimerEvent::ModeChanged {
                mode,
                remaining_secs,
                ..
            }) => {
                assert_eq!(mode, TimerMode::ShortBreak);
                assert_eq!(remaining_secs, 300);
            }
            other => panic!("expected mode change, got {other:?}"),
        }
    }

    #[test]
    fn skip_from_break_records_nothing() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.set_mode(TimerMode::ShortBreak, t0);
        engine.start(t0);
        match engine.skip(t0 + Duration::seconds(10)) {
            Some(TimerEvent::TimerSkipped {
                session, next_mode, ..
            }) => {
                assert!(session.is_none());
                assert_eq!(next_mode, TimerMode::Focus);
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn long_break_skip_returns_to_focus() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.set_mode(TimerMode::LongBreak, t0);
        match engine.skip(t0) {
            Some(TimerEvent::TimerSkipped {
                next_mode, session, ..
            }) => {
                assert_eq!(next_mode, TimerMode::Focus);
                assert!(session.is_none());
            }
            other => panic!("expected skip, got {other:?}"),
        }
    }

    #[test]
    fn commands_in_wrong_phase_are_noops() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();

        assert!(engine.pause(t0).is_none());
        assert!(engine.resume(t0).is_none());

        engine.start(t0);
        assert!(engine.start(t0 + Duration::seconds(1)).is_none());

        let before = engine.remaining_secs(t0 + Duration::seconds(2));
        assert!(engine.resume(t0 + Duration::seconds(2)).is_none());
        assert_eq!(engine.remaining_secs(t0 + Duration::seconds(2)), before);
    }

    #[test]
    fn reset_is_idempotent() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.start(t0);

        assert!(engine.reset(t0 + Duration::seconds(30)).is_some());
        assert_eq!(engine.phase(), TimerPhase::Idle);
        assert_eq!(engine.remaining_secs(t0 + Duration::seconds(30)), 1500);

        assert!(engine.reset(t0 + Duration::seconds(31)).is_some());
        assert_eq!(engine.phase(), TimerPhase::Idle);
        assert_eq!(engine.remaining_secs(t0 + Duration::seconds(31)), 1500);
        assert!(engine.session_started_at().is_none());
    }

    #[test]
    fn mode_change_is_idle_only() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();

        engine.start(t0);
        assert!(engine.set_mode(TimerMode::ShortBreak, t0).is_none());
        assert_eq!(engine.mode(), TimerMode::Focus);

        engine.pause(t0 + Duration::seconds(10));
        assert!(engine.set_mode(TimerMode::ShortBreak, t0).is_none());

        engine.reset(t0 + Duration::seconds(11));
        let changed = engine.set_mode(TimerMode::LongBreak, t0 + Duration::seconds(12));
        match changed {
            Some(TimerEvent::ModeChanged {
                mode,
                remaining_secs,
                ..
            }) => {
                assert_eq!(mode, TimerMode::LongBreak);
                assert_eq!(remaining_secs, 900);
            }
            other => panic!("expected mode change, got {other:?}"),
        }
        // Re-selecting the current mode does nothing.
        assert!(engine
            .set_mode(TimerMode::LongBreak, t0 + Duration::seconds(13))
            .is_none());
    }

    #[test]
    fn break_completion_emits_no_session() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.set_mode(TimerMode::ShortBreak, t0);
        engine.start(t0);
        match engine.tick(t0 + Duration::seconds(300)) {
            Some(TimerEvent::TimerCompleted { mode, session, .. }) => {
                assert_eq!(mode, TimerMode::ShortBreak);
                assert!(session.is_none());
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn duration_changes_only_reshape_idle_timers() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();

        let longer = ModeDurations {
            focus_minutes: 30,
            ..ModeDurations::default()
        };
        engine.set_durations(longer);
        assert_eq!(engine.remaining_secs(t0), 1800);

        engine.start(t0);
        engine.pause(t0 + Duration::seconds(60));
        engine.set_durations(ModeDurations::default());
        // Paused remaining is preserved.
        assert_eq!(engine.remaining_secs(t0 + Duration::seconds(60)), 1740);
    }

    #[test]
    fn start_overrides_an_undue_skip_toggle() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.skip(t0);

        // Restarted before the toggle landed: still Focus.
        engine.start(t0 + Duration::milliseconds(200));
        assert_eq!(engine.mode(), TimerMode::Focus);
        assert_eq!(engine.phase(), TimerPhase::Running);
        assert!(engine.tick(t0 + Duration::seconds(2)).is_none());
    }

    #[test]
    fn start_after_the_delay_lands_in_the_next_mode() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.skip(t0);

        let started = engine.start(t0 + Duration::seconds(3));
        match started {
            Some(TimerEvent::TimerStarted {
                mode,
                remaining_secs,
                ..
            }) => {
                assert_eq!(mode, TimerMode::ShortBreak);
                assert_eq!(remaining_secs, 300);
            }
            other => panic!("expected start, got {other:?}"),
        }
    }

    #[test]
    fn completed_session_keeps_selected_task() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.set_task(Some("task-7".into()));
        engine.start(t0);
        match engine.tick(t0 + Duration::seconds(1500)) {
            Some(TimerEvent::TimerCompleted {
                session: Some(session),
                ..
            }) => assert_eq!(session.task_id.as_deref(), Some("task-7")),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn pause_resume_keeps_session_start() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.start(t0);
        engine.pause(t0 + Duration::seconds(100));
        engine.resume(t0 + Duration::seconds(400));
        assert_eq!(engine.session_started_at(), Some(t0));

        // 1400s still to run after the resume.
        match engine.tick(t0 + Duration::seconds(1800)) {
            Some(TimerEvent::TimerCompleted {
                session: Some(session),
                ..
            }) => assert_eq!(session.started_at, t0),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn snapshot_reflects_live_remaining() {
        let t0 = at("2026-03-02T09:00:00Z");
        let mut engine = focus_engine();
        engine.start(t0);
        match engine.snapshot(t0 + Duration::seconds(10)) {
            TimerEvent::StateSnapshot {
                phase,
                mode,
                remaining_secs,
                total_secs,
                ..
            } => {
                assert_eq!(phase, TimerPhase::Running);
                assert_eq!(mode, TimerMode::Focus);
                assert_eq!(remaining_secs, 1490);
                assert_eq!(total_secs, 1500);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }
}
