//! Integration tests for the timer checkpoint workflow.
//!
//! Each block of commands stands for one short-lived process: restore
//! from the key-value store, act, save, exit. Covers restarts mid-run,
//! a machine that slept past the deadline, and the skip toggle as seen
//! by the next process.

use chrono::{DateTime, Duration, Utc};

use studysprint_core::timer::checkpoint;
use studysprint_core::{
    MemoryKv, ModeDurations, ProgressReport, SessionDraft, TimerEngine, TimerEvent, TimerMode,
    TimerPhase,
};

fn at(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

#[test]
fn test_full_day_across_process_restarts() {
    let kv = MemoryKv::new();
    let durations = ModeDurations::default();
    let mut recorded: Vec<SessionDraft> = Vec::new();

    // 09:00 - first process starts a focus interval and exits.
    let t0 = at("2026-03-02T09:00:00Z");
    let restored = checkpoint::restore(&kv, "u1", durations, t0);
    assert!(restored.missed.is_none());
    let mut engine = restored.engine;
    assert_eq!(engine.phase(), TimerPhase::Idle);
    engine.start(t0);
    checkpoint::save(&kv, &engine).unwrap();
    drop(engine);

    // 09:10 - second process pauses with 15 minutes left.
    let t1 = at("2026-03-02T09:10:00Z");
    let mut engine = checkpoint::restore(&kv, "u1", durations, t1).engine;
    assert_eq!(engine.phase(), TimerPhase::Running);
    assert_eq!(engine.remaining_secs(t1), 900);
    engine.pause(t1);
    checkpoint::save(&kv, &engine).unwrap();
    drop(engine);

    // 11:00 - the pause held the countdown; resume.
    let t2 = at("2026-03-02T11:00:00Z");
    let mut engine = checkpoint::restore(&kv, "u1", durations, t2).engine;
    assert_eq!(engine.phase(), TimerPhase::Paused);
    assert_eq!(engine.remaining_secs(t2), 900);
    assert_eq!(engine.session_started_at(), Some(t0));
    engine.resume(t2);
    checkpoint::save(&kv, &engine).unwrap();
    drop(engine);

    // 11:20 - the countdown ended at 11:15 with no process running.
    // Restoring settles the interval and owes exactly one session.
    let t3 = at("2026-03-02T11:20:00Z");
    let restored = checkpoint::restore(&kv, "u1", durations, t3);
    let missed = restored.missed.clone().expect("expired focus interval owes a session");
    assert_eq!(missed.minutes, 25);
    assert_eq!(missed.started_at, t0);
    recorded.push(missed);
    assert_eq!(restored.engine.phase(), TimerPhase::Idle);
    drop(restored);

    let again = checkpoint::restore(&kv, "u1", durations, t3 + Duration::seconds(1));
    assert!(again.missed.is_none());

    // 12:00 - a fresh focus interval, abandoned five minutes in.
    let t4 = at("2026-03-02T12:00:00Z");
    let mut engine = checkpoint::restore(&kv, "u1", durations, t4).engine;
    engine.start(t4);
    checkpoint::save(&kv, &engine).unwrap();

    let t5 = at("2026-03-02T12:05:00Z");
    match engine.skip(t5) {
        Some(TimerEvent::TimerSkipped {
            session: Some(draft),
            next_mode,
            ..
        }) => {
            assert_eq!(draft.minutes, 0);
            assert_eq!(draft.started_at, t4);
            assert_eq!(next_mode, TimerMode::ShortBreak);
            recorded.push(draft);
        }
        other => panic!("unexpected skip result {other:?}"),
    }
    checkpoint::save(&kv, &engine).unwrap();
    drop(engine);

    // The next process comes up already in the break mode.
    let t6 = at("2026-03-02T12:05:30Z");
    let engine = checkpoint::restore(&kv, "u1", durations, t6).engine;
    assert_eq!(engine.phase(), TimerPhase::Idle);
    assert_eq!(engine.mode(), TimerMode::ShortBreak);
    assert_eq!(engine.remaining_secs(t6), 300);

    // The day produced one full session and one skip marker.
    let sessions: Vec<_> = recorded
        .into_iter()
        .enumerate()
        .map(|(i, draft)| draft.into_session_in(format!("s{i}"), &Utc))
        .collect();
    let report = ProgressReport::compute(&sessions, at("2026-03-02T23:00:00Z").date_naive(), 3);
    assert_eq!(report.totals.total_minutes, 25);
    assert_eq!(report.totals.session_count, 1);
    assert_eq!(report.streak_days, 1);
    assert_eq!(report.recent.len(), 2);
    assert_eq!(report.recent[0].minutes, 0);
}

#[test]
fn test_suspended_machine_completes_on_schedule() {
    let kv = MemoryKv::new();
    let durations = ModeDurations::default();

    let t0 = at("2026-03-02T09:00:00Z");
    let mut engine = TimerEngine::new("u1", durations);
    engine.set_task(Some("task-7".into()));
    checkpoint::save_selected_task(&kv, "u1", Some("task-7")).unwrap();
    engine.start(t0);
    checkpoint::save(&kv, &engine).unwrap();

    // The lid closes; the same process wakes 40 minutes later and the
    // next tick settles the interval against the wall clock.
    let woke = t0 + Duration::minutes(40);
    match engine.tick(woke) {
        Some(TimerEvent::TimerCompleted {
            session: Some(draft),
            ..
        }) => {
            assert_eq!(draft.minutes, 25);
            assert_eq!(draft.task_id.as_deref(), Some("task-7"));
        }
        other => panic!("unexpected tick result {other:?}"),
    }
    checkpoint::save(&kv, &engine).unwrap();

    // The checkpoint is gone but the selected task is not.
    let restored = checkpoint::restore(&kv, "u1", durations, woke + Duration::minutes(1));
    assert!(restored.missed.is_none());
    assert_eq!(restored.engine.phase(), TimerPhase::Idle);
    assert_eq!(restored.engine.task_id(), Some("task-7"));
}

#[test]
fn test_duration_sync_applies_to_idle_restore() {
    let kv = MemoryKv::new();

    let t0 = at("2026-03-02T09:00:00Z");
    let mut engine = TimerEngine::new("u1", ModeDurations::default());
    engine.start(t0);
    engine.pause(t0 + Duration::seconds(10));
    checkpoint::save(&kv, &engine).unwrap();

    // Remote settings change the focus length to 50 minutes. A paused
    // checkpoint keeps its frozen countdown; only the configured total
    // for the next interval changes.
    let longer = ModeDurations {
        focus_minutes: 50,
        short_break_minutes: 5,
        long_break_minutes: 15,
    };
    let restored = checkpoint::restore(&kv, "u1", longer, t0 + Duration::minutes(5));
    assert_eq!(restored.engine.remaining_secs(t0 + Duration::minutes(5)), 1490);
    assert_eq!(restored.engine.total_secs(), 3000);

    // After a reset the new length takes over entirely.
    let mut engine = restored.engine;
    engine.reset(t0 + Duration::minutes(6));
    checkpoint::save(&kv, &engine).unwrap();
    let fresh = checkpoint::restore(&kv, "u1", longer, t0 + Duration::minutes(7));
    assert_eq!(fresh.engine.remaining_secs(t0 + Duration::minutes(7)), 3000);
}
