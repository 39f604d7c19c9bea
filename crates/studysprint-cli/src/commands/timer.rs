//! Timer control commands.
//!
//! Every invocation restores the engine from the checkpoint group,
//! applies one command, and writes the checkpoint back, so the timer
//! lives across processes. A checkpoint that expired between
//! invocations settles first: its session is recorded before the
//! command runs.

use std::io::Write;

use chrono::Utc;
use clap::Subcommand;
use studysprint_core::timer::checkpoint;
use studysprint_core::{
    SessionDraft, SessionStore, TimerEngine, TimerEvent, TimerMode, TimerPhase,
};
use tracing::warn;

use crate::common::{self, Context};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start the countdown in the current mode
    Start {
        /// Record the interval against this task id
        #[arg(long)]
        task: Option<String>,
    },
    /// Pause a running countdown
    Pause,
    /// Resume a paused countdown
    Resume,
    /// Abandon the interval; the paired mode takes over after a moment
    Skip,
    /// Return to an idle, full countdown
    Reset,
    /// Select the mode for the next interval (idle only)
    Mode {
        /// One of: focus, short_break, long_break
        mode: TimerMode,
    },
    /// Tick once and print the timer state as JSON
    Status,
    /// Poll the countdown until it completes
    Watch,
}

pub async fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = common::context()?;
    let user_id = ctx.config.user.id.clone();
    let durations = ctx.config.mode_durations();

    let restored = checkpoint::restore(&ctx.db, &user_id, durations, Utc::now());
    let mut engine = restored.engine;
    if let Some(draft) = restored.missed {
        record_session(&ctx, draft).await;
    }

    match action {
        TimerAction::Start { task } => {
            if let Some(task) = task {
                let task_id = (!task.is_empty()).then_some(task);
                checkpoint::save_selected_task(&ctx.db, &user_id, task_id.as_deref())?;
                engine.set_task(task_id);
            }
            let event = engine.start(Utc::now());
            report(&engine, event)?;
        }
        TimerAction::Pause => {
            let event = engine.pause(Utc::now());
            report(&engine, event)?;
        }
        TimerAction::Resume => {
            let event = engine.resume(Utc::now());
            report(&engine, event)?;
        }
        TimerAction::Skip => {
            let event = engine.skip(Utc::now());
            if let Some(TimerEvent::TimerSkipped {
                session: Some(draft),
                ..
            }) = &event
            {
                record_session(&ctx, draft.clone()).await;
            }
            report(&engine, event)?;
        }
        TimerAction::Reset => {
            let event = engine.reset(Utc::now());
            report(&engine, event)?;
        }
        TimerAction::Mode { mode } => {
            let event = engine.set_mode(mode, Utc::now());
            report(&engine, event)?;
        }
        TimerAction::Status => {
            let now = Utc::now();
            let event = engine.tick(now);
            if let Some(TimerEvent::TimerCompleted {
                session: Some(draft),
                ..
            }) = &event
            {
                record_session(&ctx, draft.clone()).await;
            }
            common::print_json(&engine.snapshot(now))?;
            if let Some(event) = event {
                common::print_json(&event)?;
            }
        }
        TimerAction::Watch => {
            watch(&ctx, &mut engine).await?;
        }
    }

    checkpoint::save(&ctx.db, &engine)?;
    Ok(())
}

/// Print the transition event, or the current snapshot when the
/// command was a no-op.
fn report(
    engine: &TimerEngine,
    event: Option<TimerEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => common::print_json(&event),
        None => common::print_json(&engine.snapshot(Utc::now())),
    }
}

/// Sessions are recorded fire-and-forget: a dead backend must never
/// block the timer.
async fn record_session(ctx: &Context, draft: SessionDraft) {
    if let Err(err) = ctx.client.create_session(draft).await {
        warn!(%err, "failed to record session");
    }
}

async fn watch(
    ctx: &Context,
    engine: &mut TimerEngine,
) -> Result<(), Box<dyn std::error::Error>> {
    if engine.phase() != TimerPhase::Running {
        common::print_json(&engine.snapshot(Utc::now()))?;
        return Ok(());
    }

    loop {
        let now = Utc::now();
        if let Some(event) = engine.tick(now) {
            if let TimerEvent::TimerCompleted {
                session: Some(draft),
                ..
            } = &event
            {
                record_session(ctx, draft.clone()).await;
            }
            println!();
            common::print_json(&event)?;
        }
        if engine.phase() != TimerPhase::Running {
            break;
        }
        print!(
            "\r{} {}  ",
            engine.mode(),
            common::format_clock(engine.remaining_secs(now))
        );
        std::io::stdout().flush()?;
        tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    }
    Ok(())
}
