//! Backend settings commands.
//!
//! Timer durations live in two places: the local config file drives the
//! engine, and the backend settings document is shared with other clients.
//! `sync` pulls the backend copy into local config, `push` does the reverse.

use clap::Subcommand;
use studysprint_core::SettingsStore;

use crate::common;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show the backend settings document
    Show,
    /// Pull backend durations into local config
    Sync,
    /// Push local durations to the backend
    Push,
}

pub async fn run(action: SettingsAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = common::context()?;
    match action {
        SettingsAction::Show => {
            let settings = ctx.client.fetch_settings().await?;
            common::print_json(&settings)?;
        }
        SettingsAction::Sync => {
            let settings = ctx.client.fetch_settings().await?;
            let durations = settings.durations();
            let mut config = ctx.config;
            config.apply_durations(durations);
            config.save()?;
            println!(
                "Synced durations: focus {}m, short break {}m, long break {}m",
                durations.focus_minutes, durations.short_break_minutes, durations.long_break_minutes
            );
        }
        SettingsAction::Push => {
            // The settings document also carries the theme; fetch first so a
            // push only overwrites the duration fields.
            let mut settings = ctx.client.fetch_settings().await.unwrap_or_default();
            settings.set_durations(ctx.config.mode_durations());
            let saved = ctx.client.save_settings(&settings).await?;
            common::print_json(&saved)?;
        }
    }
    Ok(())
}
