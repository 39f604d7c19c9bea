//! Session history commands.

use chrono::Utc;
use clap::Subcommand;
use studysprint_core::progress::recent_sessions;
use studysprint_core::{CachedSessions, SessionStore};
use tracing::warn;

use crate::common;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Recent sessions, newest first
    List {
        /// Number of entries
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete a recorded session
    Clear {
        /// Session id
        id: String,
    },
}

pub async fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = common::context()?;

    match action {
        SessionAction::List { limit, json } => {
            let user_id = ctx.config.user.id.clone();
            let feed = CachedSessions::new(&ctx.client, &ctx.db)
                .list(&user_id, Utc::now())
                .await;
            if feed.offline {
                warn!(user_id, "backend unreachable, listing cached sessions");
            }
            let recent = recent_sessions(&feed.sessions, limit);
            if json {
                common::print_json(&recent)?;
            } else {
                for session in &recent {
                    println!(
                        "{}  {}  {:>4} min  {}",
                        session.date, session.time, session.minutes, session.label
                    );
                }
            }
        }
        SessionAction::Clear { id } => {
            ctx.client.delete_session(&id).await?;
            println!("Session deleted: {id}");
        }
    }
    Ok(())
}
