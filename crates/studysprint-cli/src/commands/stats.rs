//! Weekly progress commands, computed over the (cached) session list.

use chrono::{Local, Utc};
use clap::Subcommand;
use studysprint_core::{CachedSessions, ProgressReport};
use tracing::warn;

use crate::common;

#[derive(Subcommand)]
pub enum StatsAction {
    /// This week's study totals
    Week,
    /// Consecutive study days up to today
    Streak,
    /// Minutes per day, Monday through Sunday
    Breakdown,
    /// Latest recorded activity
    Recent {
        /// Number of entries
        #[arg(long, default_value_t = ProgressReport::DEFAULT_RECENT_LIMIT)]
        limit: usize,
    },
}

pub async fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = common::context()?;
    let user_id = ctx.config.user.id.clone();

    let feed = CachedSessions::new(&ctx.client, &ctx.db)
        .list(&user_id, Utc::now())
        .await;
    if feed.offline {
        match feed.fetched_at {
            Some(at) => warn!(user_id, fetched_at = %at, "showing cached sessions"),
            None => warn!(user_id, "backend unreachable and nothing cached yet"),
        }
    }

    let limit = match action {
        StatsAction::Recent { limit } => limit,
        _ => ProgressReport::DEFAULT_RECENT_LIMIT,
    };
    let today = Local::now().date_naive();
    let report = ProgressReport::compute(&feed.sessions, today, limit);

    match action {
        StatsAction::Week => common::print_json(&serde_json::json!({
            "week": report.week,
            "totals": report.totals,
        })),
        StatsAction::Streak => common::print_json(&serde_json::json!({
            "streak_days": report.streak_days,
        })),
        StatsAction::Breakdown => common::print_json(&report.breakdown),
        StatsAction::Recent { .. } => common::print_json(&report.recent),
    }
}
