//! Account selection commands.
//!
//! The CLI never authenticates; it pins a backend user id in local
//! config and scopes sessions and tasks to it. Until an account is
//! picked everything records under the `guest` id.

use clap::Subcommand;
use studysprint_core::{NewUser, UserStore};
use tracing::warn;

use crate::common;

#[derive(Subcommand)]
pub enum UserAction {
    /// Create an account on the backend
    Register {
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
    },
    /// Pin the account used by timer, sessions and stats
    Use {
        /// Email address of an existing account
        #[arg(long)]
        email: String,
    },
    /// Show the pinned account
    Show,
}

pub async fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut ctx = common::context()?;

    match action {
        UserAction::Register { name, email } => {
            if ctx.client.find_user_by_email(&email).await?.is_some() {
                return Err(format!("an account already uses {email}").into());
            }
            let user = ctx.client.create_user(NewUser::new(name, email)).await?;
            ctx.config.user.id = user.id.clone();
            ctx.config.save()?;
            common::print_json(&user)?;
        }
        UserAction::Use { email } => {
            let user = ctx
                .client
                .find_user_by_email(&email)
                .await?
                .ok_or_else(|| format!("no account uses {email}"))?;
            ctx.config.user.id = user.id.clone();
            ctx.config.save()?;
            common::print_json(&user)?;
        }
        UserAction::Show => {
            let id = ctx.config.user.id.clone();
            match ctx.client.get_user(&id).await {
                Ok(user) => common::print_json(&user)?,
                Err(err) => {
                    warn!(user_id = %id, %err, "could not fetch the pinned account");
                    common::print_json(&serde_json::json!({ "id": id }))?;
                }
            }
        }
    }
    Ok(())
}
