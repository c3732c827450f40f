//! Link management CLI commands.

use chrono::Utc;
use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use roastme_core::config::AppConfig;
use roastme_core::error::AppError;
use roastme_core::types::{LinkId, OwnerId};
use roastme_service::OwnerProfile;

/// Arguments for link commands
#[derive(Debug, Args)]
pub struct LinkArgs {
    /// Link subcommand
    #[command(subcommand)]
    pub command: LinkCommand,
}

/// Who a new link is issued for
#[derive(Debug, Args)]
pub struct OwnerArgs {
    /// Owner user ID
    #[arg(long)]
    pub owner: String,
    /// Owner display name shown to participants
    #[arg(long)]
    pub name: String,
    /// Owner avatar URL
    #[arg(long, default_value = "")]
    pub avatar: String,
}

impl OwnerArgs {
    fn profile(&self) -> Result<OwnerProfile, AppError> {
        let owner_id: OwnerId = self.owner.parse()?;
        Ok(OwnerProfile::new(
            owner_id,
            self.name.as_str(),
            self.avatar.as_str(),
        ))
    }
}

/// Link subcommands
#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Create a new link
    Create {
        #[command(flatten)]
        owner: OwnerArgs,
    },
    /// Show a link if it is still usable
    Get {
        /// Link ID
        id: String,
    },
    /// List an owner's usable links
    List {
        /// Owner user ID
        #[arg(long)]
        owner: String,
    },
    /// Revoke a link and delete its chat session
    Deactivate {
        /// Link ID
        id: String,
    },
    /// Revoke a link and issue a fresh one for the same owner
    Regenerate {
        /// Link ID to replace
        id: String,
        #[command(flatten)]
        owner: OwnerArgs,
    },
}

/// Execute link commands
pub async fn execute(
    args: &LinkArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let links = super::link_service(config).await?;

    match &args.command {
        LinkCommand::Create { owner } => {
            let id = links.create(&owner.profile()?).await?;
            output::print_issued(&id, None, format);
        }
        LinkCommand::Get { id } => {
            let id: LinkId = id.parse()?;
            let link = links.get(&id).await?.ok_or_else(AppError::session_expired)?;
            output::print_link(&link, Utc::now(), format);
        }
        LinkCommand::List { owner } => {
            let owner_id: OwnerId = owner.parse()?;
            let found = links.list_by_owner(&owner_id).await?;
            output::print_links(&found, Utc::now(), format);
        }
        LinkCommand::Deactivate { id } => {
            let id: LinkId = id.parse()?;
            links.deactivate(&id).await?;
            output::print_success(&format!("Link {id} deactivated"));
        }
        LinkCommand::Regenerate { id, owner } => {
            let old: LinkId = id.parse()?;
            let new = links.regenerate(&old, &owner.profile()?).await?;
            output::print_issued(&new, Some(&old), format);
        }
    }

    Ok(())
}
