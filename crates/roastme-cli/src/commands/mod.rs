//! CLI command definitions and dispatch.

pub mod config;
pub mod link;
pub mod sweep;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::output::{self, OutputFormat};
use roastme_core::config::AppConfig;
use roastme_core::error::AppError;
use roastme_core::types::{Clock, SystemClock};
use roastme_realtime::SessionHub;
use roastme_service::LinkService;
use roastme_store::StoreManager;

/// Roast Me: shareable links that open a short-lived anonymous chat
#[derive(Debug, Parser)]
#[command(name = "roastme", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file (extension optional)
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded from config/<env>
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Link management
    Link(link::LinkArgs),
    /// Run one expiry sweep now
    Sweep,
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config, &self.env)?;
        match &self.command {
            Commands::Link(args) => link::execute(args, &config, self.format).await,
            Commands::Sweep => sweep::execute(&config, self.format).await,
            Commands::Config(args) => config::execute(args, &config, self.format),
        }
    }
}

/// Helper: build the link service against the configured store
pub async fn link_service(config: &AppConfig) -> Result<LinkService, AppError> {
    if config.store.provider == "memory" {
        output::print_warning("Using the in-memory store; nothing persists past this command");
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let stores = StoreManager::new(&config.store, Arc::clone(&clock)).await?;
    Ok(LinkService::new(
        &stores,
        Arc::new(SessionHub::new(config.realtime.channel_capacity)),
        clock,
        config.link.clone(),
    ))
}
