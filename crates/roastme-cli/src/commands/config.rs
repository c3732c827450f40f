//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use roastme_core::config::AppConfig;
use roastme_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Check that the configuration loads and validates
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config.clone();
            shown.store.database.url = config.store.database.masked_url();
            match format {
                OutputFormat::Json => output::print_json(&shown),
                OutputFormat::Table => {
                    println!("Link:");
                    output::print_kv("TTL (seconds)", &shown.link.ttl_seconds.to_string());
                    output::print_kv("ID length", &shown.link.id_length.to_string());
                    output::print_kv(
                        "Cascade retries",
                        &format!(
                            "{} (backoff {}ms)",
                            shown.link.cascade_retry_attempts, shown.link.cascade_retry_backoff_ms
                        ),
                    );
                    println!("Store:");
                    output::print_kv("Provider", &shown.store.provider);
                    output::print_kv("Database", &shown.store.database.url);
                    println!("Realtime:");
                    output::print_kv(
                        "Channel capacity",
                        &shown.realtime.channel_capacity.to_string(),
                    );
                    println!("Worker:");
                    output::print_kv("Enabled", &shown.worker.enabled.to_string());
                    output::print_kv("Sweep cron", &shown.worker.sweep_cron);
                    println!("Logging:");
                    output::print_kv("Level", &shown.logging.level);
                    output::print_kv("Format", &shown.logging.format);
                }
            }
        }
        // Loading already validated it.
        ConfigCommand::Validate => output::print_success("Configuration is valid"),
    }

    Ok(())
}
