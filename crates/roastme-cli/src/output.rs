//! Terminal rendering for links, sweep reports, and status lines.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tabled::{Table, Tabled};

use roastme_core::types::LinkId;
use roastme_entity::link::Link;
use roastme_worker::SweepReport;

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// A link together with how long it has left, as printed in JSON.
#[derive(Debug, Serialize)]
struct LinkView<'a> {
    #[serde(flatten)]
    link: &'a Link,
    remaining_seconds: i64,
}

/// One link as a table row.
#[derive(Debug, Tabled)]
struct LinkRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Owner")]
    owner: String,
    #[tabled(rename = "Shown as")]
    name: String,
    #[tabled(rename = "Expires (UTC)")]
    expires: String,
    #[tabled(rename = "Time left")]
    remaining: String,
}

impl LinkRow {
    fn new(link: &Link, now: DateTime<Utc>) -> Self {
        Self {
            id: link.id.to_string(),
            owner: link.owner_id.to_string(),
            name: link.owner_display_name.clone(),
            expires: link.expires_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            remaining: format_remaining(link.remaining_at(now)),
        }
    }
}

/// `29m 05s`, `1h 00m`, or `expired` once nothing is left.
pub fn format_remaining(left: Duration) -> String {
    let secs = left.num_seconds();
    match secs {
        s if s <= 0 => "expired".to_string(),
        s if s >= 3600 => format!("{}h {:02}m", s / 3600, (s % 3600) / 60),
        s => format!("{}m {:02}s", s / 60, s % 60),
    }
}

/// Print an owner's links; `now` drives the time-left column.
pub fn print_links(links: &[Link], now: DateTime<Utc>, format: OutputFormat) {
    match format {
        OutputFormat::Table if links.is_empty() => println!("No usable links."),
        OutputFormat::Table => {
            let rows = links.iter().map(|l| LinkRow::new(l, now));
            println!("{}", Table::new(rows));
        }
        OutputFormat::Json => {
            let views: Vec<LinkView<'_>> = links.iter().map(|l| view(l, now)).collect();
            print_json(&views);
        }
    }
}

/// Print a single link.
pub fn print_link(link: &Link, now: DateTime<Utc>, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", Table::new([LinkRow::new(link, now)])),
        OutputFormat::Json => print_json(&view(link, now)),
    }
}

/// Print the shareable ID of a link that was just issued.
pub fn print_issued(id: &LinkId, replaced: Option<&LinkId>, format: OutputFormat) {
    match (format, replaced) {
        (OutputFormat::Json, replaced) => {
            print_json(&serde_json::json!({ "id": id, "replaced": replaced }))
        }
        (OutputFormat::Table, None) => print_success(&format!("Link {id} created")),
        (OutputFormat::Table, Some(old)) => {
            print_success(&format!("Link {old} revoked, replaced by {id}"))
        }
    }
}

/// Print the outcome of an expiry sweep.
pub fn print_sweep(report: &SweepReport, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("Expiry sweep:");
            print_kv("Expired links", &report.expired_links.to_string());
            print_kv("Orphaned sessions", &report.orphan_sessions.to_string());
            print_kv("Failures", &report.failures.to_string());
        }
        OutputFormat::Json => print_json(report),
    }
    if report.failures > 0 {
        print_warning("Some items could not be reclaimed; the next sweep retries them");
    }
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => print_error(&format!("Cannot render JSON: {e}")),
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {msg}");
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    eprintln!("⚠ {msg}");
}

/// Print an error message
pub fn print_error(msg: &str) {
    eprintln!("✗ {msg}");
}

/// Print an indented `key: value` line under a section heading
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {value}", format!("{key}:"));
}

fn view(link: &Link, now: DateTime<Utc>) -> LinkView<'_> {
    LinkView {
        link,
        remaining_seconds: link.remaining_at(now).num_seconds(),
    }
}
