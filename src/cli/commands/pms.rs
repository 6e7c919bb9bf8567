//! PMS registry listing

use crate::cli::ui::with_spinner;
use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::*;
use pms_wizard::api::{BridgeBackend, BridgeClient, PmsRecord};
use pms_wizard::config::Config;

#[derive(Args)]
pub struct PmsCommands {
    #[command(subcommand)]
    pub command: PmsSubcommands,
}

#[derive(Subcommand)]
pub enum PmsSubcommands {
    /// List registered PMS
    List,
}

pub async fn pms_command(args: PmsCommands, config: &Config) -> Result<()> {
    match args.command {
        PmsSubcommands::List => list_command(config).await,
    }
}

async fn list_command(config: &Config) -> Result<()> {
    let client = BridgeClient::from_settings(&config.api).context("Failed to create bridge client")?;

    let records = with_spinner("Loading PMS registry...", client.list_pms())
        .await
        .with_context(|| format!("Failed to list PMS from {}", client.base_url()))?;

    print_registry(&records);
    Ok(())
}

pub fn print_registry(records: &[PmsRecord]) {
    println!();
    println!("  {}", "Registered PMS".bright_blue().bold());
    println!("  {}", "══════════════".bright_blue());

    if records.is_empty() {
        println!("  {}", "No PMS registered yet".dimmed());
        return;
    }

    for record in records {
        let status = record.status.as_deref().unwrap_or("unknown");
        let status = if status.eq_ignore_ascii_case("active") {
            status.bright_green()
        } else {
            status.yellow()
        };

        println!("  {} {} {}", "●".bright_green(), record.code.bright_white().bold(), record.name.dimmed());
        println!("    {}: {}", "Status".dimmed(), status);
        if record.combined_avail_rate == Some(true) {
            println!("    {}: {}", "Messages".dimmed(), "combined availability/rate".cyan());
        }
        if let Some(description) = record.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    {}: {}", "Description".dimmed(), description);
        }
    }
}
