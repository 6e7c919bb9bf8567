//! Persistent settings

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::*;
use pms_wizard::config::{Config, ENV_BASE_URL, ENV_TIMEOUT_SECS};
use pms_wizard::wizard::ReplayPolicy;

#[derive(Args)]
pub struct ConfigCommands {
    #[command(subcommand)]
    pub command: ConfigSubcommands,
}

#[derive(Subcommand)]
pub enum ConfigSubcommands {
    /// Show the effective settings
    Show,
    /// Set and persist the bridge API base URL
    SetBaseUrl {
        /// e.g. http://localhost:8000/api/v1
        url: String,
    },
}

/// `effective` already carries env and flag overrides; writes go to the file
pub fn config_command(args: ConfigCommands, effective: &Config) -> Result<()> {
    match args.command {
        ConfigSubcommands::Show => {
            show_command(effective)?;
        }
        ConfigSubcommands::SetBaseUrl { url } => {
            let mut stored = Config::load()?;
            stored.set_base_url(&url)?;
            stored.save()?;
            println!("  {} {}", "✓ Base URL set to".bright_green().bold(), stored.api.base_url.cyan());
        }
    }
    Ok(())
}

fn show_command(config: &Config) -> Result<()> {
    let path = Config::get_config_path()?;
    let policy = match config.wizard.replay_policy {
        ReplayPolicy::ResumeFromFailure => "resume",
        ReplayPolicy::ReplayAll => "replay_all",
    };

    println!();
    println!("  {}", "PMS Wizard Settings".bright_blue().bold());
    println!("  {}", "═══════════════════".bright_blue());
    println!("  {}: {}", "Config file".dimmed(), path.display().to_string().cyan());
    println!();
    println!("  {}", "[api]".bright_white().bold());
    println!("    {}: {}", "base_url".dimmed(), config.api.base_url.cyan());
    println!("    {}: {}s", "timeout_secs".dimmed(), config.api.timeout_secs);
    println!("    {}: {}s", "connect_timeout_secs".dimmed(), config.api.connect_timeout_secs);
    println!();
    println!("  {}", "[wizard]".bright_white().bold());
    println!("    {}: {}", "replay_policy".dimmed(), policy.bright_yellow());
    match &config.wizard.export_dir {
        Some(dir) => println!("    {}: {}", "export_dir".dimmed(), dir.display()),
        None => println!("    {}: {}", "export_dir".dimmed(), "not set".dimmed()),
    }
    println!();
    println!(
        "  {}",
        format!("Environment overrides: {}, {}", ENV_BASE_URL, ENV_TIMEOUT_SECS).dimmed()
    );
    Ok(())
}
