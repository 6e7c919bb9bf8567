use super::commands::config::ConfigCommands;
use super::commands::pms::PmsCommands;
use super::commands::run::RunCommands;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pms-wizard")]
#[command(about = "Onboard a PMS data feed onto RGBridge")]
#[command(version)]
pub struct Cli {
    /// Bridge API base URL (overrides config file and PMS_WIZARD_BASE_URL)
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the interactive onboarding wizard
    Run(RunCommands),
    /// Inspect the PMS registry
    Pms(PmsCommands),
    /// Show or change persistent settings
    Config(ConfigCommands),
}
