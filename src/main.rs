use anyhow::Result;
use clap::Parser;
use log::{debug, info};

mod cli;

use cli::Cli;
use cli::app::Commands;
use pms_wizard::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Log to file, truncated on each run
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("pms-wizard.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting pms-wizard");

    // File, then environment, then --base-url
    let mut config = Config::load()?;
    config.apply_env_overrides();
    if let Some(base_url) = &cli.base_url {
        config.set_base_url(base_url)?;
    }
    debug!("Using bridge at {}", config.api.base_url);

    match cli.command {
        Commands::Run(run_args) => {
            cli::commands::run_command(run_args, &config).await?;
        }
        Commands::Pms(pms_args) => {
            cli::commands::pms_command(pms_args, &config).await?;
        }
        Commands::Config(config_args) => {
            cli::commands::config_command(config_args, &config)?;
        }
    }

    Ok(())
}
