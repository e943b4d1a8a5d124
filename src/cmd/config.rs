use clap::{Args, Subcommand};

use crate::config::{ProviderConfig, mask_secret};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Show the effective provider configuration (secrets masked).
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Show => run_show(),
    }
}

fn run_show() -> AppResult<()> {
    let cfg = ProviderConfig::from_env()?;
    for line in describe(&cfg) {
        println!("{line}");
    }
    Ok(())
}

fn describe(cfg: &ProviderConfig) -> Vec<String> {
    vec![
        format!("API key: {}", mask_secret(&cfg.api_key)),
        format!("Base URL: {}", cfg.base_url),
        format!("Endpoint: {}", cfg.endpoint()),
        format!("Model: {}", cfg.model),
        format!("Timeout: {}s", cfg.timeout.as_secs()),
        format!("Temperature: {}", cfg.temperature),
        format!("Max retries: {}", cfg.max_retries),
        format!("Retry delay: {}ms", cfg.retry_delay.as_millis()),
    ]
}
