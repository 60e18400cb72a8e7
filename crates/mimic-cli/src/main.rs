mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use mimic_config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries only the document.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = cli::Cli::parse();
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    match cli.command {
        cli::Commands::Redact(args) => {
            let config = Config::load_from(&config_path)?;
            commands::redact::handle(args, config).await
        }
        cli::Commands::Detect(args) => {
            let config = Config::load_from(&config_path)?;
            commands::detect::handle(args, &config).await
        }
        cli::Commands::Config(cmd) => commands::config::handle(cmd, &config_path),
    }
}
