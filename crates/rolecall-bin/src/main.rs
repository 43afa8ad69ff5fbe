//! Rolecall - Telegram bot that keeps named roles and pings their members.

mod app;

use std::path::PathBuf;

use clap::Parser;
use rolecall_config_and_utils::{init_logging, Config};
use tracing::{info, warn};

/// Rolecall command-line interface. Flags override the environment.
#[derive(Parser)]
#[command(name = "rolecall")]
#[command(about = "Telegram role bot: group users into roles and ping them together")]
#[command(version)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// SQLite database file
    #[arg(long)]
    database_path: Option<PathBuf>,

    /// Port of the health HTTP server
    #[arg(long)]
    health_port: Option<u16>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(path) = self.database_path {
            config.database_path = path;
        }
        if let Some(port) = self.health_port {
            config.health_port = port;
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let dotenv = dotenvy::dotenv();

    let mut config = Config::from_env()?;
    cli.apply(&mut config);
    init_logging(&config);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if !config.is_production() => {
            warn!(error = %e, "No .env file loaded, using process environment")
        }
        Err(_) => {}
    }

    app::run_bot(config).await
}
