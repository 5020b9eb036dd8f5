use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::domain::error::Result;
use crate::infrastructure::bootstrap;
use crate::infrastructure::config::{AppConfig, ConfigOverrides, ConfigService};
use crate::interfaces::http;

#[derive(Parser, Debug)]
#[command(name = "csv-api")]
#[command(about = "Serve a CSV file as a paginated JSON API")]
#[command(version)]
pub struct Cli {
    /// Path to the CSV file
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Optional TOML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl Cli {
    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            file: self.file.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}

/// Resolve configuration, load the dataset and serve until shutdown.
///
/// Configuration and loading errors are returned before the server binds.
pub async fn run(cli: Cli) -> Result<()> {
    let _ = dotenvy::dotenv();

    let config = resolve_config(&cli);
    init_tracing(
        config
            .as_ref()
            .map(|config| config.log_level.as_str())
            .unwrap_or("info"),
    );
    let config = config?;

    let dataset = bootstrap::load_dataset(&config)?;
    let server = http::start_server(dataset, &config)?;
    server.await?;

    info!("HTTP server stopped");
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<AppConfig> {
    ConfigService::new(cli.config.as_deref())?
        .with_overrides(&cli.overrides())
        .load()
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from(["csv-api", "-f", "people.csv", "--port", "9000"]);
        let overrides = cli.overrides();
        assert_eq!(overrides.file, Some(PathBuf::from("people.csv")));
        assert_eq!(overrides.port, Some(9000));
        assert_eq!(overrides.host, None);
    }

    #[test]
    fn test_cli_requires_nothing() {
        let cli = Cli::try_parse_from(["csv-api"]).unwrap();
        assert!(cli.file.is_none());
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_resolve_config_applies_flags() {
        let cli = Cli::parse_from(["csv-api", "--file", "x.csv", "--host", "0.0.0.0"]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.file, Some(PathBuf::from("x.csv")));
    }
}
