use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};
use crate::domain::records::{PaginationMode, RowLengthPolicy};

/// Prefix for environment overrides, e.g. `CSV_API_PORT=9000`.
pub const ENV_PREFIX: &str = "CSV_API_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    /// CSV file to serve.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[validate(length(min = 1))]
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
    /// Actix worker count; defaults to the number of CPUs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, max = 1024))]
    pub workers: Option<usize>,
    /// Single ASCII field separator.
    #[validate(length(equal = 1))]
    pub delimiter: String,
    pub row_policy: RowLengthPolicy,
    pub pagination: PaginationMode,
    pub cors_permissive: bool,
    #[validate(length(min = 1))]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            file: None,
            host: "127.0.0.1".to_string(),
            port: 8080,
            workers: None,
            delimiter: ",".to_string(),
            row_policy: RowLengthPolicy::default(),
            pagination: PaginationMode::default(),
            cors_permissive: false,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn delimiter_byte(&self) -> Result<u8> {
        match self.delimiter.as_bytes() {
            [byte] if byte.is_ascii() => Ok(*byte),
            _ => Err(AppError::ConfigError(format!(
                "delimiter must be a single ASCII character, got {:?}",
                self.delimiter
            ))),
        }
    }

    pub fn input_file(&self) -> Result<&Path> {
        self.file.as_deref().ok_or_else(|| {
            AppError::ConfigError("no input file; pass --file or set `file`".to_string())
        })
    }
}

/// Values set on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

/// Layered configuration: defaults, then an optional TOML file, then
/// `CSV_API_*` environment variables, then command-line overrides.
pub struct ConfigService {
    figment: Figment,
}

impl ConfigService {
    pub fn new(config_file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(AppError::ConfigError(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        Ok(Self {
            figment: figment.merge(Env::prefixed(ENV_PREFIX)),
        })
    }

    pub fn with_overrides(self, overrides: &ConfigOverrides) -> Self {
        Self {
            figment: self.figment.merge(Serialized::defaults(overrides)),
        }
    }

    /// Extract and validate the merged configuration.
    pub fn load(&self) -> Result<AppConfig> {
        let config: AppConfig = self.figment.extract()?;
        config.validate()?;
        config.delimiter_byte()?;
        Ok(config)
    }
}
