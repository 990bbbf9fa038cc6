//! Environment-derived configuration.
//!
//! Values are layered, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. Config file (`CONFIG_FILE`, or `./config.yaml` when present)
//! 3. `APP_` prefixed environment variables (e.g. `APP_API__BASE_URL`)
//! 4. Direct overrides: `API_URL` and `APP_ENV`

use config::{Config, Environment, File};
use serde::{Deserialize, Deserializer};
use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Base URL used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub environment: RuntimeEnvironment,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
}

/// Environment mode the application runs in.
///
/// Names match case-insensitively. Unrecognized modes (e.g. `staging`) run as
/// [`Development`](Self::Development), since only production changes behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Production,
    Test,
}

impl RuntimeEnvironment {
    #[must_use]
    pub fn is_production(self) -> bool {
        self == Self::Production
    }
}

impl FromStr for RuntimeEnvironment {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "production" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        })
    }
}

impl<'de> Deserialize<'de> for RuntimeEnvironment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let Ok(mode) = raw.parse::<Self>();
        Ok(mode)
    }
}

impl fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        })
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, reading `.env` first if one exists.
    pub fn load() -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();
        let file = env::var("CONFIG_FILE").ok();
        Self::load_from(file.as_deref().map(Path::new))
    }

    /// Load configuration with an explicit config file instead of `CONFIG_FILE`.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("api.base_url", DEFAULT_API_BASE_URL)?
            .set_default("environment", "development")?;

        match config_file {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None => {
                // Optional project-local file
                builder = builder.add_source(File::with_name("config").required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(val) = env::var("API_URL") {
            builder = builder.set_override("api.base_url", val)?;
        }
        if let Ok(val) = env::var("APP_ENV") {
            builder = builder.set_override("environment", val)?;
        }

        let mut cfg: Self = builder.build()?.try_deserialize()?;

        // An empty URL counts as unset.
        if cfg.api.base_url.trim().is_empty() {
            cfg.api.base_url = DEFAULT_API_BASE_URL.to_string();
        }

        Ok(cfg)
    }
}
