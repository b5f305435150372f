use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use axum::http::HeaderValue;
use serde::Deserialize;

use crate::api::routes::RouteTable;

const ENV_PREFIX: &str = "COMPLAINTS_API";
const DEFAULT_BODY_LIMIT_BYTES: usize = 100 * 1024; // 100 KiB

/// Top-level application configuration loaded from file + environment.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingSection,
    pub cors: CorsSection,
    pub routes: RoutesSection,
}

impl AppConfig {
    /// Load configuration from disk and environment.
    ///
    /// The file path comes from `COMPLAINTS_API_CONFIG` and defaults to
    /// `config.toml`; a missing file is not an error.
    pub fn load() -> Result<Self> {
        let config_path =
            env::var("COMPLAINTS_API_CONFIG").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from(Path::new(&config_path))
    }

    /// Load configuration from an explicit file path, then apply environment
    /// overrides (`COMPLAINTS_API__SECTION__KEY`).
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut builder = config::Config::builder();

        if path.exists() {
            builder = builder.add_source(config::File::from(PathBuf::from(path)));
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("cors.allowed_origins")
                .with_list_parse_key("routes.complaint_mounts"),
        );

        let settings = builder
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;
        let mut config: Self = settings.try_deserialize()?;

        if config.logging.level.trim().is_empty() {
            config.logging.level = "info".to_string();
        }

        config.validate()?;

        Ok(config)
    }

    /// Reject configurations the router cannot be built from.
    pub fn validate(&self) -> Result<()> {
        if self.server.body_limit_bytes == 0 {
            bail!("server.body_limit_bytes must be greater than zero");
        }

        for origin in &self.cors.allowed_origins {
            if origin.trim().is_empty() {
                bail!("cors.allowed_origins must not contain empty entries");
            }
            HeaderValue::from_str(origin)
                .with_context(|| format!("invalid origin in cors.allowed_origins: {origin:?}"))?;
        }

        RouteTable::from_config(&self.routes).context("invalid routes configuration")?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest request body accepted, in bytes.
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSection {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Text,
}

/// Cross-origin settings. An empty origin list allows any origin.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CorsSection {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RoutesSection {
    pub precedence: RoutePrecedence,
    pub catch_all: CatchAllSection,
    /// Prefixes the complaints router is mounted under. `""` or `"/"` mounts
    /// it at the root.
    pub complaint_mounts: Vec<String>,
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self {
            precedence: RoutePrecedence::default(),
            catch_all: CatchAllSection::default(),
            complaint_mounts: vec!["/api".to_string()],
        }
    }
}

/// Which route wins when a complaint mount lies under the catch-all prefix.
#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RoutePrecedence {
    /// Complaint routes are matched before the catch-all.
    #[default]
    MostSpecific,
    /// The catch-all swallows every path under its prefix, complaint mounts
    /// included.
    CatchAllFirst,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatchAllSection {
    pub enabled: bool,
    pub prefix: String,
}

impl Default for CatchAllSection {
    fn default() -> Self {
        Self {
            enabled: true,
            prefix: "/api".to_string(),
        }
    }
}
