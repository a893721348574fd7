use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use validator::{Validate, ValidationError};

use crate::auth::{FileTokenSource, SharedTokenSource, StaticTokenSource};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const CONFIG_DIR: &str = "config";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AdminConfig {
    /// Base URL of the warehouse admin REST API
    #[validate(custom = "validate_base_url")]
    pub api_base_url: String,

    /// Bearer token value (takes precedence over the token file)
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Path to a file holding the bearer token, re-read on every request
    #[serde(default)]
    pub auth_token_file: Option<PathBuf>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,
}

impl AdminConfig {
    /// Creates a configuration with a static token, mostly for tests and
    /// one-off scripts.
    pub fn with_static_token(api_base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            auth_token: Some(token.into()),
            auth_token_file: None,
            request_timeout_secs: default_request_timeout_secs(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
        }
    }

    /// Builds the token source: inline token first, token file second.
    pub fn token_source(&self) -> Result<SharedTokenSource, AdminConfigError> {
        if let Some(token) = self.auth_token.as_deref().filter(|t| !t.trim().is_empty()) {
            return Ok(Arc::new(StaticTokenSource::new(token)));
        }
        if let Some(path) = &self.auth_token_file {
            return Ok(Arc::new(FileTokenSource::new(path)));
        }
        Err(AdminConfigError::MissingToken)
    }

    /// Gets the request timeout as a Duration
    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AdminConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("No auth token configured. Set PARCELPOINT__AUTH_TOKEN or PARCELPOINT__AUTH_TOKEN_FILE.")]
    MissingToken,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn validate_base_url(value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => Ok(()),
        _ => {
            let mut err = ValidationError::new("api_base_url");
            err.message = Some("Must be a valid http(s) URL".into());
            Err(err)
        }
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("parcelpoint_admin={}", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);

    if json {
        let _ = fmt().with_env_filter(filter_directive).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter_directive).try_init();
    }
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Default config (config/default.toml)
/// 2. Environment-specific config (config/{env}.toml)
/// 3. Environment variables (PARCELPOINT__*)
pub fn load_config() -> Result<AdminConfig, AdminConfigError> {
    let run_env = env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string());
    info!("Loading configuration for environment: {}", run_env);

    if !Path::new(CONFIG_DIR).exists() {
        info!(
            "Config directory '{}' not found; relying on built-in defaults and environment variables",
            CONFIG_DIR
        );
    }

    let config = Config::builder()
        .set_default("api_base_url", "http://localhost:8000")?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("PARCELPOINT").separator("__"))
        .build()?;

    let admin_config: AdminConfig = config.try_deserialize()?;
    admin_config.validate()?;

    info!("Configuration loaded successfully");
    Ok(admin_config)
}
