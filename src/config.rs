use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::{error, info};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";
const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 10;
const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base URL of the managed Postgres REST interface
    #[validate(url)]
    pub supabase_url: String,

    /// Service-role key (preferred; full access)
    #[serde(default)]
    pub supabase_service_role_key: Option<String>,

    /// Anon key (fallback when no service-role key is configured)
    #[serde(default)]
    pub supabase_anon_key: Option<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// CORS: comma-separated list of allowed origins. When unset the service
    /// answers with `Access-Control-Allow-Origin: *` on every response.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Timeout (seconds) applied uniformly to every outbound upstream call
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// Allow the configured fallback username as the last resolution
    /// strategy on variation assignment
    #[serde(default)]
    pub allow_cross_user_operations: bool,

    /// Fallback username used when cross-user operations are allowed
    #[serde(default)]
    pub fallback_username: Option<String>,

    /// Lifetime (seconds) of issued session tokens
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl AppConfig {
    /// Key used on outbound upstream calls: service-role key preferred,
    /// anon key as fallback.
    pub fn api_key(&self) -> Option<&str> {
        self.supabase_service_role_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                self.supabase_anon_key
                    .as_deref()
                    .filter(|k| !k.trim().is_empty())
            })
    }

    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }

    pub fn upstream_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.upstream_timeout_secs)
    }

    pub fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.api_key().is_none() {
            let mut err = ValidationError::new("supabase_key_required");
            err.message = Some(
                "Set APP__SUPABASE_SERVICE_ROLE_KEY (preferred) or APP__SUPABASE_ANON_KEY".into(),
            );
            errors.add("supabase_service_role_key", err);
        }

        if self.is_production()
            && self.supabase_service_role_key.is_none()
            && self.supabase_anon_key.is_some()
        {
            info!("Running in production with the anon key; row-level security applies upstream");
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_upstream_timeout_secs() -> u64 {
    DEFAULT_UPSTREAM_TIMEOUT_SECS
}

fn default_token_ttl_secs() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::fmt;

    let default_directive = format!("foodcourt_api={},tower_http=debug", level);
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
/// 3. Environment variables (APP__*)
pub fn load_config() -> Result<AppConfig, AppConfigError> {
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
        .set_default("supabase_url", "http://localhost:54321/rest/v1")?
        .set_default("host", "0.0.0.0")?
        .set_default("port", DEFAULT_PORT as i64)?
        .set_default("environment", DEFAULT_ENV)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&format!("{}/default", CONFIG_DIR)).required(false))
        .add_source(File::with_name(&format!("{}/{}", CONFIG_DIR, run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    app_config.validate_additional_constraints().map_err(|e| {
        error!("Configuration validation failed: {:?}", e);
        AppConfigError::Validation(e)
    })?;

    info!("Configuration loaded successfully");
    Ok(app_config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> AppConfig {
        AppConfig {
            supabase_url: "http://localhost:54321/rest/v1".into(),
            supabase_service_role_key: Some("service-role".into()),
            supabase_anon_key: Some("anon".into()),
            host: "127.0.0.1".into(),
            port: 8080,
            environment: "development".into(),
            log_level: default_log_level(),
            log_json: false,
            cors_allowed_origins: None,
            upstream_timeout_secs: default_upstream_timeout_secs(),
            allow_cross_user_operations: false,
            fallback_username: None,
            token_ttl_secs: default_token_ttl_secs(),
        }
    }

    #[test]
    fn service_role_key_preferred() {
        let cfg = base_config();
        assert_eq!(cfg.api_key(), Some("service-role"));
    }

    #[test]
    fn anon_key_used_as_fallback() {
        let mut cfg = base_config();
        cfg.supabase_service_role_key = None;
        assert_eq!(cfg.api_key(), Some("anon"));
    }

    #[test]
    fn blank_service_role_key_falls_through() {
        let mut cfg = base_config();
        cfg.supabase_service_role_key = Some("   ".into());
        assert_eq!(cfg.api_key(), Some("anon"));
    }

    #[test]
    fn missing_keys_fail_validation() {
        let mut cfg = base_config();
        cfg.supabase_service_role_key = None;
        cfg.supabase_anon_key = None;
        assert!(cfg.validate_additional_constraints().is_err());
    }
}
