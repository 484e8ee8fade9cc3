//! Configuration loading
//!
//! Environment variables first, config file second. Only the credentials
//! are required; every other knob has a default matching the public portal
//! layout.
//!
//! ## Environment Variables
//! - `SKOLEPORT_USERNAME` / `SKOLEPORT_PASSWORD` (required)
//! - `SKOLEPORT_LOGIN_URL`, `SKOLEPORT_API_BASE`, `SKOLEPORT_WIDGET_BASE`
//! - `SKOLEPORT_API_VERSION`, `SKOLEPORT_WEEKS_AHEAD`
//! - `SKOLEPORT_TIMEOUT_SECONDS`, `SKOLEPORT_TOKEN_VALIDITY_SECONDS`
//!
//! ## File Locations
//! `skoleport.{json,toml}` or `config.{json,toml}` in the working directory
//! or up to two parents. Format is detected by extension; sections other
//! than `credentials` may be omitted.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use skoleport_domain::{ClientConfig, ClientError, Result};

/// Load configuration from the environment, falling back to a config file.
///
/// A `.env` file in the working directory is honored before the environment
/// is read.
///
/// # Errors
/// Returns [`ClientError::Config`] when neither source yields credentials
/// or a file exists but cannot be parsed.
pub fn load() -> Result<ClientConfig> {
    dotenvy::dotenv().ok();

    match load_from_env() {
        Ok(config) => {
            tracing::info!("configuration loaded from environment");
            Ok(config)
        }
        Err(err) => {
            tracing::debug!(error = %err, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables only.
///
/// # Errors
/// Returns [`ClientError::Config`] when the credential variables are
/// missing or a numeric override does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let username = env_var("SKOLEPORT_USERNAME")?;
    let password = env_var("SKOLEPORT_PASSWORD")?;
    let mut config = ClientConfig::new(username, password);

    if let Ok(value) = std::env::var("SKOLEPORT_LOGIN_URL") {
        config.endpoints.login_url = value;
    }
    if let Ok(value) = std::env::var("SKOLEPORT_API_BASE") {
        config.endpoints.api_base = value;
    }
    if let Ok(value) = std::env::var("SKOLEPORT_WIDGET_BASE") {
        config.endpoints.widget_base = value;
    }
    if let Some(value) = env_parse::<u32>("SKOLEPORT_API_VERSION")? {
        config.endpoints.api_version = value;
    }
    if let Some(value) = env_parse::<u32>("SKOLEPORT_WEEKS_AHEAD")? {
        config.fetch.weeks_ahead = value;
    }
    if let Some(value) = env_parse::<u64>("SKOLEPORT_TIMEOUT_SECONDS")? {
        config.fetch.timeout_seconds = value;
    }
    if let Some(value) = env_parse::<u64>("SKOLEPORT_TOKEN_VALIDITY_SECONDS")? {
        config.fetch.token_validity_seconds = value;
    }

    Ok(config)
}

/// Load configuration from a file, probing standard locations when no path
/// is given.
///
/// # Errors
/// Returns [`ClientError::Config`] when no file is found or parsing fails.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(ClientError::Config(format!(
                    "config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            ClientError::Config("no config file found in any standard location".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|err| ClientError::Config(format!("failed to read config file: {err}")))?;

    parse_config(&contents, &config_path)
}

fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|err| ClientError::Config(format!("invalid TOML config: {err}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|err| ClientError::Config(format!("invalid JSON config: {err}"))),
        other => Err(ClientError::Config(format!("unsupported config format: {other}"))),
    }
}

/// First existing config file among the standard locations.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        for dir in [cwd.clone(), cwd.join(".."), cwd.join("../..")] {
            candidates.extend([
                dir.join("skoleport.json"),
                dir.join("skoleport.toml"),
                dir.join("config.json"),
                dir.join("config.toml"),
            ]);
        }
    }

    candidates.into_iter().find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| ClientError::Config(format!("missing required environment variable: {key}")))
}

fn env_parse<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|err| ClientError::Config(format!("invalid value for {key}: {err}"))),
        Err(_) => Ok(None),
    }
}
