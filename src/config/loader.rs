//! Configuration loading from disk and environment.

use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Invalid env file: {0}")]
    EnvFile(#[from] dotenvy::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Env file read from the working directory, if present.
pub const ENV_FILE: &str = ".env";

/// Load configuration from an optional TOML file, apply environment
/// overrides and validate the result.
///
/// Overrides come from the process environment first, then from `.env`.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        }
        None => AppConfig::default(),
    };

    let env_file = read_env_file(Path::new(ENV_FILE))?;
    apply_env_overrides(&mut config, |name| {
        std::env::var(name)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| env_file.get(name).cloned())
    })?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Variables defined in a dotenv-style file. A missing file yields none.
pub fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    match dotenvy::from_path_iter(path) {
        Ok(iter) => Ok(iter.collect::<Result<HashMap<_, _>, dotenvy::Error>>()?),
        Err(e) if e.not_found() => Ok(HashMap::new()),
        Err(e) => Err(e.into()),
    }
}

/// Apply `PORT`, `SUPABASE_URL` and `SUPABASE_KEY` on top of `config`.
///
/// Empty values are ignored.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(port) = var("PORT") {
        let port: u16 = port.trim().parse().map_err(|_| ConfigError::Env {
            name: "PORT",
            reason: format!("'{}' is not a port number", port),
        })?;
        let mut addr: SocketAddr = config
            .listener
            .bind_address
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], port)));
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }
    if let Some(url) = var("SUPABASE_URL") {
        config.store.url = url;
    }
    if let Some(key) = var("SUPABASE_KEY") {
        config.store.api_key = key;
    }

    Ok(())
}
