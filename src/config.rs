use std::env;

use thiserror::Error;

use crate::constants::*;

/// Runtime settings, read once at startup. `SESSION_SECRET` is the only
/// required variable; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_path: String,
    pub session_secret: String,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SESSION_SECRET environment variable is required")]
    MissingSessionSecret,
    #[error("session secret must be at least {MIN_SESSION_SECRET_LENGTH} bytes, got {0}")]
    SessionSecretTooShort(usize),
    #[error("SERVER_PORT is not a valid port number: {0}")]
    InvalidPort(String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port_raw = env::var("SERVER_PORT").unwrap_or_else(|_| DEFAULT_PORT.to_string());
        let port: u16 = port_raw
            .parse()
            .map_err(|_| ConfigError::InvalidPort(port_raw))?;
        let data_path =
            env::var("DATABASE_PATH").unwrap_or_else(|_| DEFAULT_DATA_PATH.to_string());

        let session_secret =
            env::var("SESSION_SECRET").map_err(|_| ConfigError::MissingSessionSecret)?;
        let secret_len = session_secret.as_bytes().len();
        if secret_len < MIN_SESSION_SECRET_LENGTH {
            return Err(ConfigError::SessionSecretTooShort(secret_len));
        }

        Ok(Config {
            host,
            port,
            data_path,
            session_secret,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
