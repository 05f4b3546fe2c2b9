//! Configuration module
//!
//! Configuration is read from the process environment (optionally seeded from a `.env`
//! file by the binaries). The four Dropbox secrets are required; everything else has a
//! default. A missing secret is a startup-fatal [`ConfigError`].

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::constants::{
    DEFAULT_DROPBOX_API_URL, DEFAULT_DROPBOX_CONTENT_URL, DEFAULT_DROPBOX_TOKEN_URL,
    DEFAULT_UPLOAD_FOLDER,
};
use crate::models::Credentials;

// Common constants
const HTTP_TIMEOUT_SECS: u64 = 60;
const SERVER_PORT: u16 = 3000;
const MAX_SUBMISSION_BYTES: usize = 50 * 1024 * 1024;

/// Configuration errors. Raised before any surface starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(String),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Write mode used for `files/upload`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    /// Fail when a file already exists at the path.
    #[default]
    Add,
    Overwrite,
}

impl FromStr for UploadMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "add" => Ok(UploadMode::Add),
            "overwrite" => Ok(UploadMode::Overwrite),
            _ => Err(anyhow::anyhow!("Invalid upload mode: {}", s)),
        }
    }
}

impl Display for UploadMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UploadMode::Add => write!(f, "add"),
            UploadMode::Overwrite => write!(f, "overwrite"),
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Credentials,
    pub dropbox_api_url: String,
    pub dropbox_content_url: String,
    pub dropbox_token_url: String,
    pub upload_folder: String,
    pub upload_mode: UploadMode,
    pub http_timeout_secs: u64,
    pub server_port: u16,
    pub max_submission_bytes: usize,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require =
            |key: &str| get(key).ok_or_else(|| ConfigError::MissingVar(key.to_string()));

        let credentials = Credentials {
            access_token: require("DROPBOX_ACCESS_TOKEN")?,
            refresh_token: require("DROPBOX_REFRESH_TOKEN")?,
            client_id: require("DROPBOX_CLIENT_ID")?,
            client_secret: require("DROPBOX_CLIENT_SECRET")?,
        };

        let config = Config {
            credentials,
            dropbox_api_url: get("DROPBOX_API_URL")
                .unwrap_or_else(|| DEFAULT_DROPBOX_API_URL.to_string()),
            dropbox_content_url: get("DROPBOX_CONTENT_URL")
                .unwrap_or_else(|| DEFAULT_DROPBOX_CONTENT_URL.to_string()),
            dropbox_token_url: get("DROPBOX_TOKEN_URL")
                .unwrap_or_else(|| DEFAULT_DROPBOX_TOKEN_URL.to_string()),
            upload_folder: get("EDV_UPLOAD_FOLDER")
                .unwrap_or_else(|| DEFAULT_UPLOAD_FOLDER.to_string()),
            upload_mode: parse_or(&get, "EDV_UPLOAD_MODE", UploadMode::default())?,
            http_timeout_secs: parse_or(&get, "HTTP_TIMEOUT_SECS", HTTP_TIMEOUT_SECS)?,
            server_port: parse_or(&get, "SERVER_PORT", SERVER_PORT)?,
            max_submission_bytes: parse_or(&get, "MAX_SUBMISSION_BYTES", MAX_SUBMISSION_BYTES)?,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.upload_folder.starts_with('/') {
            return Err(ConfigError::Invalid {
                var: "EDV_UPLOAD_FOLDER".to_string(),
                reason: "must be an absolute path starting with '/'".to_string(),
            });
        }

        if self.http_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "HTTP_TIMEOUT_SECS".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        for (var, url) in [
            ("DROPBOX_API_URL", &self.dropbox_api_url),
            ("DROPBOX_CONTENT_URL", &self.dropbox_content_url),
            ("DROPBOX_TOKEN_URL", &self.dropbox_token_url),
        ] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: format!("'{}' is not an http(s) URL", url),
                });
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

fn parse_or<G, T>(get: &G, key: &str, default: T) -> Result<T, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: key.to_string(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
