//! Client configuration resolved through a variable lookup.

use std::path::PathBuf;

use thiserror::Error;

use crate::util::{is_http_url, is_truthy};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api";
pub const API_BASE_URL_VAR: &str = "FARMSYNC_API_BASE_URL";
pub const DB_PATH_VAR: &str = "FARMSYNC_DB_PATH";
pub const OFFLINE_VAR: &str = "FARMSYNC_OFFLINE";
const DB_FILE_NAME: &str = "farmsync.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Settings needed to open a [`crate::FarmClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub db_path: PathBuf,
    /// Start with the connectivity flag cleared
    pub start_offline: bool,
}

impl ClientConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = optional_trimmed(&lookup, API_BASE_URL_VAR).map_or_else(
            || DEFAULT_API_BASE_URL.to_string(),
            |url| trim_trailing(&url).to_string(),
        );
        if !is_http_url(&api_base_url) {
            return Err(ConfigError::Invalid(format!(
                "{API_BASE_URL_VAR} must start with http:// or https://"
            )));
        }

        let db_path =
            optional_trimmed(&lookup, DB_PATH_VAR).map_or_else(default_db_path, PathBuf::from);

        let start_offline =
            optional_trimmed(&lookup, OFFLINE_VAR).is_some_and(|value| is_truthy(&value));

        Ok(Self {
            api_base_url,
            db_path,
            start_offline,
        })
    }
}

/// `<data_local_dir>/farmsync/farmsync.db`, or the working directory when
/// the platform has no data directory.
pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir().map_or_else(
        || PathBuf::from(DB_FILE_NAME),
        |dir| dir.join("farmsync").join(DB_FILE_NAME),
    )
}

fn optional_trimmed(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Option<String> {
    lookup(name).and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn trim_trailing(value: &str) -> &str {
    value.trim_end_matches('/')
}
