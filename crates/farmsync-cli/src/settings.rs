//! Persistent CLI settings and their resolution against flags and environment.

use std::fmt;
use std::path::{Path, PathBuf};

use farmsync_core::config::{API_BASE_URL_VAR, DB_PATH_VAR, OFFLINE_VAR};
use farmsync_core::util::normalize_text_option;
use farmsync_core::{ClientConfig, ConfigError};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "cli-config.json";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliSettings {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            version: default_config_version(),
            api_base_url: None,
            db_path: None,
        }
    }
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join("farmsync").join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

/// Values given on the command line for this invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub db_path: Option<PathBuf>,
    pub offline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingSource {
    Flag,
    Environment,
    ConfigFile,
    Default,
}

impl fmt::Display for SettingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flag => "flag",
            Self::Environment => "environment",
            Self::ConfigFile => "config file",
            Self::Default => "default",
        })
    }
}

/// Client configuration plus where each value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSettings {
    pub config: ClientConfig,
    pub api_base_url_source: SettingSource,
    pub db_path_source: SettingSource,
    pub offline_source: SettingSource,
}

impl CliSettings {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut settings = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        settings.normalize();
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    /// Resolve with precedence flag > environment > config file > default.
    pub fn resolve(
        &self,
        overrides: &Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ResolvedSettings, ConfigError> {
        let env = |name: &str| normalize_text_option(lookup(name));

        let api_base_url = layered(
            normalize_text_option(overrides.api_base_url.clone()),
            env(API_BASE_URL_VAR),
            normalize_text_option(self.api_base_url.clone()),
        );
        let db_path = layered(
            overrides.db_path.as_deref().map(path_text),
            env(DB_PATH_VAR),
            self.db_path.as_deref().map(path_text),
        );
        let offline = if overrides.offline {
            Some(("1".to_string(), SettingSource::Flag))
        } else {
            env(OFFLINE_VAR).map(|value| (value, SettingSource::Environment))
        };

        let config = ClientConfig::from_lookup(|name| {
            let layer = match name {
                API_BASE_URL_VAR => &api_base_url,
                DB_PATH_VAR => &db_path,
                OFFLINE_VAR => &offline,
                _ => return None,
            };
            layer.as_ref().map(|(value, _)| value.clone())
        })?;

        Ok(ResolvedSettings {
            config,
            api_base_url_source: source_of(api_base_url.as_ref()),
            db_path_source: source_of(db_path.as_ref()),
            offline_source: source_of(offline.as_ref()),
        })
    }

    fn normalize(&mut self) {
        self.api_base_url = normalize_text_option(self.api_base_url.take())
            .map(|url| url.trim_end_matches('/').to_string());
        self.db_path = self
            .db_path
            .take()
            .filter(|path| !path.as_os_str().is_empty());
    }
}

impl ResolvedSettings {
    /// Lines for `config show`
    pub fn describe(&self) -> Vec<String> {
        vec![
            format!(
                "api_base_url = {}  [{}]",
                self.config.api_base_url, self.api_base_url_source
            ),
            format!(
                "db_path      = {}  [{}]",
                self.config.db_path.display(),
                self.db_path_source
            ),
            format!(
                "offline      = {}  [{}]",
                self.config.start_offline, self.offline_source
            ),
        ]
    }
}

fn layered(
    flag: Option<String>,
    environment: Option<String>,
    file: Option<String>,
) -> Option<(String, SettingSource)> {
    flag.map(|value| (value, SettingSource::Flag))
        .or_else(|| environment.map(|value| (value, SettingSource::Environment)))
        .or_else(|| file.map(|value| (value, SettingSource::ConfigFile)))
}

fn source_of(layer: Option<&(String, SettingSource)>) -> SettingSource {
    layer.map_or(SettingSource::Default, |(_, source)| *source)
}

fn path_text(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
