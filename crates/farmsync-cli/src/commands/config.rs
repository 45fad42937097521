use std::path::PathBuf;

use farmsync_core::util::{is_http_url, normalize_text_option};

use crate::cli::{ConfigCommands, SettingKey};
use crate::commands::common::resolve_settings;
use crate::error::CliError;
use crate::settings::{CliSettings, Overrides};

pub fn run_config(command: ConfigCommands, overrides: &Overrides) -> Result<(), CliError> {
    match command {
        ConfigCommands::Show => {
            for line in resolve_settings(overrides)?.describe() {
                println!("{line}");
            }
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let mut settings = CliSettings::load().map_err(CliError::Config)?;
            apply_setting(&mut settings, key, Some(value))?;
            let path = settings.save().map_err(CliError::Config)?;
            println!("Saved {}", path.display());
            Ok(())
        }
        ConfigCommands::Unset { key } => {
            let mut settings = CliSettings::load().map_err(CliError::Config)?;
            apply_setting(&mut settings, key, None)?;
            let path = settings.save().map_err(CliError::Config)?;
            println!("Saved {}", path.display());
            Ok(())
        }
    }
}

/// Set or clear one stored setting, validating the new value.
pub fn apply_setting(
    settings: &mut CliSettings,
    key: SettingKey,
    value: Option<String>,
) -> Result<(), CliError> {
    let value = normalize_text_option(value);
    match key {
        SettingKey::ApiBaseUrl => {
            if let Some(url) = value.as_deref() {
                if !is_http_url(url) {
                    return Err(CliError::Config(
                        "api-base-url must start with http:// or https://".to_string(),
                    ));
                }
            }
            settings.api_base_url = value.map(|url| url.trim_end_matches('/').to_string());
        }
        SettingKey::DbPath => settings.db_path = value.map(PathBuf::from),
    }
    Ok(())
}
