use std::env;
use std::io::{self, IsTerminal, Read};

use farmsync_core::records::Reference;
use farmsync_core::{Crop, FarmClient, FarmType, Farmer, Record, RecordId, User};
use serde_json::{Map, Value};

use crate::error::CliError;
use crate::settings::{CliSettings, Overrides, ResolvedSettings};

/// One-line rendering used by `list` output.
pub trait RecordSummary {
    fn summary_line(&self) -> String;
}

impl RecordSummary for FarmType {
    fn summary_line(&self) -> String {
        let id = short_id(&self.id);
        let description = preview(&self.description, 50);
        format!("{id:<14}  {:<24}  {description}", self.name)
    }
}

impl RecordSummary for Crop {
    fn summary_line(&self) -> String {
        let id = short_id(&self.id);
        let crop_type = self.crop_type.as_deref().unwrap_or("-");
        let image = if self.image.is_some() { "image" } else { "" };
        format!("{id:<14}  {:<24}  {crop_type:<12}  {image}", self.name)
    }
}

impl RecordSummary for Farmer {
    fn summary_line(&self) -> String {
        let id = short_id(&self.id);
        let farm_type = reference_label(&self.farm_type, |farm_type| farm_type.name.clone());
        let crop = reference_label(&self.crop, |crop| crop.name.clone());
        format!(
            "{id:<14}  {:<24}  {:<10}  {:<16}  {farm_type} / {crop}",
            self.name,
            self.national_id,
            preview(&self.location, 16)
        )
    }
}

impl RecordSummary for User {
    fn summary_line(&self) -> String {
        let id = short_id(&self.id);
        format!(
            "{id:<14}  {:<16}  {:<24}  {:<6}  {}",
            self.username,
            self.full_name(),
            self.role.as_str(),
            self.email
        )
    }
}

pub fn format_record_lines<R: RecordSummary>(records: &[R]) -> Vec<String> {
    records.iter().map(RecordSummary::summary_line).collect()
}

pub fn print_records<R: Record + RecordSummary>(
    records: &[R],
    as_json: bool,
) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else if records.is_empty() {
        println!("No {} found", R::KIND.label());
    } else {
        for line in format_record_lines(records) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn print_record<R: Record + RecordSummary>(record: &R, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        println!("{}", record.summary_line());
    }
    Ok(())
}

/// Local ids are long; show the prefix plus the first uuid group.
pub fn short_id(id: &RecordId) -> String {
    match id {
        RecordId::Server(id) => id.to_string(),
        RecordId::Local(_) => id.to_string().chars().take(14).collect(),
    }
}

fn reference_label<T: Record>(reference: &Reference<T>, name: impl Fn(&T) -> String) -> String {
    match reference {
        Reference::Id(id) => format!("#{}", short_id(id)),
        Reference::Expanded(record) => name(record),
    }
}

pub fn preview(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn parse_record_id(raw: &str) -> Result<RecordId, CliError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CliError::EmptyValue("Record id"));
    }
    trimmed
        .parse::<RecordId>()
        .map_err(|_| CliError::InvalidId(trimmed.to_string()))
}

/// Build a JSON object from `FIELD=VALUE` (text) and `FIELD:=JSON` (raw)
/// assignments.
pub fn parse_assignments(assignments: &[String]) -> Result<Value, CliError> {
    let mut changes = Map::new();
    for assignment in assignments {
        let invalid = || CliError::InvalidAssignment(assignment.clone());
        let (field, value) = assignment.split_once('=').ok_or_else(invalid)?;

        let (field, value) = match field.strip_suffix(':') {
            Some(raw_field) => (
                raw_field,
                serde_json::from_str::<Value>(value).map_err(|_| invalid())?,
            ),
            None => (field, Value::String(value.to_string())),
        };

        let field = field.trim();
        if field.is_empty() {
            return Err(invalid());
        }
        changes.insert(field.to_string(), value);
    }

    if changes.is_empty() {
        return Err(CliError::EmptyUpdate);
    }
    Ok(Value::Object(changes))
}

pub fn require_text(value: &str, label: &'static str) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyValue(label))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim_end_matches(['\r', '\n']);
    if trimmed.is_empty() {
        Ok(None)
    } else {
        Ok(Some(trimmed.to_string()))
    }
}

pub fn format_sync_timestamp(timestamp_ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(timestamp_ms).map_or_else(
        || timestamp_ms.to_string(),
        |date_time| date_time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
    )
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}

pub fn resolve_settings(overrides: &Overrides) -> Result<ResolvedSettings, CliError> {
    let settings = CliSettings::load().map_err(CliError::Config)?;
    Ok(settings.resolve(overrides, |name| env::var(name).ok())?)
}

pub async fn open_client(overrides: &Overrides) -> Result<FarmClient, CliError> {
    let resolved = resolve_settings(overrides)?;
    tracing::debug!(
        api_base_url = %resolved.config.api_base_url,
        db_path = %resolved.config.db_path.display(),
        offline = resolved.config.start_offline,
        "Opening farmsync client"
    );
    Ok(FarmClient::open(&resolved.config).await?)
}
