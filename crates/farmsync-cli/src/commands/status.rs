use farmsync_core::util::unix_timestamp_millis;
use farmsync_core::{FarmClient, ResourceKind};
use serde::Serialize;
use serde_json::Value;

use crate::commands::common::{format_relative_time, format_sync_timestamp, open_client};
use crate::error::CliError;
use crate::settings::Overrides;

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub online: bool,
    pub api_base_url: String,
    pub db_path: String,
    pub signed_in_as: Option<String>,
    pub snapshots: Vec<SnapshotStatus>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotStatus {
    pub kind: ResourceKind,
    pub records: Option<usize>,
    pub updated_at: Option<i64>,
    pub updated_at_iso: Option<String>,
}

pub async fn run_status(as_json: bool, overrides: &Overrides) -> Result<(), CliError> {
    let client = open_client(overrides).await?;
    let report = collect_status(&client).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for line in format_status_lines(&report, unix_timestamp_millis()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub async fn collect_status(client: &FarmClient) -> Result<StatusReport, CliError> {
    let mut snapshots = Vec::with_capacity(ResourceKind::ALL.len());
    for kind in ResourceKind::ALL {
        let key = kind.storage_key();
        let records = client
            .mirror()
            .get_value::<Vec<Value>>(key)
            .await?
            .map(|records| records.len());
        let updated_at = client.mirror().updated_at(key).await?;
        snapshots.push(SnapshotStatus {
            kind,
            records,
            updated_at,
            updated_at_iso: updated_at.map(format_sync_timestamp),
        });
    }

    Ok(StatusReport {
        online: client.connectivity().is_online(),
        api_base_url: client.gateway().base_url().to_string(),
        db_path: client
            .mirror()
            .path()
            .map_or_else(|| ":memory:".to_string(), |path| path.display().to_string()),
        signed_in_as: client
            .session()
            .current()
            .map(|session| session.user.username),
        snapshots,
    })
}

pub fn format_status_lines(report: &StatusReport, now_ms: i64) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Mode:     {}",
            if report.online { "online" } else { "offline" }
        ),
        format!("Server:   {}", report.api_base_url),
        format!("Mirror:   {}", report.db_path),
        format!(
            "Account:  {}",
            report.signed_in_as.as_deref().unwrap_or("not signed in")
        ),
    ];

    for snapshot in &report.snapshots {
        let line = match (snapshot.records, snapshot.updated_at) {
            (Some(count), Some(updated_at)) => format!(
                "  {:<11} {count:>5} cached  {}",
                snapshot.kind.label(),
                format_relative_time(updated_at, now_ms)
            ),
            _ => format!("  {:<11}   not cached", snapshot.kind.label()),
        };
        lines.push(line);
    }
    lines
}
