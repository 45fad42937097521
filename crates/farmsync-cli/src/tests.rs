use std::path::PathBuf;

use clap::Parser;
use farmsync_core::records::Role;
use farmsync_core::{RecordId, ResourceKind};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::cli::{Cli, Commands, CompletionShell, CropCommands, RoleArg, SettingKey, UserCommands};
use crate::commands::common::{
    format_relative_time, format_sync_timestamp, parse_assignments, parse_record_id, preview,
    short_id,
};
use crate::commands::completions::render_completions;
use crate::commands::config::apply_setting;
use crate::commands::resources::role_from_arg;
use crate::commands::status::{collect_status, format_status_lines, SnapshotStatus, StatusReport};
use crate::error::CliError;
use crate::settings::{CliSettings, Overrides, SettingSource};

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn parses_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "farmsync",
        "crops",
        "list",
        "--json",
        "--offline",
        "--db-path",
        "/tmp/farm.db",
    ])
    .unwrap();

    assert!(cli.offline);
    assert_eq!(cli.db_path, Some(PathBuf::from("/tmp/farm.db")));
    match cli.command {
        Commands::Crops {
            command: CropCommands::List(args),
        } => assert!(args.json),
        _ => panic!("expected crops list"),
    }
}

#[test]
fn refresh_takes_no_arguments() {
    let cli = Cli::try_parse_from(["farmsync", "refresh"]).unwrap();
    assert!(matches!(cli.command, Commands::Refresh));
    assert!(Cli::try_parse_from(["farmsync", "refresh", "tok"]).is_err());
}

#[test]
fn farm_type_alias_is_accepted() {
    let cli = Cli::try_parse_from(["farmsync", "farm-type", "add", "Dairy"]).unwrap();
    assert!(matches!(cli.command, Commands::FarmTypes { .. }));
}

#[test]
fn update_requires_at_least_one_assignment() {
    assert!(Cli::try_parse_from(["farmsync", "farmers", "update", "3"]).is_err());
    assert!(
        Cli::try_parse_from(["farmsync", "farmers", "update", "3", "--set", "name=Ann"]).is_ok()
    );
}

#[test]
fn user_role_defaults_to_clerk() {
    let cli = Cli::try_parse_from(["farmsync", "users", "add", "bob"]).unwrap();
    match cli.command {
        Commands::Users {
            command: UserCommands::Add { role, password, .. },
        } => {
            assert_eq!(role, RoleArg::Clerk);
            assert_eq!(password, None);
        }
        _ => panic!("expected users add"),
    }
}

#[test]
fn role_arg_maps_to_record_role() {
    assert_eq!(role_from_arg(RoleArg::Clerk), Role::Clerk);
    assert_eq!(role_from_arg(RoleArg::Admin), Role::Admin);
}

#[test]
fn parse_assignments_builds_text_and_raw_values() {
    let changes = parse_assignments(&[
        "name=Jane Doe".to_string(),
        "farm_type:=2".to_string(),
        "location=".to_string(),
    ])
    .unwrap();

    assert_eq!(
        changes,
        json!({"name": "Jane Doe", "farm_type": 2, "location": ""})
    );
}

#[test]
fn parse_assignments_keeps_equals_in_value() {
    let changes = parse_assignments(&["description=a=b".to_string()]).unwrap();
    assert_eq!(changes, json!({"description": "a=b"}));
}

#[test]
fn parse_assignments_rejects_malformed_input() {
    assert!(matches!(
        parse_assignments(&["name".to_string()]),
        Err(CliError::InvalidAssignment(_))
    ));
    assert!(matches!(
        parse_assignments(&["=value".to_string()]),
        Err(CliError::InvalidAssignment(_))
    ));
    assert!(matches!(
        parse_assignments(&["crop:={not json".to_string()]),
        Err(CliError::InvalidAssignment(_))
    ));
    assert!(matches!(parse_assignments(&[]), Err(CliError::EmptyUpdate)));
}

#[test]
fn parse_record_id_accepts_server_and_local_ids() {
    assert_eq!(parse_record_id(" 42 ").unwrap(), RecordId::Server(42));

    let local = RecordId::new_local();
    assert_eq!(parse_record_id(&local.to_string()).unwrap(), local);
}

#[test]
fn parse_record_id_rejects_garbage() {
    assert!(matches!(parse_record_id("  "), Err(CliError::EmptyValue(_))));
    assert!(matches!(
        parse_record_id("maize"),
        Err(CliError::InvalidId(raw)) if raw == "maize"
    ));
}

#[test]
fn short_id_truncates_local_ids_only() {
    assert_eq!(short_id(&RecordId::Server(1234)), "1234");

    let local = RecordId::new_local();
    let short = short_id(&local);
    assert_eq!(short.len(), 14);
    assert!(short.starts_with("local-"));
}

#[test]
fn preview_collapses_whitespace_and_truncates() {
    assert_eq!(preview("  dry\n  season  ", 20), "dry season");
    assert_eq!(preview("drought resistant sorghum", 10), "drought...");
}

#[test]
fn relative_time_uses_coarse_units() {
    let now = 10 * 7 * 24 * 60 * 60 * 1000;
    assert_eq!(format_relative_time(now - 5_000, now), "just now");
    assert_eq!(format_relative_time(now - 5 * 60_000, now), "5m ago");
    assert_eq!(format_relative_time(now - 3 * 3_600_000, now), "3h ago");
    assert_eq!(format_relative_time(now - 2 * 86_400_000, now), "2d ago");
    assert_eq!(format_relative_time(now - 21 * 86_400_000, now), "3w ago");
}

#[test]
fn sync_timestamp_is_rendered_in_utc() {
    assert_eq!(format_sync_timestamp(0), "1970-01-01 00:00:00 UTC");
}

#[test]
fn settings_roundtrip_through_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("cli-config.json");

    let settings = CliSettings {
        api_base_url: Some(" https://farms.example.com/api/ ".to_string()),
        db_path: Some(PathBuf::from("/srv/farmsync.db")),
        ..CliSettings::default()
    };
    settings.save_to_path(&path).unwrap();

    let loaded = CliSettings::load_from_path(&path).unwrap();
    assert_eq!(
        loaded.api_base_url.as_deref(),
        Some("https://farms.example.com/api")
    );
    assert_eq!(loaded.db_path, Some(PathBuf::from("/srv/farmsync.db")));
    assert_eq!(loaded.version, 1);
}

#[test]
fn missing_settings_file_loads_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let loaded = CliSettings::load_from_path(&tmp.path().join("absent.json")).unwrap();
    assert_eq!(loaded, CliSettings::default());
}

#[test]
fn corrupt_settings_file_reports_path() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("cli-config.json");
    std::fs::write(&path, "{ not json").unwrap();

    let error = CliSettings::load_from_path(&path).unwrap_err();
    assert!(error.contains("Failed to parse config"));
}

#[test]
fn resolve_prefers_flag_over_env_over_file() {
    let settings = CliSettings {
        api_base_url: Some("http://file.example/api".to_string()),
        db_path: Some(PathBuf::from("/file/farmsync.db")),
        ..CliSettings::default()
    };
    let overrides = Overrides {
        api_base_url: Some("http://flag.example/api/".to_string()),
        db_path: None,
        offline: false,
    };
    let env = |name: &str| match name {
        "FARMSYNC_API_BASE_URL" => Some("http://env.example/api".to_string()),
        "FARMSYNC_DB_PATH" => Some("/env/farmsync.db".to_string()),
        _ => None,
    };

    let resolved = settings.resolve(&overrides, env).unwrap();
    assert_eq!(resolved.config.api_base_url, "http://flag.example/api");
    assert_eq!(resolved.api_base_url_source, SettingSource::Flag);
    assert_eq!(resolved.config.db_path, PathBuf::from("/env/farmsync.db"));
    assert_eq!(resolved.db_path_source, SettingSource::Environment);
    assert!(!resolved.config.start_offline);
    assert_eq!(resolved.offline_source, SettingSource::Default);
}

#[test]
fn resolve_falls_back_to_file_then_default() {
    let settings = CliSettings {
        db_path: Some(PathBuf::from("/file/farmsync.db")),
        ..CliSettings::default()
    };

    let resolved = settings.resolve(&Overrides::default(), no_env).unwrap();
    assert_eq!(resolved.config.db_path, PathBuf::from("/file/farmsync.db"));
    assert_eq!(resolved.db_path_source, SettingSource::ConfigFile);
    assert_eq!(
        resolved.config.api_base_url,
        farmsync_core::config::DEFAULT_API_BASE_URL
    );
    assert_eq!(resolved.api_base_url_source, SettingSource::Default);
}

#[test]
fn offline_flag_and_env_both_start_offline() {
    let settings = CliSettings::default();
    let flagged = Overrides {
        offline: true,
        ..Overrides::default()
    };
    let resolved = settings.resolve(&flagged, no_env).unwrap();
    assert!(resolved.config.start_offline);
    assert_eq!(resolved.offline_source, SettingSource::Flag);

    let env = |name: &str| (name == "FARMSYNC_OFFLINE").then(|| "true".to_string());
    let resolved = settings.resolve(&Overrides::default(), env).unwrap();
    assert!(resolved.config.start_offline);
    assert_eq!(resolved.offline_source, SettingSource::Environment);
}

#[test]
fn resolve_rejects_invalid_url_from_file() {
    let settings = CliSettings {
        api_base_url: Some("farms.example.com".to_string()),
        ..CliSettings::default()
    };
    assert!(settings.resolve(&Overrides::default(), no_env).is_err());
}

#[test]
fn describe_lists_each_source() {
    let resolved = CliSettings::default()
        .resolve(&Overrides::default(), no_env)
        .unwrap();
    let lines = resolved.describe();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|line| line.ends_with("[default]")));
}

#[test]
fn apply_setting_validates_and_clears() {
    let mut settings = CliSettings::default();
    apply_setting(
        &mut settings,
        SettingKey::ApiBaseUrl,
        Some("https://farms.example.com/api/".to_string()),
    )
    .unwrap();
    assert_eq!(
        settings.api_base_url.as_deref(),
        Some("https://farms.example.com/api")
    );

    let error = apply_setting(
        &mut settings,
        SettingKey::ApiBaseUrl,
        Some("ftp://farms.example.com".to_string()),
    )
    .unwrap_err();
    assert!(matches!(error, CliError::Config(_)));

    apply_setting(&mut settings, SettingKey::ApiBaseUrl, None).unwrap();
    assert_eq!(settings.api_base_url, None);

    apply_setting(
        &mut settings,
        SettingKey::DbPath,
        Some("/srv/farmsync.db".to_string()),
    )
    .unwrap();
    assert_eq!(settings.db_path, Some(PathBuf::from("/srv/farmsync.db")));
}

#[test]
fn status_lines_show_mode_and_cache_age() {
    let now = 2 * 3_600_000;
    let report = StatusReport {
        online: false,
        api_base_url: "http://127.0.0.1:8000/api".to_string(),
        db_path: "/tmp/farmsync.db".to_string(),
        signed_in_as: None,
        snapshots: vec![
            SnapshotStatus {
                kind: ResourceKind::Crop,
                records: Some(3),
                updated_at: Some(now - 3_600_000),
                updated_at_iso: None,
            },
            SnapshotStatus {
                kind: ResourceKind::Farmer,
                records: None,
                updated_at: None,
                updated_at_iso: None,
            },
        ],
    };

    let lines = format_status_lines(&report, now);
    assert_eq!(lines[0], "Mode:     offline");
    assert_eq!(lines[3], "Account:  not signed in");
    assert!(lines[4].contains("3 cached"));
    assert!(lines[4].ends_with("1h ago"));
    assert!(lines[5].ends_with("not cached"));
}

#[test]
fn completions_render_for_every_shell() {
    for shell in [
        CompletionShell::Bash,
        CompletionShell::Zsh,
        CompletionShell::Fish,
    ] {
        let script = String::from_utf8(render_completions(shell)).unwrap();
        assert!(script.contains("farmsync"));
    }
}

#[tokio::test(flavor = "current_thread")]
async fn status_reports_mirror_location_and_missing_snapshots() {
    let tmp = tempfile::tempdir().unwrap();
    let config = farmsync_core::ClientConfig {
        api_base_url: "http://127.0.0.1:9".to_string(),
        db_path: tmp.path().join("farmsync.db"),
        start_offline: true,
    };
    let client = farmsync_core::FarmClient::open(&config).await.unwrap();

    let report = collect_status(&client).await.unwrap();
    assert!(!report.online);
    assert_eq!(report.db_path, config.db_path.display().to_string());
    assert_eq!(report.signed_in_as, None);
    assert_eq!(report.snapshots.len(), ResourceKind::ALL.len());
    assert!(report.snapshots.iter().all(|snapshot| snapshot.records.is_none()));

    let in_memory = farmsync_core::FarmClient::in_memory("http://127.0.0.1:9").unwrap();
    let report = collect_status(&in_memory).await.unwrap();
    assert_eq!(report.db_path, ":memory:");
}
