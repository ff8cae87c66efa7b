use brainboard_core::{
    ConfigError, EngineConfig, LayoutService, ReconcileInput, WidgetRecord, WidgetRole,
};
use chrono::NaiveDate;
use std::fs;

#[test]
fn partial_config_file_fills_in_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("engine.json");
    fs::write(
        &path,
        r#"{"classification": {"upcoming_window_days": 3}, "viewport": {"row_height": 40.0}}"#,
    )
    .expect("write config");

    let config = EngineConfig::load(&path).expect("config should load");
    assert_eq!(config.classification.upcoming_window_days, 3);
    assert_eq!(config.classification.high_priority_threshold, 0.7);
    assert_eq!(config.placement.max_search_rows, 100);
    assert_eq!(config.viewport.row_height, 40.0);
    assert_eq!(config.viewport.header_height, 64.0);
}

#[test]
fn missing_file_reports_io_error_with_path() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("absent.json");

    let error = EngineConfig::load(&path).expect_err("missing file must fail");
    match &error {
        ConfigError::Io { path: reported, .. } => assert_eq!(reported, &path),
        other => panic!("unexpected error: {other}"),
    }
    assert!(error.to_string().contains("absent.json"));
}

#[test]
fn malformed_and_out_of_range_files_are_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let malformed = dir.path().join("malformed.json");
    fs::write(&malformed, "{ not json").expect("write config");
    assert!(matches!(
        EngineConfig::load(&malformed),
        Err(ConfigError::Parse(_))
    ));

    let out_of_range = dir.path().join("range.json");
    fs::write(
        &out_of_range,
        r#"{"classification": {"high_priority_threshold": 1.5}}"#,
    )
    .expect("write config");
    assert!(matches!(
        EngineConfig::load(&out_of_range),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn widget_type_override_changes_placement() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("engine.json");
    fs::write(
        &path,
        r#"{"widget_types": [{
            "tag": "week-chart",
            "role": "tracker",
            "title": "Week",
            "category": "tracker",
            "default_w": 4,
            "default_h": 3
        }]}"#,
    )
    .expect("write config");

    let config = EngineConfig::load(&path).expect("config should load");
    let service = LayoutService::new(config).expect("service should build");
    assert_eq!(
        service.catalog().get("week-chart").map(|entry| entry.role),
        Some(WidgetRole::Tracker)
    );

    let records = vec![WidgetRecord::new("w1", "week-chart")];
    let plan = service.reconcile(ReconcileInput {
        records: &records,
        all_widgets: &[],
        columns: 4,
        today: NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date"),
    });

    assert!(plan.diagnostics.is_empty());
    let widget = plan.get("tracker-w1").expect("tracker placed");
    assert_eq!((widget.layout.w, widget.layout.h), (4, 3));
    assert_eq!(widget.title, "Week");
}

#[test]
fn invalid_widget_type_override_is_rejected() {
    let error = EngineConfig::from_json_str(
        r#"{"widget_types": [{
            "tag": "broken",
            "role": "task",
            "title": "Broken",
            "category": "task",
            "default_w": 0,
            "default_h": 3
        }]}"#,
    )
    .expect_err("zero width must be rejected");
    assert!(matches!(error, ConfigError::Catalog(_)));
}
