use brainboard_core::{
    derive_widgets, ClassificationConfig, Milestone, PresentationType, Priority, TaskSummary,
    WidgetCatalog, WidgetRecord,
};
use chrono::{Days, NaiveDate};
use serde_json::json;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 14).expect("valid date")
}

fn in_days(days: u64) -> String {
    today()
        .checked_add_days(Days::new(days))
        .expect("date in range")
        .format("%Y-%m-%d")
        .to_string()
}

fn task(id: &str, title: &str) -> WidgetRecord {
    let mut record = WidgetRecord::new(id, "todo-task");
    record.title = title.to_string();
    record
}

#[test]
fn alarm_task_becomes_high_priority_advanced_widget() {
    let record: WidgetRecord = serde_json::from_value(json!({
        "id": "t1",
        "type": "todo-task",
        "title": "Stretch",
        "importance": 0.8,
        "metadata": {"include_alarm_details": true}
    }))
    .expect("record should decode");

    let derived = derive_widgets(
        &[record],
        &[],
        &WidgetCatalog::default(),
        &ClassificationConfig::default(),
        today(),
    );

    assert_eq!(derived.individual.len(), 1);
    let draft = &derived.individual[0];
    assert_eq!(draft.id, "advanced-single-task-t1");
    assert_eq!(draft.presentation_type, PresentationType::AdvancedSingleTask);
    assert_eq!(draft.title, "Advanced: Stretch");
    assert_eq!(draft.priority, Some(Priority::High));
    assert_eq!(draft.metadata["advanced_features"]["alarm"], json!(true));
    assert!(derived.combined_task_list.is_none());
}

#[test]
fn low_importance_advanced_widget_is_low_priority() {
    let mut record = task("t2", "Read");
    record.importance = 0.3;
    record.metadata.include_tracker_details = true;

    let derived = derive_widgets(
        &[record],
        &[],
        &WidgetCatalog::default(),
        &ClassificationConfig::default(),
        today(),
    );
    assert_eq!(derived.individual[0].priority, Some(Priority::Low));
}

#[test]
fn milestone_outside_window_falls_through_to_regular_task() {
    let mut record = task("m1", "Thesis");
    record.metadata.include_progress_details = true;
    record.metadata.milestones = vec![Milestone::due(in_days(9))];

    let derived = derive_widgets(
        &[record],
        &[],
        &WidgetCatalog::default(),
        &ClassificationConfig::default(),
        today(),
    );

    assert!(derived.individual.is_empty());
    let combined = derived.combined_task_list.expect("regular task bucket");
    assert_eq!(combined.combined_source_ids, vec!["m1".to_string()]);
}

#[test]
fn milestone_inside_window_promotes_to_advanced() {
    let mut record = task("m2", "Launch");
    record.metadata.include_progress_details = true;
    record.metadata.milestones = vec![Milestone::due("garbage"), Milestone::due(in_days(3))];

    let derived = derive_widgets(
        &[record],
        &[],
        &WidgetCatalog::default(),
        &ClassificationConfig::default(),
        today(),
    );
    assert_eq!(derived.individual[0].id, "advanced-single-task-m2");
}

#[test]
fn window_length_is_configurable() {
    let mut record = task("m3", "Marathon");
    record.metadata.include_progress_details = true;
    record.metadata.milestones = vec![Milestone::due(in_days(9))];
    let config = ClassificationConfig {
        upcoming_window_days: 14,
        ..ClassificationConfig::default()
    };

    let derived = derive_widgets(&[record], &[], &WidgetCatalog::default(), &config, today());
    assert_eq!(derived.individual.len(), 1);
}

#[test]
fn tracker_and_websearch_flags_yield_two_independent_widgets() {
    let mut record = task("r1", "Learn Rust");
    record.metadata.include_tracker_details = true;
    record.metadata.include_websearch_details = true;

    let derived = derive_widgets(
        &[record],
        &[],
        &WidgetCatalog::default(),
        &ClassificationConfig::default(),
        today(),
    );
    let (drafts, diagnostics) = derived.into_placement_order();

    assert!(diagnostics.is_empty());
    let ids: Vec<&str> = drafts.iter().map(|draft| draft.id.as_str()).collect();
    assert_eq!(ids, vec!["advanced-single-task-r1", "websearch-r1"]);
}

#[test]
fn tracker_typed_records_get_tracker_widgets() {
    let mut record = WidgetRecord::new("c1", "calendar");
    record.title = String::new();

    let derived = derive_widgets(
        &[record],
        &[],
        &WidgetCatalog::default(),
        &ClassificationConfig::default(),
        today(),
    );
    let draft = &derived.individual[0];
    assert_eq!(draft.id, "tracker-c1");
    assert_eq!(draft.presentation_type, PresentationType::Tracker);
    assert_eq!(draft.widget_type, "calendar");
    assert_eq!(draft.title, "Calendar");
}

#[test]
fn regular_tasks_collapse_into_one_combined_list() {
    let mut habit = WidgetRecord::new("h1", "habit");
    habit.title = "Meditate".to_string();
    habit.description = "10 minutes".to_string();
    habit.importance = 0.4;
    let mut errand = task("e1", "Groceries");
    errand.category = Some("errands".to_string());
    let records = vec![task("t1", "Email"), habit, errand];

    let derived = derive_widgets(
        &records,
        &[],
        &WidgetCatalog::default(),
        &ClassificationConfig::default(),
        today(),
    );

    assert_eq!(derived.len(), 1);
    let combined = derived.combined_task_list.expect("combined list");
    assert_eq!(combined.id, "task-list-combined");
    assert_eq!(combined.presentation_type, PresentationType::CombinedTaskList);

    let summaries: Vec<TaskSummary> =
        serde_json::from_value(combined.metadata["combined_tasks"].clone())
            .expect("summaries should decode");
    assert_eq!(summaries.len(), 3);
    assert_eq!(summaries[1].title, "Meditate");
    assert_eq!(summaries[1].description, "10 minutes");
    assert_eq!(summaries[1].category, "habit");
    assert_eq!(summaries[2].category, "errands");
    assert_eq!(summaries[0].category, "task");
}

#[test]
fn non_boolean_flags_do_not_promote() {
    let record: WidgetRecord = serde_json::from_value(json!({
        "id": "s1",
        "widget_type": "todo-task",
        "metadata": {"include_alarm_details": "yes", "include_websearch_details": 1}
    }))
    .expect("record should decode");

    let derived = derive_widgets(
        &[record],
        &[],
        &WidgetCatalog::default(),
        &ClassificationConfig::default(),
        today(),
    );
    assert!(derived.individual.is_empty());
    assert!(derived.websearch.is_empty());
    assert!(derived.combined_task_list.is_some());
}
