//! Synthesis of widget drafts from classified records.
//!
//! # Responsibility
//! - Emit visibility-controlled view widgets.
//! - Turn classified records into advanced, tracker, passthrough, combined
//!   task list and web-search drafts.
//! - Report malformed and duplicated records without aborting.
//!
//! # Invariants
//! - Draft groups keep input order; the group order is the placement order.
//! - Synthesized ids depend only on record ids and fixed prefixes.
//! - At most one combined task list is produced per pass.

use crate::config::ClassificationConfig;
use crate::model::catalog::{
    WidgetCatalog, WidgetRole, ADVANCED_SINGLE_TASK_TYPE, COMBINED_TASK_LIST_TYPE,
    WEBSEARCH_SUMMARY_TYPE,
};
use crate::model::placed_widget::{
    PresentationType, Priority, TaskSummary, ADVANCED_ID_PREFIX, COMBINED_TASKS_KEY,
    COMBINED_TASK_LIST_ID, TRACKER_ID_PREFIX, VIEW_ID_PREFIX, WEBSEARCH_ID_PREFIX,
};
use crate::model::widget_record::{WidgetMetadata, WidgetRecord};
use crate::service::classify::{classify_record, AdvancedFeatures, RecordBucket};
use crate::service::reconcile::{DiagnosticStage, PassDiagnostic};
use chrono::NaiveDate;
use log::{debug, warn};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

const ADVANCED_TITLE_PREFIX: &str = "Advanced: ";
const WEBSEARCH_TITLE_PREFIX: &str = "Web Search: ";
const WEBSEARCH_QUERY_KEY: &str = "websearch_query";

/// Widget descriptor before placement.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetDraft {
    pub id: String,
    pub presentation_type: PresentationType,
    /// Catalog tag used to look up the default size.
    pub widget_type: String,
    pub title: String,
    pub source_record_id: Option<String>,
    pub combined_source_ids: Vec<String>,
    pub priority: Option<Priority>,
    pub metadata: BTreeMap<String, Value>,
}

/// Drafts grouped by placement stage.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedWidgets {
    pub view_widgets: Vec<WidgetDraft>,
    /// Advanced, tracker and passthrough drafts in input order.
    pub individual: Vec<WidgetDraft>,
    pub combined_task_list: Option<WidgetDraft>,
    pub websearch: Vec<WidgetDraft>,
    pub diagnostics: Vec<PassDiagnostic>,
}

impl DerivedWidgets {
    /// Flattens the groups into placement order.
    pub fn into_placement_order(self) -> (Vec<WidgetDraft>, Vec<PassDiagnostic>) {
        let mut drafts = self.view_widgets;
        drafts.extend(self.individual);
        drafts.extend(self.combined_task_list);
        drafts.extend(self.websearch);
        (drafts, self.diagnostics)
    }

    pub fn len(&self) -> usize {
        self.view_widgets.len()
            + self.individual.len()
            + usize::from(self.combined_task_list.is_some())
            + self.websearch.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classifies `records` and synthesizes every draft of one pass.
///
/// `all_widgets` is consulted only for view-widget visibility.
pub fn derive_widgets(
    records: &[WidgetRecord],
    all_widgets: &[WidgetRecord],
    catalog: &WidgetCatalog,
    config: &ClassificationConfig,
    today: NaiveDate,
) -> DerivedWidgets {
    let mut derived = DerivedWidgets {
        view_widgets: derive_view_widgets(all_widgets, catalog),
        ..DerivedWidgets::default()
    };

    let mut seen_ids = HashSet::<&str>::new();
    let mut regular_tasks = Vec::<&WidgetRecord>::new();

    for (index, record) in records.iter().enumerate() {
        if let Err(err) = record.validate() {
            warn!(
                "event=record_skipped module=derive status=warn index={} reason={}",
                index,
                err.reason()
            );
            derived.diagnostics.push(PassDiagnostic {
                stage: DiagnosticStage::Classification,
                subject: record_subject(record, index),
                reason: err.reason().to_string(),
                message: err.to_string(),
            });
            continue;
        }

        let id = record.id.trim();
        if !seen_ids.insert(id) {
            warn!(
                "event=record_skipped module=derive status=warn index={} reason=duplicate_id",
                index
            );
            derived.diagnostics.push(PassDiagnostic {
                stage: DiagnosticStage::Classification,
                subject: id.to_string(),
                reason: "duplicate_id".to_string(),
                message: format!("widget record `{id}` appears more than once; keeping the first"),
            });
            continue;
        }

        if catalog.role_of(&record.widget_type) == WidgetRole::View {
            debug!(
                "event=view_record_ignored module=derive status=ok index={}",
                index
            );
            continue;
        }

        let classification = classify_record(record, catalog, config, today);
        match classification.bucket {
            RecordBucket::AdvancedSingleTask(features) => derived
                .individual
                .push(advanced_draft(record, features, config.high_priority_threshold)),
            RecordBucket::Tracker => derived.individual.push(tracker_draft(record, catalog)),
            RecordBucket::Standalone => derived.individual.push(passthrough_draft(record)),
            RecordBucket::RegularTask => regular_tasks.push(record),
        }

        if classification.websearch {
            derived.websearch.push(websearch_draft(record));
        }
    }

    if !regular_tasks.is_empty() {
        derived.combined_task_list = Some(combined_task_list_draft(&regular_tasks, catalog));
    }

    derived
}

/// Emits one draft per visible view-widget type, in catalog order.
pub fn derive_view_widgets(all_widgets: &[WidgetRecord], catalog: &WidgetCatalog) -> Vec<WidgetDraft> {
    catalog
        .view_widget_types()
        .filter_map(|entry| {
            let record = all_widgets
                .iter()
                .find(|record| record.widget_type.trim() == entry.tag)?;
            if !record.metadata.visibility {
                return None;
            }
            Some(WidgetDraft {
                id: format!("{VIEW_ID_PREFIX}{}", entry.tag),
                presentation_type: PresentationType::ViewWidget,
                widget_type: entry.tag.clone(),
                title: entry.title.clone(),
                source_record_id: non_blank(&record.id),
                combined_source_ids: Vec::new(),
                priority: None,
                metadata: metadata_map(&record.metadata),
            })
        })
        .collect()
}

fn advanced_draft(record: &WidgetRecord, features: AdvancedFeatures, threshold: f64) -> WidgetDraft {
    let mut metadata = metadata_map(&record.metadata);
    metadata.insert(
        "advanced_features".to_string(),
        serde_json::to_value(features).unwrap_or(Value::Null),
    );
    metadata.insert(
        "source_widget_type".to_string(),
        Value::String(record.widget_type.clone()),
    );

    WidgetDraft {
        id: format!("{ADVANCED_ID_PREFIX}{}", record.id.trim()),
        presentation_type: PresentationType::AdvancedSingleTask,
        widget_type: ADVANCED_SINGLE_TASK_TYPE.to_string(),
        title: format!("{ADVANCED_TITLE_PREFIX}{}", record.title),
        source_record_id: Some(record.id.trim().to_string()),
        combined_source_ids: Vec::new(),
        priority: Some(Priority::from_importance(record.importance, threshold)),
        metadata,
    }
}

fn tracker_draft(record: &WidgetRecord, catalog: &WidgetCatalog) -> WidgetDraft {
    let title = if record.title.trim().is_empty() {
        catalog
            .get(&record.widget_type)
            .map(|entry| entry.title.clone())
            .unwrap_or_default()
    } else {
        record.title.clone()
    };

    WidgetDraft {
        id: format!("{TRACKER_ID_PREFIX}{}", record.id.trim()),
        presentation_type: PresentationType::Tracker,
        widget_type: record.widget_type.trim().to_string(),
        title,
        source_record_id: Some(record.id.trim().to_string()),
        combined_source_ids: Vec::new(),
        priority: None,
        metadata: metadata_map(&record.metadata),
    }
}

fn passthrough_draft(record: &WidgetRecord) -> WidgetDraft {
    WidgetDraft {
        id: record.id.trim().to_string(),
        presentation_type: PresentationType::Passthrough,
        widget_type: record.widget_type.trim().to_string(),
        title: record.title.clone(),
        source_record_id: Some(record.id.trim().to_string()),
        combined_source_ids: Vec::new(),
        priority: None,
        metadata: metadata_map(&record.metadata),
    }
}

fn websearch_draft(record: &WidgetRecord) -> WidgetDraft {
    let mut metadata = metadata_map(&record.metadata);
    let query = record
        .metadata
        .extra
        .get(WEBSEARCH_QUERY_KEY)
        .and_then(Value::as_str)
        .filter(|query| !query.trim().is_empty())
        .unwrap_or(record.title.as_str())
        .to_string();
    metadata.insert("search_query".to_string(), Value::String(query));

    WidgetDraft {
        id: format!("{WEBSEARCH_ID_PREFIX}{}", record.id.trim()),
        presentation_type: PresentationType::WebSearch,
        widget_type: WEBSEARCH_SUMMARY_TYPE.to_string(),
        title: format!("{WEBSEARCH_TITLE_PREFIX}{}", record.title),
        source_record_id: Some(record.id.trim().to_string()),
        combined_source_ids: Vec::new(),
        priority: None,
        metadata,
    }
}

fn combined_task_list_draft(tasks: &[&WidgetRecord], catalog: &WidgetCatalog) -> WidgetDraft {
    let summaries: Vec<TaskSummary> = tasks
        .iter()
        .map(|record| TaskSummary {
            id: record.id.trim().to_string(),
            title: record.title.clone(),
            description: record.description.clone(),
            importance: record.importance,
            category: record
                .category
                .clone()
                .filter(|category| !category.trim().is_empty())
                .unwrap_or_else(|| catalog.category_of(&record.widget_type).to_string()),
        })
        .collect();

    let mut metadata = BTreeMap::new();
    metadata.insert(
        COMBINED_TASKS_KEY.to_string(),
        serde_json::to_value(&summaries).unwrap_or_else(|_| Value::Array(Vec::new())),
    );

    WidgetDraft {
        id: COMBINED_TASK_LIST_ID.to_string(),
        presentation_type: PresentationType::CombinedTaskList,
        widget_type: COMBINED_TASK_LIST_TYPE.to_string(),
        title: catalog
            .get(COMBINED_TASK_LIST_TYPE)
            .map(|entry| entry.title.clone())
            .unwrap_or_else(|| "Tasks".to_string()),
        source_record_id: None,
        combined_source_ids: summaries.iter().map(|summary| summary.id.clone()).collect(),
        priority: None,
        metadata,
    }
}

fn metadata_map(metadata: &WidgetMetadata) -> BTreeMap<String, Value> {
    match serde_json::to_value(metadata) {
        Ok(Value::Object(map)) => map.into_iter().collect(),
        _ => BTreeMap::new(),
    }
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn record_subject(record: &WidgetRecord, index: usize) -> String {
    non_blank(&record.id).unwrap_or_else(|| format!("#{index}"))
}
