//! Daily widget record model.
//!
//! # Responsibility
//! - Define the read-only record shape delivered by the dashboard backend.
//! - Replace the open metadata bag with named feature flags plus a residual map.
//! - Decode record batches leniently so one bad entry never drops the batch.
//!
//! # Invariants
//! - Feature flags are `true` only when the wire value is the boolean `true`.
//! - `null` or mistyped optional fields decode to their defaults; numeric ids
//!   decode to their decimal string.
//! - A record is valid only when `id` and `widget_type` are non-blank.
//! - Records are never mutated by the engine.

use log::warn;
use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque backend identifier for one widget record.
pub type RecordId = String;

/// One widget record as returned by the dashboard backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetRecord {
    #[serde(default, deserialize_with = "id_string")]
    pub id: RecordId,
    /// Type tag, e.g. `todo-task`, `calendar`, `ai-chat`.
    #[serde(default, alias = "type", deserialize_with = "string_or_empty")]
    pub widget_type: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub description: String,
    /// Score in `[0, 1]`; only used to derive generated widget priority.
    #[serde(default, deserialize_with = "number_or_zero")]
    pub importance: f64,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "metadata_or_default")]
    pub metadata: WidgetMetadata,
}

impl WidgetRecord {
    /// Creates a record with empty display fields and default metadata.
    pub fn new(id: impl Into<String>, widget_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            widget_type: widget_type.into(),
            title: String::new(),
            description: String::new(),
            importance: 0.0,
            category: None,
            metadata: WidgetMetadata::default(),
        }
    }

    /// Validates the fields classification depends on.
    pub fn validate(&self) -> Result<(), RecordValidationError> {
        if self.id.trim().is_empty() {
            return Err(RecordValidationError::MissingId);
        }
        if self.widget_type.trim().is_empty() {
            return Err(RecordValidationError::MissingWidgetType {
                id: self.id.clone(),
            });
        }
        Ok(())
    }
}

/// Typed view over the record metadata map.
///
/// Unknown keys are kept in `extra` so they survive a decode/encode cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetMetadata {
    #[serde(default, deserialize_with = "strict_true")]
    pub include_tracker_details: bool,
    #[serde(default, deserialize_with = "strict_true")]
    pub include_alarm_details: bool,
    #[serde(default, deserialize_with = "strict_true")]
    pub include_progress_details: bool,
    #[serde(default, deserialize_with = "strict_true")]
    pub include_websearch_details: bool,
    /// Only meaningful on records of the "all widgets" list.
    #[serde(default, deserialize_with = "strict_true")]
    pub visibility: bool,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub milestones: Vec<Milestone>,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub alarm_times: Vec<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One progress milestone attached to a task record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    /// Raw date string; parsed leniently at classification time.
    #[serde(default, deserialize_with = "string_or_none")]
    pub due_date: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Milestone {
    pub fn due(date: impl Into<String>) -> Self {
        Self {
            due_date: Some(date.into()),
            extra: BTreeMap::new(),
        }
    }
}

fn strict_true<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(matches!(value, Value::Bool(true)))
}

fn id_string<'de, D>(deserializer: D) -> Result<RecordId, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(raw) => raw,
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    })
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(string_or_none(deserializer)?.unwrap_or_default())
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or(0.0))
}

fn metadata_or_default<'de, D>(deserializer: D) -> Result<WidgetMetadata, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(WidgetMetadata::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(raw) => Some(raw),
        _ => None,
    })
}

fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    // Entries that do not fit the element shape are dropped, not fatal.
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Record-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    MissingId,
    MissingWidgetType { id: RecordId },
}

impl RecordValidationError {
    /// Stable reason code used in diagnostics and log lines.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingId => "missing_id",
            Self::MissingWidgetType { .. } => "missing_widget_type",
        }
    }
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId => write!(f, "widget record id must not be blank"),
            Self::MissingWidgetType { id } => {
                write!(f, "widget record `{id}` has no widget_type")
            }
        }
    }
}

impl Error for RecordValidationError {}

/// Batch decode error; only raised when the payload is not a JSON array.
#[derive(Debug)]
pub enum RecordDecodeError {
    Json(serde_json::Error),
    NotAnArray,
}

impl Display for RecordDecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid widget record payload: {err}"),
            Self::NotAnArray => write!(f, "widget record payload must be a JSON array"),
        }
    }
}

impl Error for RecordDecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
            Self::NotAnArray => None,
        }
    }
}

impl From<serde_json::Error> for RecordDecodeError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

/// Decodes a JSON array of records, dropping entries that fail to decode.
///
/// Dropped entries are logged with their array index. Validation of `id` and
/// `widget_type` is left to the reconciliation pass.
///
/// # Errors
/// - Returns an error when `payload` is not valid JSON or not an array.
pub fn decode_records_lenient(payload: &str) -> Result<Vec<WidgetRecord>, RecordDecodeError> {
    let value: Value = serde_json::from_str(payload)?;
    let Value::Array(items) = value else {
        return Err(RecordDecodeError::NotAnArray);
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<WidgetRecord>(item) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(
                    "event=record_decode_failed module=model status=warn index={} error={}",
                    index, err
                );
            }
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::{
        decode_records_lenient, RecordDecodeError, RecordValidationError, WidgetMetadata,
        WidgetRecord,
    };
    use serde_json::json;

    #[test]
    fn flags_are_true_only_for_boolean_true() {
        let record: WidgetRecord = serde_json::from_value(json!({
            "id": "t1",
            "widget_type": "todo-task",
            "metadata": {
                "include_tracker_details": "true",
                "include_alarm_details": 1,
                "include_progress_details": null,
                "include_websearch_details": true
            }
        }))
        .expect("record should decode");

        assert!(!record.metadata.include_tracker_details);
        assert!(!record.metadata.include_alarm_details);
        assert!(!record.metadata.include_progress_details);
        assert!(record.metadata.include_websearch_details);
    }

    #[test]
    fn type_alias_and_residual_metadata_are_accepted() {
        let record: WidgetRecord = serde_json::from_value(json!({
            "id": "h1",
            "type": "habit",
            "metadata": {"streak_goal": 30, "milestones": "not-a-list"}
        }))
        .expect("record should decode");

        assert_eq!(record.widget_type, "habit");
        assert!(record.metadata.milestones.is_empty());
        assert_eq!(record.metadata.extra["streak_goal"], json!(30));
    }

    #[test]
    fn validate_reports_missing_fields() {
        let err = WidgetRecord::new("  ", "todo-task").validate().unwrap_err();
        assert_eq!(err, RecordValidationError::MissingId);
        assert_eq!(err.reason(), "missing_id");

        let err = WidgetRecord::new("t1", "").validate().unwrap_err();
        assert_eq!(err.reason(), "missing_widget_type");
    }

    #[test]
    fn lenient_decode_drops_non_object_entries() {
        let records = decode_records_lenient(
            r#"[{"id": "a", "widget_type": "habit"}, 42, {"id": "b", "importance": "high"}]"#,
        )
        .expect("array payload should decode");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a");
        assert_eq!(records[1].id, "b");
        assert_eq!(records[1].importance, 0.0);
    }

    #[test]
    fn null_and_mistyped_fields_fall_back_to_defaults() {
        let record: WidgetRecord = serde_json::from_value(json!({
            "id": 7,
            "type": "todo-task",
            "title": null,
            "description": ["not", "text"],
            "importance": null,
            "category": null,
            "metadata": null
        }))
        .expect("record should decode");

        assert_eq!(record.id, "7");
        assert_eq!(record.widget_type, "todo-task");
        assert!(record.title.is_empty());
        assert!(record.description.is_empty());
        assert_eq!(record.importance, 0.0);
        assert_eq!(record.category, None);
        assert_eq!(record.metadata, WidgetMetadata::default());
        assert!(record.validate().is_ok());
    }

    #[test]
    fn lenient_decode_rejects_non_array_payload() {
        let err = decode_records_lenient(r#"{"id": "a"}"#).unwrap_err();
        assert!(matches!(err, RecordDecodeError::NotAnArray));
    }
}
