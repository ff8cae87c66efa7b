//! Per-record classification.
//!
//! # Responsibility
//! - Decide the single presentation bucket of one daily record.
//! - Decide whether a record also gets a web-search companion.
//! - Evaluate the upcoming-milestone window leniently.
//!
//! # Invariants
//! - Classification reads the record only; it never mutates it.
//! - Unparseable milestone dates are "not upcoming", never an error.
//! - The web-search decision is independent of the primary bucket.

use crate::config::ClassificationConfig;
use crate::model::catalog::{WidgetCatalog, WidgetRole};
use crate::model::widget_record::{WidgetMetadata, WidgetRecord};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

const NAIVE_DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Feature flags that promoted a record to an advanced single-task widget.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvancedFeatures {
    pub tracker: bool,
    pub alarm: bool,
    pub upcoming_milestone: bool,
}

impl AdvancedFeatures {
    pub fn any(&self) -> bool {
        self.tracker || self.alarm || self.upcoming_milestone
    }
}

/// Primary presentation bucket of one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordBucket {
    AdvancedSingleTask(AdvancedFeatures),
    Tracker,
    Standalone,
    RegularTask,
}

/// Classification outcome for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordClassification {
    pub bucket: RecordBucket,
    pub websearch: bool,
}

/// Classifies one valid, non-view record.
///
/// Advanced features win over the tracker role; everything not advanced,
/// tracker or standalone lands in the regular-task bucket.
pub fn classify_record(
    record: &WidgetRecord,
    catalog: &WidgetCatalog,
    config: &ClassificationConfig,
    today: NaiveDate,
) -> RecordClassification {
    let metadata = &record.metadata;
    let features = AdvancedFeatures {
        tracker: metadata.include_tracker_details,
        alarm: metadata.include_alarm_details,
        upcoming_milestone: has_upcoming_milestone(metadata, today, config.upcoming_window_days),
    };

    let bucket = if features.any() {
        RecordBucket::AdvancedSingleTask(features)
    } else {
        match catalog.role_of(&record.widget_type) {
            WidgetRole::Tracker => RecordBucket::Tracker,
            WidgetRole::Standalone => RecordBucket::Standalone,
            WidgetRole::Task | WidgetRole::View | WidgetRole::Derived => RecordBucket::RegularTask,
        }
    };

    RecordClassification {
        bucket,
        websearch: metadata.include_websearch_details,
    }
}

/// Returns whether progress tracking is on and any milestone is due within
/// `[today, today + window_days]`.
pub fn has_upcoming_milestone(metadata: &WidgetMetadata, today: NaiveDate, window_days: i64) -> bool {
    if !metadata.include_progress_details {
        return false;
    }
    let Ok(days) = u64::try_from(window_days) else {
        return false;
    };
    let window_end = today
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX);

    metadata
        .milestones
        .iter()
        .filter_map(|milestone| milestone.due_date.as_deref())
        .filter_map(parse_due_date)
        .any(|due| today <= due && due <= window_end)
}

/// Parses a milestone due date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps (date taken in their own offset)
/// and naive `YYYY-MM-DDTHH:MM:SS` timestamps.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(timestamp.date_naive());
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|timestamp| timestamp.date())
}
