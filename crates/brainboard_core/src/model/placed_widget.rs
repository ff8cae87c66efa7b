//! Positioned widget descriptors produced by one reconciliation pass.
//!
//! # Responsibility
//! - Define grid geometry shared by placement and constraint code.
//! - Define the descriptor consumed by the rendering layer.
//!
//! # Invariants
//! - Synthesized ids use stable prefixes so identical input yields identical ids.
//! - `SizeBounds::normalized` always yields `1 <= min <= max`.
//! - Metadata maps are ordered so serialized output is byte-stable.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Id prefix for synthesized single-task widgets.
pub const ADVANCED_ID_PREFIX: &str = "advanced-single-task-";
/// Id prefix for tracker widgets.
pub const TRACKER_ID_PREFIX: &str = "tracker-";
/// Id prefix for web-search companion widgets.
pub const WEBSEARCH_ID_PREFIX: &str = "websearch-";
/// Id prefix for visibility-controlled view widgets.
pub const VIEW_ID_PREFIX: &str = "auto-";
/// Fixed id of the combined task list.
pub const COMBINED_TASK_LIST_ID: &str = "task-list-combined";
/// Metadata key holding combined task summaries.
pub const COMBINED_TASKS_KEY: &str = "combined_tasks";

/// Top-left grid cell of a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

/// Rectangle in grid units. Signed so raw drag/resize input can be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl GridRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Returns whether both rects share at least one cell.
    pub fn overlaps(&self, other: &GridRect) -> bool {
        self.w > 0
            && self.h > 0
            && other.w > 0
            && other.h > 0
            && self.x < other.x.saturating_add(other.w)
            && other.x < self.x.saturating_add(self.w)
            && self.y < other.y.saturating_add(other.h)
            && other.y < self.y.saturating_add(self.h)
    }
}

/// Per-widget size limits; `None` max means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeBounds {
    #[serde(default = "one")]
    pub min_w: i32,
    #[serde(default = "one")]
    pub min_h: i32,
    #[serde(default)]
    pub max_w: Option<i32>,
    #[serde(default)]
    pub max_h: Option<i32>,
}

fn one() -> i32 {
    1
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl SizeBounds {
    pub fn unbounded() -> Self {
        Self {
            min_w: 1,
            min_h: 1,
            max_w: None,
            max_h: None,
        }
    }

    /// Floors mins to 1 and lifts maxes to at least the matching min.
    pub fn normalized(self) -> Self {
        let min_w = self.min_w.max(1);
        let min_h = self.min_h.max(1);
        Self {
            min_w,
            min_h,
            max_w: self.max_w.map(|max| max.max(min_w)),
            max_h: self.max_h.map(|max| max.max(min_h)),
        }
    }

    /// Clamps a width into `[min_w, max_w]`.
    pub fn clamp_w(&self, w: i32) -> i32 {
        clamp_axis(w, self.min_w, self.max_w)
    }

    /// Clamps a height into `[min_h, max_h]`.
    pub fn clamp_h(&self, h: i32) -> i32 {
        clamp_axis(h, self.min_h, self.max_h)
    }
}

fn clamp_axis(value: i32, min: i32, max: Option<i32>) -> i32 {
    let value = value.max(min);
    match max {
        Some(max) => value.min(max),
        None => value,
    }
}

/// Layout entry in the shape the grid renderer expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetLayout {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub min_w: i32,
    pub min_h: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_w: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<i32>,
}

impl WidgetLayout {
    pub fn from_rect(rect: GridRect, bounds: SizeBounds) -> Self {
        Self {
            x: rect.x,
            y: rect.y,
            w: rect.w,
            h: rect.h,
            min_w: bounds.min_w,
            min_h: bounds.min_h,
            max_w: bounds.max_w,
            max_h: bounds.max_h,
        }
    }

    pub fn rect(&self) -> GridRect {
        GridRect::new(self.x, self.y, self.w, self.h)
    }

    pub fn size_bounds(&self) -> SizeBounds {
        SizeBounds {
            min_w: self.min_w,
            min_h: self.min_h,
            max_w: self.max_w,
            max_h: self.max_h,
        }
    }
}

/// Presentation bucket of one placed widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PresentationType {
    AdvancedSingleTask,
    Tracker,
    CombinedTaskList,
    WebSearch,
    ViewWidget,
    Passthrough,
}

impl PresentationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AdvancedSingleTask => "advanced-single-task",
            Self::Tracker => "tracker",
            Self::CombinedTaskList => "combined-task-list",
            Self::WebSearch => "web-search",
            Self::ViewWidget => "view-widget",
            Self::Passthrough => "passthrough",
        }
    }
}

/// Priority tag of generated single-task widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Low,
}

impl Priority {
    /// `High` when `importance >= threshold`. NaN importance maps to `Low`.
    pub fn from_importance(importance: f64, threshold: f64) -> Self {
        if importance >= threshold {
            Self::High
        } else {
            Self::Low
        }
    }
}

/// Lightweight summary of one task folded into the combined list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub importance: f64,
    pub category: String,
}

/// One positioned descriptor handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedWidget {
    pub id: String,
    pub presentation_type: PresentationType,
    /// Catalog tag whose size defaults were applied.
    pub widget_type: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_record_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub combined_source_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub metadata: BTreeMap<String, Value>,
    pub layout: WidgetLayout,
}

impl PlacedWidget {
    pub fn rect(&self) -> GridRect {
        self.layout.rect()
    }
}
