//! Widget type catalog.
//!
//! # Responsibility
//! - Map type tags to role, default size, size bounds, category and title.
//! - Provide the closed tag sets used by classification (view, tracker).
//!
//! # Invariants
//! - The catalog is immutable once built; callers share it by reference.
//! - Tags are unique and non-blank.
//! - Entry order is stable and drives view-widget placement order.

use crate::model::placed_widget::SizeBounds;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Catalog tag used for synthesized single-task widgets.
pub const ADVANCED_SINGLE_TASK_TYPE: &str = "advanced-single-task";
/// Catalog tag used for the combined task list.
pub const COMBINED_TASK_LIST_TYPE: &str = "task-list-combined";
/// Catalog tag used for web-search companion widgets.
pub const WEBSEARCH_SUMMARY_TYPE: &str = "websearch-summary";

const FALLBACK_CATEGORY: &str = "task";
const FALLBACK_SIZE: (i32, i32) = (4, 4);

/// How classification treats records of one type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetRole {
    /// Shown only when the "all widgets" record is visible.
    View,
    /// Placed individually as a tracker widget.
    Tracker,
    /// Folded into the combined task list unless advanced.
    Task,
    /// Placed individually under its own id.
    Standalone,
    /// Synthesized by the engine; never a record type.
    Derived,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetTypeSpec {
    pub tag: String,
    pub role: WidgetRole,
    pub title: String,
    pub category: String,
    pub default_w: i32,
    pub default_h: i32,
    #[serde(default)]
    pub bounds: SizeBounds,
}

impl WidgetTypeSpec {
    fn builtin(
        tag: &str,
        role: WidgetRole,
        title: &str,
        category: &str,
        (default_w, default_h): (i32, i32),
        (min_w, min_h): (i32, i32),
        max: Option<(i32, i32)>,
    ) -> Self {
        Self {
            tag: tag.to_string(),
            role,
            title: title.to_string(),
            category: category.to_string(),
            default_w,
            default_h,
            bounds: SizeBounds {
                min_w,
                min_h,
                max_w: max.map(|(w, _)| w),
                max_h: max.map(|(_, h)| h),
            },
        }
    }

    /// Validates declaration-level invariants of one entry.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.tag.trim().is_empty() {
            return Err(CatalogError::EmptyTag);
        }
        if self.default_w < 1 || self.default_h < 1 {
            return Err(CatalogError::InvalidDefaultSize(self.tag.clone()));
        }
        let bounds = self.bounds;
        let max_below_min = matches!(bounds.max_w, Some(max) if max < bounds.min_w)
            || matches!(bounds.max_h, Some(max) if max < bounds.min_h);
        if max_below_min {
            return Err(CatalogError::InvalidBounds(self.tag.clone()));
        }
        Ok(())
    }

    /// Default size clamped into this entry's bounds.
    pub fn default_size(&self) -> (i32, i32) {
        let bounds = self.bounds.normalized();
        (bounds.clamp_w(self.default_w), bounds.clamp_h(self.default_h))
    }
}

/// Built-in entries, in view-widget placement order.
pub fn default_widget_types() -> Vec<WidgetTypeSpec> {
    use WidgetRole::{Derived, Task, Tracker, View};
    vec![
        WidgetTypeSpec::builtin("ai-chat", View, "AI Chat", "assistant", (6, 8), (4, 6), None),
        WidgetTypeSpec::builtin("all-schedules", View, "Schedules", "planner", (4, 6), (3, 4), None),
        WidgetTypeSpec::builtin("mood-tracker", View, "Mood", "wellbeing", (4, 4), (3, 3), Some((6, 6))),
        WidgetTypeSpec::builtin("calendar", Tracker, "Calendar", "tracker", (4, 5), (3, 4), None),
        WidgetTypeSpec::builtin("week-chart", Tracker, "Week", "tracker", (6, 4), (4, 3), Some((12, 6))),
        WidgetTypeSpec::builtin("month-chart", Tracker, "Month", "tracker", (6, 5), (4, 4), Some((12, 8))),
        WidgetTypeSpec::builtin("todo-task", Task, "Task", "task", (4, 4), (3, 3), None),
        WidgetTypeSpec::builtin("habit", Task, "Habit", "habit", (4, 4), (3, 3), None),
        WidgetTypeSpec::builtin("event", Task, "Event", "event", (4, 4), (3, 3), None),
        WidgetTypeSpec::builtin("alarm", Task, "Alarm", "alarm", (4, 4), (3, 3), None),
        WidgetTypeSpec::builtin(
            ADVANCED_SINGLE_TASK_TYPE,
            Derived,
            "Advanced Task",
            "task",
            (4, 6),
            (3, 4),
            None,
        ),
        WidgetTypeSpec::builtin(
            COMBINED_TASK_LIST_TYPE,
            Derived,
            "Tasks",
            "task",
            (4, 7),
            (3, 4),
            None,
        ),
        WidgetTypeSpec::builtin(
            WEBSEARCH_SUMMARY_TYPE,
            Derived,
            "Web Search",
            "research",
            (4, 5),
            (3, 3),
            None,
        ),
    ]
}

/// Immutable type-tag lookup table.
#[derive(Debug, Clone)]
pub struct WidgetCatalog {
    entries: Vec<WidgetTypeSpec>,
    index: HashMap<String, usize>,
}

impl Default for WidgetCatalog {
    /// Built-in entries, indexed without re-validation.
    fn default() -> Self {
        let entries = default_widget_types();
        let index = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.tag.clone(), position))
            .collect();
        Self { entries, index }
    }
}

impl WidgetCatalog {
    /// Builds a catalog from explicit entries.
    ///
    /// # Errors
    /// - Returns an error for an invalid entry or a duplicated tag.
    pub fn new(entries: Vec<WidgetTypeSpec>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            entry.validate()?;
            let tag = entry.tag.trim().to_string();
            if index.insert(tag.clone(), position).is_some() {
                return Err(CatalogError::DuplicateTag(tag));
            }
        }
        Ok(Self { entries, index })
    }

    /// Starts from the built-in entries and applies overrides by tag.
    ///
    /// Overrides with a known tag replace the entry in place; new tags are
    /// appended in override order.
    pub fn from_overrides(overrides: &[WidgetTypeSpec]) -> Result<Self, CatalogError> {
        let mut entries = default_widget_types();
        for entry in overrides {
            let tag = entry.tag.trim();
            let mut normalized = entry.clone();
            normalized.tag = tag.to_string();
            match entries.iter_mut().find(|existing| existing.tag == tag) {
                Some(existing) => *existing = normalized,
                None => entries.push(normalized),
            }
        }
        Self::new(entries)
    }

    pub fn get(&self, tag: &str) -> Option<&WidgetTypeSpec> {
        self.index.get(tag.trim()).map(|&position| &self.entries[position])
    }

    /// Role for `tag`; unknown tags are treated as plain tasks.
    pub fn role_of(&self, tag: &str) -> WidgetRole {
        self.get(tag).map_or(WidgetRole::Task, |entry| entry.role)
    }

    /// Category for `tag`; unknown tags fall back to `task`.
    pub fn category_of(&self, tag: &str) -> &str {
        self.get(tag)
            .map_or(FALLBACK_CATEGORY, |entry| entry.category.as_str())
    }

    /// Default size and limits for `tag`; unknown tags get a 4x4 unbounded size.
    pub fn sizing_of(&self, tag: &str) -> ((i32, i32), SizeBounds) {
        match self.get(tag) {
            Some(entry) => (entry.default_size(), entry.bounds.normalized()),
            None => (FALLBACK_SIZE, SizeBounds::unbounded()),
        }
    }

    /// View-widget entries in catalog order.
    pub fn view_widget_types(&self) -> impl Iterator<Item = &WidgetTypeSpec> {
        self.entries
            .iter()
            .filter(|entry| entry.role == WidgetRole::View)
    }

    pub fn entries(&self) -> &[WidgetTypeSpec] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Catalog declaration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    EmptyTag,
    DuplicateTag(String),
    InvalidDefaultSize(String),
    InvalidBounds(String),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTag => write!(f, "widget type tag must not be empty"),
            Self::DuplicateTag(tag) => write!(f, "widget type tag is duplicated: {tag}"),
            Self::InvalidDefaultSize(tag) => {
                write!(f, "widget type `{tag}` default size must be at least 1x1")
            }
            Self::InvalidBounds(tag) => {
                write!(f, "widget type `{tag}` has max size below min size")
            }
        }
    }
}

impl Error for CatalogError {}
