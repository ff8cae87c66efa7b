//! Reconciliation pass: derive, then place.
//!
//! # Responsibility
//! - Run one full pass from raw records to positioned descriptors.
//! - Place drafts sequentially against a fresh occupancy grid.
//! - Expose the drag/resize constraint entry point for UI callers.
//!
//! # Invariants
//! - Every pass builds its own `OccupancyGrid`; no state survives a pass.
//! - Placement order is view, individual, combined task list, web search.
//! - No error escapes a pass; skips are reported as diagnostics.
//! - Identical input yields identical output.

use crate::config::{ConfigError, EngineConfig};
use crate::layout::constrain::{constrain_layout, GridBounds};
use crate::layout::occupancy::OccupancyGrid;
use crate::layout::placement::{place_widget, LayoutError};
use crate::model::catalog::WidgetCatalog;
use crate::model::placed_widget::{PlacedWidget, WidgetLayout};
use crate::model::widget_record::WidgetRecord;
use crate::service::derive::{derive_widgets, WidgetDraft};
use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// Pass stage that produced a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticStage {
    Classification,
    Placement,
}

/// One skipped record or widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassDiagnostic {
    pub stage: DiagnosticStage,
    /// Record id, widget id, or `#<index>` when the record has no id.
    pub subject: String,
    /// Stable reason code, e.g. `missing_id`, `widget_too_wide`.
    pub reason: String,
    pub message: String,
}

/// Input of one reconciliation pass.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    /// Daily widget records.
    pub records: &'a [WidgetRecord],
    /// "All widgets" list, used only for view-widget visibility.
    pub all_widgets: &'a [WidgetRecord],
    /// Placement column count, floored to 1. Placement has no row limit; rows
    /// are bounded only when a user layout passes through `constrain_layout`.
    pub columns: i32,
    /// Reference date for the upcoming-milestone window.
    pub today: NaiveDate,
}

/// Output of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutPlan {
    pub widgets: Vec<PlacedWidget>,
    #[serde(default)]
    pub diagnostics: Vec<PassDiagnostic>,
}

impl LayoutPlan {
    pub fn get(&self, id: &str) -> Option<&PlacedWidget> {
        self.widgets.iter().find(|widget| widget.id == id)
    }
}

/// Runs one full pass with an explicit catalog and configuration.
pub fn reconcile(input: ReconcileInput<'_>, catalog: &WidgetCatalog, config: &EngineConfig) -> LayoutPlan {
    let derived = derive_widgets(
        input.records,
        input.all_widgets,
        catalog,
        &config.classification,
        input.today,
    );
    let (drafts, mut diagnostics) = derived.into_placement_order();

    let columns = input.columns.max(1);
    let max_search_rows = config.placement.max_search_rows;
    let mut grid = OccupancyGrid::new();
    let mut widgets = Vec::with_capacity(drafts.len());

    for draft in drafts {
        let ((w, h), size_bounds) = catalog.sizing_of(&draft.widget_type);
        match place_widget(w, h, &mut grid, columns, max_search_rows) {
            Ok(rect) => {
                debug!(
                    "event=widget_placed module=reconcile status=ok id={} x={} y={} w={} h={}",
                    draft.id, rect.x, rect.y, rect.w, rect.h
                );
                widgets.push(into_placed(draft, WidgetLayout::from_rect(rect, size_bounds)));
            }
            Err(err @ LayoutError::WidgetTooWide { .. }) => {
                warn!(
                    "event=widget_skipped module=reconcile status=warn id={} reason=widget_too_wide width={} columns={}",
                    draft.id, w, columns
                );
                diagnostics.push(PassDiagnostic {
                    stage: DiagnosticStage::Placement,
                    subject: draft.id,
                    reason: "widget_too_wide".to_string(),
                    message: err.to_string(),
                });
            }
        }
    }

    info!(
        "event=reconcile_pass module=reconcile status=ok records={} placed={} skipped={}",
        input.records.len(),
        widgets.len(),
        diagnostics.len()
    );

    LayoutPlan {
        widgets,
        diagnostics,
    }
}

fn into_placed(draft: WidgetDraft, layout: WidgetLayout) -> PlacedWidget {
    PlacedWidget {
        id: draft.id,
        presentation_type: draft.presentation_type,
        widget_type: draft.widget_type,
        title: draft.title,
        source_record_id: draft.source_record_id,
        combined_source_ids: draft.combined_source_ids,
        priority: draft.priority,
        metadata: draft.metadata,
        layout,
    }
}

/// Layout use-case service holding the immutable catalog and configuration.
#[derive(Debug, Clone)]
pub struct LayoutService {
    config: EngineConfig,
    catalog: WidgetCatalog,
}

impl LayoutService {
    /// Creates a service, validating `config` and building its catalog once.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = config.catalog()?;
        Ok(Self { config, catalog })
    }

    /// Creates a service with built-in defaults.
    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
            catalog: WidgetCatalog::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &WidgetCatalog {
        &self.catalog
    }

    /// Runs one reconciliation pass.
    pub fn reconcile(&self, input: ReconcileInput<'_>) -> LayoutPlan {
        reconcile(input, &self.catalog, &self.config)
    }

    /// Clamps a user-dragged or resized layout entry before it is accepted.
    pub fn accept_user_layout(&self, layout: WidgetLayout, bounds: GridBounds) -> WidgetLayout {
        constrain_layout(layout, bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::{LayoutService, ReconcileInput};
    use crate::config::EngineConfig;
    use crate::layout::constrain::GridBounds;
    use crate::model::catalog::{WidgetRole, WidgetTypeSpec};
    use crate::model::placed_widget::{PresentationType, SizeBounds, WidgetLayout};
    use crate::model::widget_record::WidgetRecord;
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date")
    }

    #[test]
    fn too_wide_widgets_are_skipped_with_diagnostic() {
        let service = LayoutService::with_defaults();
        let records = vec![WidgetRecord::new("w1", "week-chart")];
        let plan = service.reconcile(ReconcileInput {
            records: &records,
            all_widgets: &[],
            columns: 4,
            today: today(),
        });

        assert!(plan.widgets.is_empty());
        assert_eq!(plan.diagnostics.len(), 1);
        assert_eq!(plan.diagnostics[0].subject, "tracker-w1");
        assert_eq!(plan.diagnostics[0].reason, "widget_too_wide");
    }

    #[test]
    fn standalone_types_pass_through_under_record_id() {
        let config = EngineConfig {
            widget_types: vec![WidgetTypeSpec {
                tag: "sticky-note".to_string(),
                role: WidgetRole::Standalone,
                title: "Sticky".to_string(),
                category: "note".to_string(),
                default_w: 2,
                default_h: 2,
                bounds: SizeBounds::unbounded(),
            }],
            ..EngineConfig::default()
        };
        let service = LayoutService::new(config).expect("config should validate");
        let records = vec![WidgetRecord::new("n1", "sticky-note")];
        let plan = service.reconcile(ReconcileInput {
            records: &records,
            all_widgets: &[],
            columns: 12,
            today: today(),
        });

        let widget = plan.get("n1").expect("passthrough widget");
        assert_eq!(widget.presentation_type, PresentationType::Passthrough);
        assert_eq!((widget.layout.w, widget.layout.h), (2, 2));
    }

    #[test]
    fn accept_user_layout_clamps_into_bounds() {
        let service = LayoutService::with_defaults();
        let layout = WidgetLayout {
            x: -4,
            y: 30,
            w: 20,
            h: 2,
            min_w: 3,
            min_h: 2,
            max_w: None,
            max_h: None,
        };
        let accepted = service.accept_user_layout(layout, GridBounds::new(12, 10));
        assert_eq!((accepted.x, accepted.y, accepted.w, accepted.h), (0, 8, 12, 2));
    }
}
