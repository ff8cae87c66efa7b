//! Layout engine for the Brainboard dashboard.
//! This crate owns widget classification, derivation and grid placement;
//! rendering, HTTP transport and persistence live outside it.

pub mod config;
pub mod layout;
pub mod logging;
pub mod model;
pub mod service;

pub use config::{ClassificationConfig, ConfigError, EngineConfig, PlacementConfig};
pub use layout::constrain::{
    constrain, constrain_layout, GridBounds, ViewportMetrics, ViewportSize,
};
pub use layout::occupancy::OccupancyGrid;
pub use layout::placement::{find_position, place_widget, LayoutError};
pub use logging::{default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget};
pub use model::catalog::{CatalogError, WidgetCatalog, WidgetRole, WidgetTypeSpec};
pub use model::placed_widget::{
    GridPosition, GridRect, PlacedWidget, PresentationType, Priority, SizeBounds, TaskSummary,
    WidgetLayout,
};
pub use model::widget_record::{
    decode_records_lenient, Milestone, RecordDecodeError, RecordValidationError, WidgetMetadata,
    WidgetRecord,
};
pub use service::classify::{classify_record, AdvancedFeatures, RecordBucket, RecordClassification};
pub use service::derive::{derive_widgets, DerivedWidgets, WidgetDraft};
pub use service::reconcile::{
    reconcile, DiagnosticStage, LayoutPlan, LayoutService, PassDiagnostic, ReconcileInput,
};

/// Returns the engine crate version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
