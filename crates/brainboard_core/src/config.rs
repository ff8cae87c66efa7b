//! Engine configuration.
//!
//! # Responsibility
//! - Hold every tunable used by placement and classification.
//! - Load configuration from JSON text or a JSON file, defaulting missing keys.
//!
//! # Invariants
//! - A config returned by `from_json_str`/`load` has passed `validate`.
//! - Catalog overrides are applied on top of the built-in widget types.

use crate::layout::constrain::ViewportMetrics;
use crate::model::catalog::{CatalogError, WidgetCatalog, WidgetTypeSpec};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Default number of rows scanned before falling back to append-below.
pub const DEFAULT_MAX_SEARCH_ROWS: i32 = 100;
/// Default length of the upcoming-milestone window, in days.
pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;
/// Default importance threshold for `HIGH` priority.
pub const DEFAULT_HIGH_PRIORITY_THRESHOLD: f64 = 0.7;

const MAX_UPCOMING_WINDOW_DAYS: i64 = 366;

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub placement: PlacementConfig,
    pub classification: ClassificationConfig,
    pub viewport: ViewportMetrics,
    /// Overrides or additions to the built-in widget type catalog.
    pub widget_types: Vec<WidgetTypeSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    pub max_search_rows: i32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_search_rows: DEFAULT_MAX_SEARCH_ROWS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationConfig {
    /// Milestones due within `[today, today + upcoming_window_days]` count as upcoming.
    pub upcoming_window_days: i64,
    pub high_priority_threshold: f64,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            upcoming_window_days: DEFAULT_UPCOMING_WINDOW_DAYS,
            high_priority_threshold: DEFAULT_HIGH_PRIORITY_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Parses and validates configuration JSON.
    ///
    /// # Errors
    /// - Returns `ConfigError::Parse` for malformed JSON.
    /// - Returns `ConfigError::Invalid`/`Catalog` when validation fails.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Validates value ranges and catalog overrides.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.placement.max_search_rows < 0 {
            return Err(ConfigError::Invalid(format!(
                "placement.max_search_rows must be >= 0, got {}",
                self.placement.max_search_rows
            )));
        }

        let window = self.classification.upcoming_window_days;
        if !(0..=MAX_UPCOMING_WINDOW_DAYS).contains(&window) {
            return Err(ConfigError::Invalid(format!(
                "classification.upcoming_window_days must be within 0..={MAX_UPCOMING_WINDOW_DAYS}, got {window}"
            )));
        }

        let threshold = self.classification.high_priority_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::Invalid(format!(
                "classification.high_priority_threshold must be within [0, 1], got {threshold}"
            )));
        }

        if self.viewport.row_height <= 0.0 {
            return Err(ConfigError::Invalid(
                "viewport.row_height must be positive".to_string(),
            ));
        }

        self.catalog()?;
        Ok(())
    }

    /// Builds the immutable widget catalog for this configuration.
    pub fn catalog(&self) -> Result<WidgetCatalog, ConfigError> {
        WidgetCatalog::from_overrides(&self.widget_types).map_err(ConfigError::from)
    }
}

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
    Catalog(CatalogError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config JSON: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
            Self::Catalog(err) => write!(f, "invalid widget type catalog: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
            Self::Catalog(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<CatalogError> for ConfigError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}
