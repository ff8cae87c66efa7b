//! Viewport constraint for user-produced rectangles.
//!
//! # Responsibility
//! - Clamp drag/resize output into the visible grid budget.
//! - Derive the row budget from viewport pixel metrics.
//!
//! # Invariants
//! - `constrain` is total: any input yields an in-bounds rect with `w, h >= 1`.
//! - `constrain` is idempotent for fixed bounds and size limits.
//! - Per-widget min/max are honored whenever they fit inside the bounds.

use crate::model::placed_widget::{GridRect, SizeBounds, WidgetLayout};
use serde::{Deserialize, Serialize};

/// Column/row budget of the visible grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub max_cols: i32,
    pub max_rows: i32,
}

impl GridBounds {
    /// Creates bounds, flooring both axes to 1.
    pub fn new(max_cols: i32, max_rows: i32) -> Self {
        Self {
            max_cols: max_cols.max(1),
            max_rows: max_rows.max(1),
        }
    }

    /// Derives bounds from window size and grid pixel metrics.
    ///
    /// Rows follow the grid renderer formula
    /// `floor((height - header - 2 * padding_y + margin_y) / (row_height + margin_y))`.
    pub fn from_viewport(viewport: ViewportSize, metrics: &ViewportMetrics, columns: i32) -> Self {
        let [_, margin_y] = metrics.margin;
        let [_, padding_y] = metrics.container_padding;
        let usable = viewport.height - metrics.header_height - 2.0 * padding_y + margin_y;
        let pitch = metrics.row_height + margin_y;
        let rows = if pitch > 0.0 && usable.is_finite() {
            (usable / pitch).floor()
        } else {
            1.0
        };
        // Float-to-int `as` saturates; non-finite values were handled above.
        Self::new(columns, rows as i32)
    }
}

/// Window size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

/// Pixel metrics of the grid container.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportMetrics {
    pub row_height: f64,
    /// `[horizontal, vertical]` gap between cells.
    pub margin: [f64; 2],
    /// `[horizontal, vertical]` inner padding of the container.
    pub container_padding: [f64; 2],
    pub header_height: f64,
}

impl Default for ViewportMetrics {
    fn default() -> Self {
        Self {
            row_height: 30.0,
            margin: [10.0, 10.0],
            container_padding: [10.0, 10.0],
            header_height: 64.0,
        }
    }
}

/// Clamps `rect` into `bounds` while honoring `size`.
///
/// Sizes are floored to 1 and clamped into the widget's min/max first, then
/// capped at the bound. The position is clamped so the rect fits, and the size
/// is finally trimmed against the space left of the clamped position.
pub fn constrain(rect: GridRect, bounds: GridBounds, size: SizeBounds) -> GridRect {
    let bounds = GridBounds::new(bounds.max_cols, bounds.max_rows);
    let size = size.normalized();

    let w = size.clamp_w(rect.w.max(1)).min(bounds.max_cols);
    let h = size.clamp_h(rect.h.max(1)).min(bounds.max_rows);

    let x = rect.x.clamp(0, bounds.max_cols - w);
    let y = rect.y.clamp(0, bounds.max_rows - h);

    GridRect {
        x,
        y,
        w: w.min(bounds.max_cols - x),
        h: h.min(bounds.max_rows - y),
    }
}

/// Applies `constrain` to a layout entry using its own size limits.
pub fn constrain_layout(layout: WidgetLayout, bounds: GridBounds) -> WidgetLayout {
    let rect = constrain(layout.rect(), bounds, layout.size_bounds());
    WidgetLayout {
        x: rect.x,
        y: rect.y,
        w: rect.w,
        h: rect.h,
        ..layout
    }
}
