//! Data model for the layout engine.
//!
//! # Responsibility
//! - Define records consumed from the dashboard backend.
//! - Define positioned descriptors produced for the rendering layer.
//! - Define the immutable widget type catalog.
//!
//! # Invariants
//! - Input records are read-only for the whole pass.
//! - Output ids are derived only from input ids and fixed prefixes.

pub mod catalog;
pub mod placed_widget;
pub mod widget_record;
