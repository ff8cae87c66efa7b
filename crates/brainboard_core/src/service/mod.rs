//! Layout use-case services.
//!
//! # Responsibility
//! - Classify raw widget records and synthesize derived widgets.
//! - Orchestrate placement into one reconciliation pass.
//! - Keep UI callers decoupled from grid and catalog internals.

pub mod classify;
pub mod derive;
pub mod reconcile;
