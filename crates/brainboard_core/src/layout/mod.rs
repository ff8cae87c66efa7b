//! Grid geometry: occupancy tracking, placement search and viewport clamping.
//!
//! All functions here are pure over caller-owned data and perform no I/O.

pub mod constrain;
pub mod occupancy;
pub mod placement;
