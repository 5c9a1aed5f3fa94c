//! Metrics for topology resolution
//!
//! Thin wrappers over the `metrics` facade. Nothing is recorded unless the
//! application installs a recorder; this crate never installs one.

pub mod counters;
pub mod histograms;
pub mod labels;
