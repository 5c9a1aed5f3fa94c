//! Counters

use super::labels;

/// Contact points produced by a bootstrap
pub fn contact_points_resolved(strategy: &'static str, count: usize) {
    metrics::counter!(
        "cql_topology_contact_points_resolved_total",
        labels::STRATEGY => strategy
    )
    .increment(count as u64);
}

/// A bootstrap failed; `reason` is an [`Error::category`](crate::Error::category)
pub fn resolution_failed(strategy: &'static str, reason: &'static str) {
    metrics::counter!(
        "cql_topology_resolution_failures_total",
        labels::STRATEGY => strategy,
        labels::REASON => reason
    )
    .increment(1);
}

/// An endpoint was built from a topology row
pub fn endpoint_created(strategy: &'static str) {
    metrics::counter!(
        "cql_topology_endpoints_created_total",
        labels::STRATEGY => strategy
    )
    .increment(1);
}

/// A peer certificate chain was verified
pub fn tls_verification(result: &'static str) {
    metrics::counter!(
        "cql_topology_tls_verifications_total",
        labels::RESULT => result
    )
    .increment(1);
}
