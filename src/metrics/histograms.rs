//! Histograms

/// Time to fetch and parse the cloud metadata document
pub fn metadata_fetch_duration(duration_ms: u64) {
    metrics::histogram!("cql_topology_metadata_fetch_duration_ms").record(duration_ms as f64);
}

/// Time to resolve all direct contact points
pub fn dns_lookup_duration(duration_ms: u64) {
    metrics::histogram!("cql_topology_dns_lookup_duration_ms").record(duration_ms as f64);
}
