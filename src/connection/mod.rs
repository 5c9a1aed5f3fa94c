//! Secure transport
//!
//! This module handles:
//! * Secure connect bundles (CA trust, metadata service, client identity)
//! * Per-node TLS configuration for SNI-proxied clusters
//! * Certificate chain verification anchored at the bundle host
//! * Dialing endpoints over TCP with optional TLS

mod bundle;
mod tls;
mod transport;
mod trust;

pub use bundle::{Bundle, BundleBuilder};
pub use tls::{parse_server_name, EndpointTls};
pub use transport::Transport;
pub use trust::{node_tls_config, SniProxyVerifier, TrustContext};
