//! Cluster topology resolution for CQL proxies.
//!
//! A proxy that fronts a CQL cluster needs to know where the real nodes are.
//! This crate provides the pieces for that:
//!
//! * [`result`] decodes rows out of raw `RESULT` payloads so system-table
//!   queries (`system.local`, `system.peers`) can be read by column name.
//! * [`endpoint`] defines the [`Endpoint`] connection target and the two
//!   [`EndpointFactory`] strategies: plain DNS contact points, and cloud
//!   clusters reached through a single SNI proxy with a per-node TLS identity.
//! * [`connection`] holds the secure connect [`Bundle`], the per-node trust
//!   verifier and a small [`Transport`] for dialing endpoints.
//!
//! # Example
//!
//! ```no_run
//! # async fn example(payload: &[u8]) -> cql_topology::Result<()> {
//! use cql_topology::protocol::{decode_rows_result, ProtocolVersion};
//! use cql_topology::{DirectEndpointFactory, EndpointFactory, RowSet};
//!
//! let factory = DirectEndpointFactory::resolve_default(&["10.0.0.1"]).await?;
//! let version = ProtocolVersion::V4;
//! let rows = RowSet::new(decode_rows_result(payload, version)?, version)?;
//! for row in rows.rows() {
//!     let endpoint = factory.create(&row)?;
//!     println!("discovered {}", endpoint);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod metrics;
pub mod protocol;
pub mod result;

pub use config::{parse_contact_points, ContactPoint, ResolverConfig};
pub use connection::{Bundle, BundleBuilder, Transport, TrustContext};
pub use endpoint::{
    CloudEndpointFactory, CloudMetadata, DirectEndpointFactory, Endpoint, EndpointFactory,
    EndpointTls, MetadataClient,
};
pub use error::{Error, Result};
pub use protocol::Value;
pub use result::{Row, RowSet};
