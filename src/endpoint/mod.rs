//! Connection targets and the strategies that produce them
//!
//! An [`Endpoint`] is an immutable description of where and how to dial one
//! cluster node. Endpoints come from an [`EndpointFactory`]: first as the
//! bootstrap contact points, then one per row of a topology query.
//!
//! Two strategies exist:
//! * [`DirectEndpointFactory`] resolves contact points through DNS and dials
//!   node addresses directly, without TLS.
//! * [`CloudEndpointFactory`] reads cluster metadata from a secure connect
//!   bundle's metadata service. All nodes share the SNI proxy address and are
//!   told apart by a per-node TLS server name.

mod cloud;
mod direct;
mod metadata;

pub use crate::connection::EndpointTls;
pub use cloud::CloudEndpointFactory;
pub use direct::DirectEndpointFactory;
pub use metadata::{CloudMetadata, ContactInfo, MetadataClient};

use crate::result::Row;
use crate::Result;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::net::SocketAddr;

/// A node reachable at a socket address, without TLS
#[derive(Debug, Clone)]
pub struct DirectEndpoint {
    socket_addr: SocketAddr,
    addr: String,
}

/// A node behind a shared proxy address, selected by TLS server name
#[derive(Debug, Clone)]
pub struct ProxiedEndpoint {
    addr: String,
    tls: EndpointTls,
    key: String,
}

/// Where and how to dial one node
#[derive(Debug, Clone)]
pub enum Endpoint {
    /// Dialed directly
    Direct(DirectEndpoint),
    /// Dialed through an SNI proxy
    Proxied(ProxiedEndpoint),
}

impl Endpoint {
    /// Endpoint for a node at `addr`
    pub fn direct(addr: SocketAddr) -> Self {
        Endpoint::Direct(DirectEndpoint {
            socket_addr: addr,
            addr: addr.to_string(),
        })
    }

    /// Endpoint for the node named by `tls` behind the proxy at `addr`
    /// (`host:port`)
    pub fn proxied(addr: impl Into<String>, tls: EndpointTls) -> Self {
        let addr = addr.into();
        let key = format!("{}:{}", addr, tls.server_name());
        Endpoint::Proxied(ProxiedEndpoint { addr, tls, key })
    }

    /// `host:port` to dial
    pub fn addr(&self) -> &str {
        match self {
            Endpoint::Direct(e) => &e.addr,
            Endpoint::Proxied(e) => &e.addr,
        }
    }

    /// Whether [`addr`](Self::addr) is a socket address that needs no name
    /// resolution
    ///
    /// Proxied endpoints always report `false`: the proxy address is a host
    /// name resolved at dial time.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Endpoint::Direct(_))
    }

    /// TLS settings, present only when the connection must be encrypted
    pub fn tls_config(&self) -> Option<&EndpointTls> {
        match self {
            Endpoint::Direct(_) => None,
            Endpoint::Proxied(e) => Some(&e.tls),
        }
    }

    /// Identity of the routing target
    ///
    /// Unique even when several endpoints share an address: proxied
    /// endpoints append the TLS server name.
    pub fn key(&self) -> &str {
        match self {
            Endpoint::Direct(e) => &e.addr,
            Endpoint::Proxied(e) => &e.key,
        }
    }

    /// The socket address, for resolved endpoints
    pub fn socket_addr(&self) -> Option<SocketAddr> {
        match self {
            Endpoint::Direct(e) => Some(e.socket_addr),
            Endpoint::Proxied(_) => None,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Endpoint {}

impl Hash for Endpoint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

/// Produces endpoints for one resolution strategy
///
/// Factories are immutable once built and may be shared across tasks.
pub trait EndpointFactory: Send + Sync + fmt::Debug {
    /// Endpoints to bootstrap from
    fn contact_points(&self) -> &[Endpoint];

    /// Build the endpoint for a topology row (`system.local` or
    /// `system.peers`)
    fn create(&self, row: &Row<'_>) -> Result<Endpoint>;

    /// Short strategy name, as used in logs and metrics
    fn strategy(&self) -> &'static str;
}
