//! DNS contact points, nodes dialed by address

use super::{Endpoint, EndpointFactory};
use crate::config::ContactPoint;
use crate::metrics::{self, labels};
use crate::protocol::constants::{columns, DEFAULT_PORT};
use crate::protocol::Value;
use crate::result::Row;
use crate::{Error, Result};
use futures::future::try_join_all;
use std::collections::HashSet;
use std::net::{IpAddr, SocketAddr};
use std::time::Instant;

/// Endpoint factory for clusters reachable directly
#[derive(Debug, Clone)]
pub struct DirectEndpointFactory {
    contact_points: Vec<Endpoint>,
    default_port: u16,
}

impl DirectEndpointFactory {
    /// Factory over already-resolved contact points
    pub fn new(contact_points: Vec<Endpoint>, default_port: u16) -> Self {
        Self {
            contact_points,
            default_port,
        }
    }

    /// Resolve contact point strings, using port 9042 where none is given
    pub async fn resolve_default<S: AsRef<str>>(contact_points: &[S]) -> Result<Self> {
        Self::resolve(contact_points, DEFAULT_PORT).await
    }

    /// Resolve contact point strings (`host`, `host:port`, `[ipv6]:port`)
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` naming the offending contact point if any
    /// of them is malformed or cannot be resolved. No partial result is
    /// returned.
    pub async fn resolve<S: AsRef<str>>(contact_points: &[S], default_port: u16) -> Result<Self> {
        let parsed = contact_points
            .iter()
            .map(|cp| {
                ContactPoint::parse(cp.as_ref()).map_err(|e| match e {
                    Error::Config(msg) => Error::Resolution(msg),
                    other => other,
                })
            })
            .collect::<Result<Vec<_>>>();

        match parsed {
            Ok(parsed) => Self::resolve_contact_points(&parsed, default_port).await,
            Err(e) => {
                metrics::counters::resolution_failed(labels::STRATEGY_DIRECT, e.category());
                Err(e)
            }
        }
    }

    /// Resolve parsed contact points
    ///
    /// Lookups run concurrently. Every address a host resolves to becomes
    /// one endpoint; addresses reached through several contact points appear
    /// once, in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` if the list is empty, `default_port` is 0,
    /// or any lookup fails or yields no addresses.
    pub async fn resolve_contact_points(
        contact_points: &[ContactPoint],
        default_port: u16,
    ) -> Result<Self> {
        let start = Instant::now();
        let result = lookup_all(contact_points, default_port).await;
        metrics::histograms::dns_lookup_duration(start.elapsed().as_millis() as u64);

        let resolved = match result {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::warn!(error = %e, "contact point resolution failed");
                metrics::counters::resolution_failed(labels::STRATEGY_DIRECT, e.category());
                return Err(e);
            }
        };

        let mut seen = HashSet::new();
        let endpoints: Vec<Endpoint> = resolved
            .into_iter()
            .flatten()
            .filter(|addr| seen.insert(*addr))
            .map(Endpoint::direct)
            .collect();

        tracing::info!(
            contact_points = contact_points.len(),
            endpoints = endpoints.len(),
            "resolved contact points"
        );
        metrics::counters::contact_points_resolved(labels::STRATEGY_DIRECT, endpoints.len());

        Ok(Self::new(endpoints, default_port))
    }

    /// Port used for nodes discovered through topology rows
    pub fn default_port(&self) -> u16 {
        self.default_port
    }
}

impl EndpointFactory for DirectEndpointFactory {
    fn contact_points(&self) -> &[Endpoint] {
        &self.contact_points
    }

    /// Uses `rpc_address`, falling back to `peer` when the node reports the
    /// unspecified address.
    fn create(&self, row: &Row<'_>) -> Result<Endpoint> {
        let mut ip = inet_column(row, columns::RPC_ADDRESS)?;
        if ip.is_unspecified() {
            ip = inet_column(row, columns::PEER)?;
        }

        metrics::counters::endpoint_created(labels::STRATEGY_DIRECT);
        Ok(Endpoint::direct(SocketAddr::new(ip, self.default_port)))
    }

    fn strategy(&self) -> &'static str {
        labels::STRATEGY_DIRECT
    }
}

async fn lookup_all(
    contact_points: &[ContactPoint],
    default_port: u16,
) -> Result<Vec<Vec<SocketAddr>>> {
    if contact_points.is_empty() {
        return Err(Error::Resolution("no contact points given".into()));
    }
    if default_port == 0 {
        return Err(Error::Resolution("default port must be non-zero".into()));
    }

    try_join_all(contact_points.iter().map(|cp| lookup(cp, default_port))).await
}

async fn lookup(contact_point: &ContactPoint, default_port: u16) -> Result<Vec<SocketAddr>> {
    let port = contact_point.port_or(default_port);
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((contact_point.host(), port))
        .await
        .map_err(|e| {
            Error::Resolution(format!(
                "unable to resolve contact point {}: {}",
                contact_point, e
            ))
        })?
        .collect();

    if addrs.is_empty() {
        return Err(Error::Resolution(format!(
            "contact point {} resolved to no addresses",
            contact_point
        )));
    }

    tracing::debug!(contact_point = %contact_point, addresses = addrs.len(), "resolved");
    Ok(addrs)
}

fn inet_column(row: &Row<'_>, name: &str) -> Result<IpAddr> {
    match row.by_name(name)? {
        Value::Inet(ip) => Ok(ip),
        Value::Null => Err(Error::Decode(format!("column '{}' is null", name))),
        other => Err(Error::Decode(format!(
            "column '{}' is {}, expected inet",
            name,
            other.kind()
        ))),
    }
}
