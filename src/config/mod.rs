//! Resolver configuration
//!
//! [`ResolverConfig`] picks a resolution strategy and carries the settings
//! bootstrap needs. [`ResolverConfig::resolve`] runs the bootstrap and hands
//! back the factory as a trait object, so callers never branch on the
//! strategy themselves.

mod contact_point;

pub use contact_point::{parse_contact_points, ContactPoint};

use crate::connection::Bundle;
use crate::endpoint::{CloudEndpointFactory, DirectEndpointFactory, EndpointFactory, MetadataClient};
use crate::protocol::DEFAULT_PORT;
use crate::{Error, Result};
use std::sync::Arc;
use std::time::Duration;

/// Which resolution strategy to use
#[derive(Debug, Clone)]
pub enum Strategy {
    /// DNS contact points, nodes dialed directly
    Direct {
        /// Hosts to bootstrap from
        contact_points: Vec<ContactPoint>,
        /// Port for contact points without one, and for discovered nodes
        default_port: u16,
    },
    /// Secure connect bundle, nodes behind an SNI proxy
    Cloud {
        /// The bundle
        bundle: Bundle,
    },
}

/// Settings for topology bootstrap
///
/// # Examples
///
/// ```
/// use cql_topology::{parse_contact_points, ResolverConfig};
///
/// let config = ResolverConfig::builder()
///     .contact_points(parse_contact_points("10.0.0.1,10.0.0.2:9043").unwrap())
///     .build()
///     .unwrap();
/// assert_eq!(config.strategy_name(), "direct");
/// ```
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    strategy: Strategy,
    metadata_timeout: Option<Duration>,
}

impl ResolverConfig {
    /// Create a configuration builder
    pub fn builder() -> ResolverConfigBuilder {
        ResolverConfigBuilder::default()
    }

    /// The selected strategy
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// Strategy name, as used in logs and metrics
    pub fn strategy_name(&self) -> &'static str {
        match self.strategy {
            Strategy::Direct { .. } => crate::metrics::labels::STRATEGY_DIRECT,
            Strategy::Cloud { .. } => crate::metrics::labels::STRATEGY_CLOUD,
        }
    }

    /// Timeout for the cloud metadata fetch
    pub fn metadata_timeout(&self) -> Option<Duration> {
        self.metadata_timeout
    }

    /// Run bootstrap and return the factory for the configured strategy
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` if contact points cannot be resolved or
    /// the metadata service cannot be read.
    pub async fn resolve(&self) -> Result<Arc<dyn EndpointFactory>> {
        match &self.strategy {
            Strategy::Direct {
                contact_points,
                default_port,
            } => {
                let factory =
                    DirectEndpointFactory::resolve_contact_points(contact_points, *default_port)
                        .await?;
                Ok(Arc::new(factory))
            }
            Strategy::Cloud { bundle } => {
                let mut client = MetadataClient::new();
                if let Some(timeout) = self.metadata_timeout {
                    client = client.timeout(timeout);
                }
                let factory = CloudEndpointFactory::resolve_with(bundle, &client).await?;
                Ok(Arc::new(factory))
            }
        }
    }
}

/// Builder for [`ResolverConfig`]
///
/// Set either contact points or a bundle, not both.
#[derive(Debug, Clone, Default)]
pub struct ResolverConfigBuilder {
    contact_points: Vec<ContactPoint>,
    default_port: Option<u16>,
    bundle: Option<Bundle>,
    metadata_timeout: Option<Duration>,
}

impl ResolverConfigBuilder {
    /// Use the direct strategy with these contact points
    pub fn contact_points(mut self, contact_points: Vec<ContactPoint>) -> Self {
        self.contact_points = contact_points;
        self
    }

    /// Add one contact point
    pub fn contact_point(mut self, contact_point: ContactPoint) -> Self {
        self.contact_points.push(contact_point);
        self
    }

    /// Port for contact points without one and for discovered nodes
    ///
    /// Default: 9042
    pub fn default_port(mut self, port: u16) -> Self {
        self.default_port = Some(port);
        self
    }

    /// Use the cloud strategy with this bundle
    pub fn bundle(mut self, bundle: Bundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// Bound the cloud metadata fetch
    ///
    /// Default: None (no timeout)
    pub fn metadata_timeout(mut self, timeout: Duration) -> Self {
        self.metadata_timeout = Some(timeout);
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if neither or both of contact points and
    /// bundle are set, if the default port is 0, or if a default port is
    /// combined with a bundle.
    pub fn build(self) -> Result<ResolverConfig> {
        let strategy = match (self.contact_points.is_empty(), self.bundle) {
            (false, None) => {
                let default_port = self.default_port.unwrap_or(DEFAULT_PORT);
                if default_port == 0 {
                    return Err(Error::Config("default port must be non-zero".into()));
                }
                Strategy::Direct {
                    contact_points: self.contact_points,
                    default_port,
                }
            }
            (true, Some(bundle)) => {
                if self.default_port.is_some() {
                    return Err(Error::Config(
                        "default port does not apply to bundle configurations".into(),
                    ));
                }
                Strategy::Cloud { bundle }
            }
            (true, None) => {
                return Err(Error::Config(
                    "either contact points or a bundle is required".into(),
                ))
            }
            (false, Some(_)) => {
                return Err(Error::Config(
                    "contact points and a bundle cannot be combined".into(),
                ))
            }
        };

        Ok(ResolverConfig {
            strategy,
            metadata_timeout: self.metadata_timeout,
        })
    }
}
