//! Cloud clusters behind an SNI proxy

use super::metadata::{CloudMetadata, MetadataClient};
use super::{Endpoint, EndpointFactory};
use crate::connection::{node_tls_config, Bundle};
use crate::metrics::{self, labels};
use crate::protocol::constants::columns;
use crate::protocol::Value;
use crate::result::Row;
use crate::{Error, Result};

/// Endpoint factory for clusters reached through a secure connect bundle
///
/// Every endpoint dials the same proxy address. The node is selected by the
/// TLS server name, which is its host id.
#[derive(Debug, Clone)]
pub struct CloudEndpointFactory {
    contact_points: Vec<Endpoint>,
    proxy_address: String,
    local_dc: String,
    region: String,
    bundle: Bundle,
}

impl CloudEndpointFactory {
    /// Fetch cluster metadata from the bundle's metadata service and build
    /// the contact points
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` naming the metadata URL if the fetch
    /// fails, the status is not 2xx, or the document is malformed or lists
    /// no contact points.
    pub async fn resolve(bundle: &Bundle) -> Result<Self> {
        Self::resolve_with(bundle, &MetadataClient::new()).await
    }

    /// Like [`resolve`](Self::resolve), with a caller-configured client
    pub async fn resolve_with(bundle: &Bundle, client: &MetadataClient) -> Result<Self> {
        let result = client
            .fetch(bundle)
            .await
            .and_then(|metadata| Self::from_metadata(bundle, metadata));

        match result {
            Ok(factory) => {
                tracing::info!(
                    proxy = %factory.proxy_address,
                    region = %factory.region,
                    local_dc = %factory.local_dc,
                    contact_points = factory.contact_points.len(),
                    "resolved cloud contact points"
                );
                metrics::counters::contact_points_resolved(
                    labels::STRATEGY_CLOUD,
                    factory.contact_points.len(),
                );
                Ok(factory)
            }
            Err(e) => {
                tracing::warn!(error = %e, "cloud metadata resolution failed");
                metrics::counters::resolution_failed(labels::STRATEGY_CLOUD, e.category());
                Err(e)
            }
        }
    }

    /// Build the factory from an already-fetched metadata document
    ///
    /// # Errors
    ///
    /// * `Error::Resolution` if the document has no proxy address or no
    ///   contact points
    /// * `Error::Config` if a contact point is not a valid TLS server name
    pub fn from_metadata(bundle: &Bundle, metadata: CloudMetadata) -> Result<Self> {
        let info = metadata.contact_info;
        if info.sni_proxy_address.is_empty() {
            return Err(Error::Resolution(format!(
                "metadata from {} has no SNI proxy address",
                bundle.metadata_url()
            )));
        }
        if info.contact_points.is_empty() {
            return Err(Error::Resolution(format!(
                "metadata from {} lists no contact points",
                bundle.metadata_url()
            )));
        }

        let contact_points = info
            .contact_points
            .iter()
            .map(|server_name| {
                node_tls_config(bundle, server_name)
                    .map(|tls| Endpoint::proxied(info.sni_proxy_address.as_str(), tls))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            contact_points,
            proxy_address: info.sni_proxy_address,
            local_dc: info.local_dc,
            region: metadata.region,
            bundle: bundle.clone(),
        })
    }

    /// `host:port` of the SNI proxy
    pub fn proxy_address(&self) -> &str {
        &self.proxy_address
    }

    /// Local datacenter reported by the metadata service
    pub fn local_dc(&self) -> &str {
        &self.local_dc
    }

    /// Cloud region reported by the metadata service
    pub fn region(&self) -> &str {
        &self.region
    }
}

impl EndpointFactory for CloudEndpointFactory {
    fn contact_points(&self) -> &[Endpoint] {
        &self.contact_points
    }

    /// The node's `host_id` becomes its TLS server name
    fn create(&self, row: &Row<'_>) -> Result<Endpoint> {
        let host_id = match row.by_name(columns::HOST_ID)? {
            Value::Uuid(id) => id,
            Value::Null => {
                return Err(Error::Decode(format!(
                    "column '{}' is null",
                    columns::HOST_ID
                )))
            }
            other => {
                return Err(Error::Decode(format!(
                    "column '{}' is {}, expected uuid",
                    columns::HOST_ID,
                    other.kind()
                )))
            }
        };

        let tls = node_tls_config(&self.bundle, &host_id.to_string())?;
        metrics::counters::endpoint_created(labels::STRATEGY_CLOUD);
        Ok(Endpoint::proxied(self.proxy_address.as_str(), tls))
    }

    fn strategy(&self) -> &'static str {
        labels::STRATEGY_CLOUD
    }
}
