//! Secure connect bundle: CA trust, metadata service coordinates and an
//! optional client identity.
//!
//! The bundle is read-only once built. Per-node TLS configurations share its
//! root store and client identity by reference; nothing here is mutated
//! after [`BundleBuilder::build`].

use super::tls::{
    client_config_builder, load_cert_chain, load_native_roots, load_private_key,
    load_root_store, read_pem_file,
};
use crate::{Error, Result};
use rustls::client::WantsClientCert;
use rustls::{ClientConfig, ConfigBuilder, RootCertStore};
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use std::sync::Arc;

/// Client certificate chain and key for mutual TLS
struct ClientIdentity {
    cert_chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
}

/// Secure connect bundle
///
/// # Examples
///
/// ```ignore
/// let bundle = Bundle::builder()
///     .host("abc123-us-east1.db.example.com")
///     .port(29080)
///     .ca_cert_path("/secure-connect/ca.crt")
///     .client_cert_path("/secure-connect/cert")
///     .client_key_path("/secure-connect/key")
///     .build()?;
/// ```
#[derive(Clone)]
pub struct Bundle {
    host: String,
    port: u16,
    roots: Arc<RootCertStore>,
    client_identity: Option<Arc<ClientIdentity>>,
}

impl Bundle {
    /// Create a bundle builder
    pub fn builder() -> BundleBuilder {
        BundleBuilder::default()
    }

    /// Host of the metadata service; also the name proxy certificates are issued for
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Port of the metadata service
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Trusted CA certificates
    pub fn roots(&self) -> Arc<RootCertStore> {
        self.roots.clone()
    }

    /// Whether a client certificate is configured
    pub fn has_client_identity(&self) -> bool {
        self.client_identity.is_some()
    }

    /// `host:port` of the metadata service, bracketing IPv6 literals
    pub fn authority(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// URL of the cluster metadata document
    pub fn metadata_url(&self) -> String {
        format!("https://{}/metadata", self.authority())
    }

    /// Client configuration for talking to the metadata service.
    ///
    /// Uses standard verification: the certificate must chain to the bundle
    /// CA and be valid for the bundle host. A new configuration is built on
    /// every call.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the client certificate and key do not match.
    pub fn tls_config(&self) -> Result<Arc<ClientConfig>> {
        let builder = client_config_builder()?.with_root_certificates(self.roots.clone());
        Ok(Arc::new(self.with_client_auth(builder)?))
    }

    /// Finish a client configuration with the bundle's client identity, if any.
    pub(crate) fn with_client_auth(
        &self,
        builder: ConfigBuilder<ClientConfig, WantsClientCert>,
    ) -> Result<ClientConfig> {
        match &self.client_identity {
            Some(identity) => builder
                .with_client_auth_cert(identity.cert_chain.clone(), identity.key.clone_key())
                .map_err(|e| Error::Config(format!("Invalid client certificate or key: {}", e))),
            None => Ok(builder.with_no_client_auth()),
        }
    }
}

impl std::fmt::Debug for Bundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundle")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("roots", &self.roots.len())
            .field("client_identity", &self.client_identity.is_some())
            .finish()
    }
}

/// Where a PEM document comes from
#[derive(Clone)]
enum PemSource {
    Path(String),
    Inline(Vec<u8>),
}

impl PemSource {
    fn load(&self, what: &str) -> Result<(Vec<u8>, String)> {
        match self {
            PemSource::Path(path) => Ok((read_pem_file(path, what)?, path.clone())),
            PemSource::Inline(pem) => Ok((pem.clone(), format!("inline {}", what))),
        }
    }
}

/// Builder for [`Bundle`]
#[derive(Clone, Default)]
pub struct BundleBuilder {
    host: Option<String>,
    port: Option<u16>,
    ca: Option<PemSource>,
    client_cert: Option<PemSource>,
    client_key: Option<PemSource>,
}

impl BundleBuilder {
    /// Metadata service host (required)
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Metadata service port (required)
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Path to the CA certificate file (PEM)
    ///
    /// If no CA is set, system root certificates are used.
    pub fn ca_cert_path(mut self, path: impl Into<String>) -> Self {
        self.ca = Some(PemSource::Path(path.into()));
        self
    }

    /// CA certificates as PEM bytes
    pub fn ca_cert_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.ca = Some(PemSource::Inline(pem.into()));
        self
    }

    /// Path to the client certificate chain (PEM)
    pub fn client_cert_path(mut self, path: impl Into<String>) -> Self {
        self.client_cert = Some(PemSource::Path(path.into()));
        self
    }

    /// Client certificate chain as PEM bytes
    pub fn client_cert_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.client_cert = Some(PemSource::Inline(pem.into()));
        self
    }

    /// Path to the client private key (PEM)
    pub fn client_key_path(mut self, path: impl Into<String>) -> Self {
        self.client_key = Some(PemSource::Path(path.into()));
        self
    }

    /// Client private key as PEM bytes
    pub fn client_key_pem(mut self, pem: impl Into<Vec<u8>>) -> Self {
        self.client_key = Some(PemSource::Inline(pem.into()));
        self
    }

    /// Build the bundle.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if:
    /// - host or port is missing, or the port is 0
    /// - a certificate or key file cannot be read or parsed
    /// - only one of client certificate and client key is set
    pub fn build(self) -> Result<Bundle> {
        let host = self
            .host
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::Config("bundle requires a metadata host".into()))?;
        let port = match self.port {
            Some(0) | None => {
                return Err(Error::Config(
                    "bundle requires a non-zero metadata port".into(),
                ))
            }
            Some(port) => port,
        };

        let roots = match &self.ca {
            Some(source) => {
                let (pem, name) = source.load("CA certificate")?;
                load_root_store(&pem, &name)?
            }
            None => load_native_roots()?,
        };

        let client_identity = match (&self.client_cert, &self.client_key) {
            (Some(cert), Some(key)) => {
                let (cert_pem, cert_name) = cert.load("client certificate")?;
                let (key_pem, key_name) = key.load("client key")?;
                Some(Arc::new(ClientIdentity {
                    cert_chain: load_cert_chain(&cert_pem, &cert_name)?,
                    key: load_private_key(&key_pem, &key_name)?,
                }))
            }
            (None, None) => None,
            _ => {
                return Err(Error::Config(
                    "client certificate and client key must be set together".into(),
                ))
            }
        };

        Ok(Bundle {
            host,
            port,
            roots: Arc::new(roots),
            client_identity,
        })
    }
}
