//! TLS building blocks shared by the bundle, trust verifier and transport.

use crate::{Error, Result};
use rustls::crypto::CryptoProvider;
use rustls::{ClientConfig, ConfigBuilder, RootCertStore, WantsVerifier};
use rustls_pemfile::Item;
use rustls_pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use std::fs;
use std::sync::Arc;

/// Crypto provider used for every client configuration and verifier.
///
/// Passed explicitly so the process-wide default provider never matters.
pub(crate) fn crypto_provider() -> Arc<CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// Start a client configuration with the crate's provider and safe defaults.
pub(crate) fn client_config_builder() -> Result<ConfigBuilder<ClientConfig, WantsVerifier>> {
    ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Config(format!("unsupported TLS protocol versions: {}", e)))
}

/// TLS settings attached to an endpoint.
///
/// Carries the server name sent as SNI and a client configuration built for
/// that endpoint alone. Cloning shares the configuration.
#[derive(Clone)]
pub struct EndpointTls {
    server_name: String,
    sni: ServerName<'static>,
    client_config: Arc<ClientConfig>,
}

impl EndpointTls {
    /// Pair a server name with the client configuration to use for it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `server_name` is not a valid DNS name or
    /// IP address.
    pub fn new(server_name: impl Into<String>, client_config: Arc<ClientConfig>) -> Result<Self> {
        let server_name = server_name.into();
        let sni = parse_server_name(&server_name)?;
        Ok(Self {
            server_name,
            sni,
            client_config,
        })
    }

    /// Server name sent in the handshake (SNI).
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Server name in the form the TLS connector takes.
    pub fn sni(&self) -> ServerName<'static> {
        self.sni.clone()
    }

    /// The rustls client configuration.
    pub fn client_config(&self) -> Arc<ClientConfig> {
        self.client_config.clone()
    }
}

impl std::fmt::Debug for EndpointTls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointTls")
            .field("server_name", &self.server_name)
            .field("client_config", &"<ClientConfig>")
            .finish()
    }
}

/// Parse a host name or IP address for TLS server name indication.
///
/// A trailing dot is removed. `host:port` is rejected.
///
/// # Errors
///
/// Returns `Error::Config` if the name is empty or not a valid DNS name or
/// IP address.
pub fn parse_server_name(hostname: &str) -> Result<ServerName<'static>> {
    let hostname = hostname.trim_end_matches('.');

    if hostname.is_empty() || hostname.len() > 253 {
        return Err(Error::Config(format!(
            "Invalid hostname for TLS: '{}'",
            hostname
        )));
    }

    ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::Config(format!("Invalid hostname for TLS: '{}'", hostname)))
}

/// Read a PEM file, naming it in the error.
pub(crate) fn read_pem_file(path: &str, what: &str) -> Result<Vec<u8>> {
    fs::read(path)
        .map_err(|e| Error::Config(format!("Failed to read {} file '{}': {}", what, path, e)))
}

/// Build a root store from PEM-encoded CA certificates.
pub(crate) fn load_root_store(pem: &[u8], source: &str) -> Result<RootCertStore> {
    let mut reader = std::io::Cursor::new(pem);
    let mut root_store = RootCertStore::empty();
    let mut found_certs = 0;

    // Parse PEM data and keep only certificates
    loop {
        match rustls_pemfile::read_one(&mut reader) {
            Ok(Some(Item::X509Certificate(cert))) => {
                root_store.add(cert).map_err(|e| {
                    Error::Config(format!("Invalid CA certificate in '{}': {}", source, e))
                })?;
                found_certs += 1;
            }
            Ok(Some(_)) => {
                // Skip non-certificate items (private keys, etc.)
            }
            Ok(None) => break,
            Err(_) => {
                return Err(Error::Config(format!(
                    "Failed to parse CA certificate from '{}'",
                    source
                )));
            }
        }
    }

    if found_certs == 0 {
        return Err(Error::Config(format!(
            "No valid certificates found in '{}'",
            source
        )));
    }

    Ok(root_store)
}

/// Load the platform trust store.
pub(crate) fn load_native_roots() -> Result<RootCertStore> {
    let result = rustls_native_certs::load_native_certs();

    let mut store = RootCertStore::empty();
    let (added, _ignored) = store.add_parsable_certificates(result.certs);

    if store.is_empty() {
        return Err(Error::Config(
            "Failed to load any system root certificates".to_string(),
        ));
    }
    if !result.errors.is_empty() {
        tracing::debug!(
            added,
            errors = result.errors.len(),
            "some system root certificates could not be loaded"
        );
    }

    Ok(store)
}

/// Parse a PEM certificate chain (leaf first).
pub(crate) fn load_cert_chain(pem: &[u8], source: &str) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = std::io::Cursor::new(pem);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| {
            Error::Config(format!(
                "Failed to parse client certificate from '{}': {}",
                source, e
            ))
        })?;

    if certs.is_empty() {
        return Err(Error::Config(format!(
            "No valid certificates found in '{}'",
            source
        )));
    }
    Ok(certs)
}

/// Parse the first PEM private key (PKCS#1, PKCS#8 or SEC1).
pub(crate) fn load_private_key(pem: &[u8], source: &str) -> Result<PrivateKeyDer<'static>> {
    let mut reader = std::io::Cursor::new(pem);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| {
            Error::Config(format!(
                "Failed to parse private key from '{}': {}",
                source, e
            ))
        })?
        .ok_or_else(|| Error::Config(format!("No private key found in '{}'", source)))
}
