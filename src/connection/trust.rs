//! Per-node trust for SNI-proxied clusters.
//!
//! Every node of a cloud cluster sits behind the same proxy address and is
//! selected by its SNI server name (the node's host id). The proxy presents
//! a certificate issued for the bundle host, not for the host id, so the
//! standard rustls check, which matches the certificate against the SNI
//! name, would reject every connection.
//!
//! [`SniProxyVerifier`] replaces that check: the chain must still lead to the
//! bundle CA, and the leaf must be valid for the bundle host. Failures abort
//! the handshake; there is no fallback to an unverified connection.

use super::bundle::Bundle;
use super::tls::{client_config_builder, crypto_provider, parse_server_name, EndpointTls};
use crate::{metrics, Error, Result};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::{DigitallySignedStruct, RootCertStore, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use std::sync::Arc;

/// Roots and expected name to verify peer certificate chains against.
#[derive(Debug, Clone)]
pub struct TrustContext {
    expected_name: ServerName<'static>,
    verifier: Arc<WebPkiServerVerifier>,
}

impl TrustContext {
    /// Build a context anchored at `roots` that expects leaves valid for
    /// `expected_name`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `roots` is empty or `expected_name` is not
    /// a valid DNS name or IP address.
    pub fn new(roots: Arc<RootCertStore>, expected_name: &str) -> Result<Self> {
        let expected_name = parse_server_name(expected_name)?;
        let verifier = WebPkiServerVerifier::builder_with_provider(roots, crypto_provider())
            .build()
            .map_err(|e| Error::Config(format!("cannot build certificate verifier: {}", e)))?;
        Ok(Self {
            expected_name,
            verifier,
        })
    }

    /// Build a context from a bundle: its CA pool and its host name.
    pub fn for_bundle(bundle: &Bundle) -> Result<Self> {
        Self::new(bundle.roots(), bundle.host())
    }

    /// Name leaves must be valid for.
    pub fn expected_name(&self) -> &ServerName<'static> {
        &self.expected_name
    }

    /// Verify a presented chain (leaf first) at instant `now`.
    ///
    /// # Errors
    ///
    /// Returns `Error::TlsTrust` if the chain is empty, a certificate cannot
    /// be parsed, the chain does not lead to a trusted root, a certificate is
    /// outside its validity period, or the leaf is not valid for the
    /// expected name.
    pub fn verify_chain(&self, chain: &[CertificateDer<'_>], now: UnixTime) -> Result<()> {
        let (leaf, intermediates) = chain
            .split_first()
            .ok_or_else(|| Error::TlsTrust("empty certificate chain".into()))?;
        self.verify(leaf, intermediates, &[], now)
            .map(|_| ())
            .map_err(|e| Error::TlsTrust(e.to_string()))
    }

    fn verify(
        &self,
        leaf: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        self.verifier
            .verify_server_cert(leaf, intermediates, &self.expected_name, ocsp_response, now)
    }
}

/// Certificate verifier for connections through the SNI proxy.
///
/// Ignores the server name the handshake was started with and verifies
/// against the [`TrustContext`] instead.
#[derive(Debug)]
pub struct SniProxyVerifier {
    trust: TrustContext,
}

impl SniProxyVerifier {
    /// Wrap a trust context.
    pub fn new(trust: TrustContext) -> Self {
        Self { trust }
    }
}

impl ServerCertVerifier for SniProxyVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> std::result::Result<ServerCertVerified, rustls::Error> {
        match self
            .trust
            .verify(end_entity, intermediates, ocsp_response, now)
        {
            Ok(verified) => {
                metrics::counters::tls_verification(metrics::labels::RESULT_OK);
                Ok(verified)
            }
            Err(e) => {
                tracing::warn!(
                    sni = %server_name.to_str(),
                    expected = %self.trust.expected_name.to_str(),
                    error = %e,
                    "rejecting peer certificate"
                );
                metrics::counters::tls_verification(metrics::labels::RESULT_REJECTED);
                Err(e)
            }
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.trust
            .verifier
            .verify_tls12_signature(message, cert, dss)
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> std::result::Result<HandshakeSignatureValid, rustls::Error> {
        self.trust
            .verifier
            .verify_tls13_signature(message, cert, dss)
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.trust.verifier.supported_verify_schemes()
    }
}

/// Build the TLS settings for one node behind the bundle's SNI proxy.
///
/// Returns a fresh client configuration on every call: SNI is `server_name`
/// and certificates are checked by a [`SniProxyVerifier`] for the bundle.
/// The bundle's roots and client identity are shared, never copied or
/// modified.
///
/// # Errors
///
/// Returns `Error::Config` if `server_name` or the bundle host is not a
/// valid server name, or the client identity is rejected by rustls.
pub fn node_tls_config(bundle: &Bundle, server_name: &str) -> Result<EndpointTls> {
    let verifier = SniProxyVerifier::new(TrustContext::for_bundle(bundle)?);
    let builder = client_config_builder()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier));
    let client_config = bundle.with_client_auth(builder)?;
    EndpointTls::new(server_name, Arc::new(client_config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcgen::{BasicConstraints, CertificateParams, IsCa, KeyPair};

    struct Ca {
        cert: rcgen::Certificate,
        key: KeyPair,
    }

    fn ca(name: &str) -> Ca {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, name);
        let cert = params.self_signed(&key).unwrap();
        Ca { cert, key }
    }

    fn leaf(issuer: &Ca, names: &[&str]) -> CertificateDer<'static> {
        let key = KeyPair::generate().unwrap();
        let params =
            CertificateParams::new(names.iter().map(|n| n.to_string()).collect::<Vec<_>>())
                .unwrap();
        params
            .signed_by(&key, &issuer.cert, &issuer.key)
            .unwrap()
            .der()
            .clone()
    }

    fn roots(ca: &Ca) -> Arc<RootCertStore> {
        let mut store = RootCertStore::empty();
        store.add(ca.cert.der().clone()).unwrap();
        Arc::new(store)
    }

    #[test]
    fn test_verify_chain_accepts_leaf_for_expected_name() {
        let ca = ca("bundle ca");
        let trust = TrustContext::new(roots(&ca), "db.example.com").unwrap();
        let chain = [leaf(&ca, &["db.example.com"])];
        assert!(trust.verify_chain(&chain, UnixTime::now()).is_ok());
    }

    #[test]
    fn test_verify_chain_rejects_unknown_issuer() {
        let trusted = ca("bundle ca");
        let other = ca("someone else");
        let trust = TrustContext::new(roots(&trusted), "db.example.com").unwrap();
        let chain = [leaf(&other, &["db.example.com"])];
        let err = trust.verify_chain(&chain, UnixTime::now()).unwrap_err();
        assert!(err.is_trust_failure());
    }

    #[test]
    fn test_verify_chain_rejects_name_mismatch() {
        let ca = ca("bundle ca");
        let trust = TrustContext::new(roots(&ca), "db.example.com").unwrap();
        let chain = [leaf(&ca, &["other.example.com"])];
        assert!(trust.verify_chain(&chain, UnixTime::now()).is_err());
    }

    #[test]
    fn test_verify_chain_rejects_garbage_and_empty() {
        let ca = ca("bundle ca");
        let trust = TrustContext::new(roots(&ca), "db.example.com").unwrap();

        let garbage = [CertificateDer::from(vec![0x30, 0x03, 0x01, 0x02, 0x03])];
        assert!(trust.verify_chain(&garbage, UnixTime::now()).is_err());

        let err = trust.verify_chain(&[], UnixTime::now()).unwrap_err();
        assert!(err.to_string().contains("empty certificate chain"));
    }

    #[test]
    fn test_verify_chain_rejects_expired() {
        let ca = ca("bundle ca");
        let trust = TrustContext::new(roots(&ca), "db.example.com").unwrap();

        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(vec!["db.example.com".to_string()]).unwrap();
        params.not_before = rcgen::date_time_ymd(2000, 1, 1);
        params.not_after = rcgen::date_time_ymd(2001, 1, 1);
        let expired = params.signed_by(&key, &ca.cert, &ca.key).unwrap();

        let err = trust
            .verify_chain(&[expired.der().clone()], UnixTime::now())
            .unwrap_err();
        assert!(err.is_trust_failure());
    }

    #[test]
    fn test_verify_chain_uses_supplied_intermediates() {
        let root = ca("root");
        let intermediate_key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let intermediate_cert = params
            .signed_by(&intermediate_key, &root.cert, &root.key)
            .unwrap();
        let intermediate = Ca {
            cert: intermediate_cert,
            key: intermediate_key,
        };

        let trust = TrustContext::new(roots(&root), "db.example.com").unwrap();
        let leaf = leaf(&intermediate, &["db.example.com"]);

        // Without the intermediate the leaf cannot be chained to the root
        assert!(trust
            .verify_chain(std::slice::from_ref(&leaf), UnixTime::now())
            .is_err());
        let chain = [leaf, intermediate.cert.der().clone()];
        assert!(trust.verify_chain(&chain, UnixTime::now()).is_ok());
    }

    #[test]
    fn test_trust_context_requires_roots() {
        let err = TrustContext::new(Arc::new(RootCertStore::empty()), "db.example.com").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_node_tls_config_is_fresh_per_call() {
        let ca = ca("bundle ca");
        let bundle = Bundle::builder()
            .host("db.example.com")
            .port(29080)
            .ca_cert_pem(ca.cert.pem())
            .build()
            .unwrap();

        let a = node_tls_config(&bundle, "6f1d2b4e-0c3a-4e5f-8a9b-1c2d3e4f5a6b").unwrap();
        let b = node_tls_config(&bundle, "0a9b8c7d-6e5f-4a3b-9c1d-2e3f4a5b6c7d").unwrap();
        assert_eq!(a.server_name(), "6f1d2b4e-0c3a-4e5f-8a9b-1c2d3e4f5a6b");
        assert_eq!(b.server_name(), "0a9b8c7d-6e5f-4a3b-9c1d-2e3f4a5b6c7d");
        assert!(!Arc::ptr_eq(&a.client_config(), &b.client_config()));
    }
}
