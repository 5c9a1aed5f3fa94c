//! Shared fixtures: a throwaway PKI and a local TLS server

#![allow(dead_code)]

use bytes::Bytes;
use http::{header, Method, Request, Response, StatusCode};
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use rcgen::{BasicConstraints, Certificate, CertificateParams, IsCa, KeyPair};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::server::WebPkiClientVerifier;
use rustls::{RootCertStore, ServerConfig};
use std::net::SocketAddr;
use std::sync::{Arc, Once};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_rustls::TlsAcceptor;

static TRACING: Once = Once::new();

/// Install a test subscriber once (`RUST_LOG` controls the filter)
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn provider() -> Arc<rustls::crypto::CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}

/// A certificate authority
pub struct TestCa {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl TestCa {
    pub fn new(name: &str) -> Self {
        let key = KeyPair::generate().unwrap();
        let mut params = CertificateParams::new(Vec::<String>::new()).unwrap();
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, name);
        let cert = params.self_signed(&key).unwrap();
        Self { cert, key }
    }

    pub fn pem(&self) -> String {
        self.cert.pem()
    }

    /// Issue a certificate valid for `names` (DNS names or IP addresses)
    pub fn issue(&self, names: &[&str]) -> TestIdentity {
        let key = KeyPair::generate().unwrap();
        let params =
            CertificateParams::new(names.iter().map(|n| n.to_string()).collect::<Vec<_>>())
                .unwrap();
        let cert = params.signed_by(&key, &self.cert, &self.key).unwrap();
        TestIdentity { cert, key }
    }

    pub fn roots(&self) -> RootCertStore {
        let mut store = RootCertStore::empty();
        store.add(self.cert.der().clone()).unwrap();
        store
    }
}

/// A leaf certificate and its key
pub struct TestIdentity {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl TestIdentity {
    pub fn cert_der(&self) -> CertificateDer<'static> {
        self.cert.der().clone()
    }

    pub fn key_der(&self) -> PrivateKeyDer<'static> {
        PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(self.key.serialize_der()))
    }

    pub fn cert_pem(&self) -> String {
        self.cert.pem()
    }

    pub fn key_pem(&self) -> String {
        self.key.serialize_pem()
    }
}

/// Server configuration presenting `identity`; requires client certificates
/// from `client_ca` when given
pub fn server_config(identity: &TestIdentity, client_ca: Option<&TestCa>) -> Arc<ServerConfig> {
    let builder = ServerConfig::builder_with_provider(provider())
        .with_safe_default_protocol_versions()
        .unwrap();
    let builder = match client_ca {
        Some(ca) => {
            let verifier =
                WebPkiClientVerifier::builder_with_provider(Arc::new(ca.roots()), provider())
                    .build()
                    .unwrap();
            builder.with_client_cert_verifier(verifier)
        }
        None => builder.with_no_client_auth(),
    };
    Arc::new(
        builder
            .with_single_cert(vec![identity.cert_der()], identity.key_der())
            .unwrap(),
    )
}

/// What the server saw of one accepted handshake
#[derive(Debug)]
pub struct Accepted {
    pub sni: Option<String>,
    pub client_cert: bool,
}

/// Accept one TLS connection, echo four bytes back, and report the handshake
pub async fn spawn_echo_server(
    config: Arc<ServerConfig>,
) -> (SocketAddr, oneshot::Receiver<Option<Accepted>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let accepted = match TlsAcceptor::from(config).accept(socket).await {
            Ok(mut stream) => {
                let (_, conn) = stream.get_ref();
                let accepted = Accepted {
                    sni: conn.server_name().map(str::to_string),
                    client_cert: conn.peer_certificates().is_some(),
                };
                let mut buf = [0u8; 4];
                if stream.read_exact(&mut buf).await.is_ok() {
                    let _ = stream.write_all(&buf).await;
                    let _ = stream.flush().await;
                }
                Some(accepted)
            }
            Err(_) => None,
        };
        let _ = tx.send(accepted);
    });

    (addr, rx)
}

/// Serve `status` and `body` for `GET /metadata` on one HTTPS connection
///
/// Any other request gets a 404.
pub async fn spawn_http_server(config: Arc<ServerConfig>, status: u16, body: String) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let Ok(stream) = TlsAcceptor::from(config).accept(socket).await else {
            return;
        };

        let svc = service_fn(move |req: Request<Incoming>| {
            let response = if req.method() == Method::GET && req.uri().path() == "/metadata" {
                Response::builder()
                    .status(status)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Full::new(Bytes::from(body.clone())))
            } else {
                Response::builder()
                    .status(StatusCode::NOT_FOUND)
                    .body(Full::new(Bytes::new()))
            };
            async move { response }
        });

        if let Err(e) = http1::Builder::new()
            .serve_connection(TokioIo::new(stream), svc)
            .await
        {
            tracing::debug!(error = %e, "test metadata connection error");
        }
    });

    addr
}

/// A metadata document listing `contact_points` behind `proxy`
pub fn metadata_json(proxy: &str, contact_points: &[&str]) -> String {
    serde_json::json!({
        "version": 1,
        "region": "us-east1",
        "contact_info": {
            "type": "sni_proxy",
            "local_dc": "dc1",
            "sni_proxy_address": proxy,
            "contact_points": contact_points,
        }
    })
    .to_string()
}
