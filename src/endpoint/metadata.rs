//! Cloud metadata service client

use crate::connection::{parse_server_name, Bundle};
use crate::{metrics, Error, Result};
use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Limited};
use hyper_util::rt::TokioIo;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tracing::Instrument;

/// Largest metadata document accepted
pub const MAX_METADATA_BODY: usize = 1024 * 1024;

/// How to reach the cluster nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Connection type reported by the service
    #[serde(rename = "type")]
    pub type_name: String,
    /// Local datacenter
    pub local_dc: String,
    /// `host:port` of the SNI proxy every node sits behind
    pub sni_proxy_address: String,
    /// Server names of the nodes to bootstrap from
    pub contact_points: Vec<String>,
}

/// Document served at `/metadata`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloudMetadata {
    /// Document version
    pub version: i32,
    /// Cloud region
    pub region: String,
    /// Node contact information
    pub contact_info: ContactInfo,
}

impl CloudMetadata {
    /// Parse a metadata document
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` if the JSON is malformed or fields are
    /// missing.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::Resolution(format!("malformed cloud metadata: {}", e)))
    }
}

/// HTTPS client for the bundle's metadata service
///
/// Holds no connection: every [`fetch`](Self::fetch) dials, sends one
/// request and closes.
#[derive(Debug, Clone, Default)]
pub struct MetadataClient {
    timeout: Option<Duration>,
}

impl MetadataClient {
    /// Client without a request timeout
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the whole fetch (connect, handshake, request, body)
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configured timeout
    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Fetch and parse `https://{host}:{port}/metadata`
    ///
    /// The server certificate must chain to the bundle CA and be valid for
    /// the bundle host. The bundle's client certificate is presented if it
    /// has one.
    ///
    /// # Errors
    ///
    /// Returns `Error::Resolution` naming the URL on connect, TLS, HTTP,
    /// timeout or JSON failure, and on a non-2xx status.
    pub async fn fetch(&self, bundle: &Bundle) -> Result<CloudMetadata> {
        let url = bundle.metadata_url();
        let span = tracing::info_span!("metadata_fetch", url = %url);

        async {
            let start = Instant::now();
            let body = match self.timeout {
                Some(limit) => tokio::time::timeout(limit, get(bundle))
                    .await
                    .map_err(|_| Error::Resolution(format!("timed out after {:?}", limit)))
                    .and_then(|r| r),
                None => get(bundle).await,
            };
            let metadata = body.and_then(|body| CloudMetadata::from_json(&body));
            metrics::histograms::metadata_fetch_duration(start.elapsed().as_millis() as u64);

            match metadata {
                Ok(metadata) => {
                    tracing::debug!(
                        region = %metadata.region,
                        contact_points = metadata.contact_info.contact_points.len(),
                        "fetched cloud metadata"
                    );
                    Ok(metadata)
                }
                Err(e) => Err(Error::Resolution(format!(
                    "unable to get metadata from {}: {}",
                    url,
                    reason(&e)
                ))),
            }
        }
        .instrument(span)
        .await
    }
}

/// Message of an error without its category prefix
fn reason(e: &Error) -> String {
    match e {
        Error::Resolution(msg) | Error::Config(msg) | Error::TlsTrust(msg) => msg.clone(),
        other => other.to_string(),
    }
}

async fn get(bundle: &Bundle) -> Result<Bytes> {
    let server_name = parse_server_name(bundle.host())?;
    let connector = TlsConnector::from(bundle.tls_config()?);

    let stream = TcpStream::connect(bundle.authority())
        .await
        .map_err(|e| Error::Resolution(format!("connect failed: {}", e)))?;
    let stream = connector
        .connect(server_name, stream)
        .await
        .map_err(|e| Error::Resolution(format!("TLS handshake failed: {}", e)))?;

    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| Error::Resolution(format!("HTTP handshake failed: {}", e)))?;

    // Drive the connection in the background
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            tracing::debug!(error = %e, "metadata connection closed with error");
        }
    });

    let request = http::Request::builder()
        .method(http::Method::GET)
        .uri("/metadata")
        .header(http::header::HOST, bundle.authority())
        .header(http::header::ACCEPT, "application/json")
        .body(Empty::<Bytes>::new())
        .map_err(|e| Error::Resolution(format!("invalid request: {}", e)))?;

    let response = sender
        .send_request(request)
        .await
        .map_err(|e| Error::Resolution(format!("request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Resolution(format!("unexpected status {}", status)));
    }

    let body = Limited::new(response.into_body(), MAX_METADATA_BODY)
        .collect()
        .await
        .map_err(|e| Error::Resolution(format!("reading body failed: {}", e)))?
        .to_bytes();
    Ok(body)
}
