//! Dialing endpoints (TCP with optional TLS)

use crate::endpoint::Endpoint;
use crate::{Error, Result};
use bytes::BytesMut;
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

/// An open connection to an endpoint: plain or TLS-encrypted TCP
pub enum Transport {
    /// Plain TCP connection
    Plain(TcpStream),
    /// TLS-encrypted TCP connection
    Tls(Box<TlsStream<TcpStream>>),
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport::Plain(_) => f.write_str("Transport::Plain(TcpStream)"),
            Transport::Tls(_) => f.write_str("Transport::Tls(TlsStream)"),
        }
    }
}

impl Transport {
    /// Dial an endpoint.
    ///
    /// Connects to [`Endpoint::addr`] (resolving it if needed) and, when the
    /// endpoint carries TLS settings, performs the handshake with its server
    /// name and client configuration. `connect_timeout` bounds the TCP
    /// connect and the handshake together.
    ///
    /// # Errors
    ///
    /// * `Error::TlsTrust` if the peer certificate is rejected
    /// * `Error::Io` for connect, handshake and timeout failures
    pub async fn connect(endpoint: &Endpoint, connect_timeout: Option<Duration>) -> Result<Self> {
        let dial = Self::dial(endpoint);
        match connect_timeout {
            Some(limit) => with_timeout(limit, endpoint, dial).await,
            None => dial.await,
        }
    }

    async fn dial(endpoint: &Endpoint) -> Result<Self> {
        let stream = TcpStream::connect(endpoint.addr()).await?;
        stream.set_nodelay(true)?;

        let Some(tls) = endpoint.tls_config() else {
            tracing::debug!(endpoint = %endpoint, "connected");
            return Ok(Transport::Plain(stream));
        };

        let connector = TlsConnector::from(tls.client_config());
        let tls_stream = connector
            .connect(tls.sni(), stream)
            .await
            .map_err(|e| handshake_error(endpoint, e))?;

        tracing::debug!(
            endpoint = %endpoint,
            server_name = tls.server_name(),
            "TLS handshake complete"
        );
        Ok(Transport::Tls(Box::new(tls_stream)))
    }

    /// Whether the connection is encrypted
    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }

    /// Write bytes to the transport
    pub async fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        match self {
            Transport::Plain(stream) => stream.write_all(buf).await?,
            Transport::Tls(stream) => stream.write_all(buf).await?,
        }
        Ok(())
    }

    /// Flush the transport
    pub async fn flush(&mut self) -> Result<()> {
        match self {
            Transport::Plain(stream) => stream.flush().await?,
            Transport::Tls(stream) => stream.flush().await?,
        }
        Ok(())
    }

    /// Read bytes into buffer
    pub async fn read_buf(&mut self, buf: &mut BytesMut) -> Result<usize> {
        let n = match self {
            Transport::Plain(stream) => stream.read_buf(buf).await?,
            Transport::Tls(stream) => stream.read_buf(buf).await?,
        };
        Ok(n)
    }

    /// Shutdown the transport
    pub async fn shutdown(&mut self) -> Result<()> {
        match self {
            Transport::Plain(stream) => stream.shutdown().await?,
            Transport::Tls(stream) => stream.shutdown().await?,
        }
        Ok(())
    }
}

async fn with_timeout<F>(limit: Duration, endpoint: &Endpoint, dial: F) -> Result<Transport>
where
    F: Future<Output = Result<Transport>>,
{
    tokio::time::timeout(limit, dial).await.unwrap_or_else(|_| {
        Err(Error::Io(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("connecting to {} timed out after {:?}", endpoint, limit),
        )))
    })
}

/// Map a handshake failure, keeping certificate rejections distinct.
fn handshake_error(endpoint: &Endpoint, e: io::Error) -> Error {
    let rejected = e
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<rustls::Error>())
        .filter(|tls| matches!(tls, rustls::Error::InvalidCertificate(_)));

    match rejected {
        Some(tls) => Error::TlsTrust(format!(
            "certificate rejected by {}: {}",
            endpoint, tls
        )),
        None => Error::Io(io::Error::new(
            e.kind(),
            format!("TLS handshake with {} failed: {}", endpoint, e),
        )),
    }
}
