//! Raw HTTP transport behind the signing client
//!
//! This module provides:
//! - The `HttpTransport` seam used to send already-signed requests
//! - A hyper-based default transport with a tuned connection pool
//! - `TransportError`, the connection-level failure kind

use crate::config::HttpConfig;
use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response};
use hyper_tls::HttpsConnector;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client as HyperClient;
use hyper_util::rt::TokioExecutor;
use native_tls::TlsConnector;
use std::time::Duration;
use thiserror::Error;

/// Response body handed back by a transport. Read it to the end to release
/// the underlying connection.
pub type TransportBody = BoxBody<Bytes, TransportError>;

/// Connection-level failures, distinct from non-2xx gateway responses
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Client error: {0}")]
    Client(#[from] hyper_util::client::legacy::Error),

    #[error("Body error: {0}")]
    Body(#[from] hyper::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] hyper::http::Error),

    #[error("TLS error: {0}")]
    Tls(#[from] native_tls::Error),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Sends a fully prepared request and returns the raw response.
///
/// Implementations must not retry, and must not follow redirects.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(
        &self,
        request: Request<Full<Bytes>>,
    ) -> Result<Response<TransportBody>, TransportError>;
}

/// Default transport: hyper legacy client over native-tls
///
/// Clone is cheap - the underlying HTTP client uses Arc internally.
#[derive(Clone)]
pub struct HyperTransport {
    client: HyperClient<HttpsConnector<HttpConnector>, Full<Bytes>>,
    request_timeout: Duration,
}

impl HyperTransport {
    /// Build a transport from HTTP settings
    ///
    /// - HTTP/1.1 only
    /// - TCP_NODELAY enabled
    /// - Idle pool sizing and keepalive from `HttpConfig`
    pub fn new(config: &HttpConfig) -> Result<Self, TransportError> {
        let mut http = HttpConnector::new();
        http.set_nodelay(true);
        http.enforce_http(false);
        http.set_connect_timeout(Some(config.connect_timeout()));
        http.set_keepalive(Some(config.keepalive()));

        let tls = if config.insecure_tls {
            tracing::warn!("INSECURE TLS MODE ENABLED: Certificate verification is disabled!");
            TlsConnector::builder()
                .danger_accept_invalid_certs(true)
                .danger_accept_invalid_hostnames(true)
                .build()?
        } else {
            TlsConnector::new()?
        };

        let https = HttpsConnector::from((http, tls.into()));

        let client = HyperClient::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .set_host(true)
            .build(https);

        Ok(Self {
            client,
            request_timeout: config.request_timeout(),
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

#[async_trait]
impl HttpTransport for HyperTransport {
    async fn send(
        &self,
        request: Request<Full<Bytes>>,
    ) -> Result<Response<TransportBody>, TransportError> {
        let response = tokio::time::timeout(self.request_timeout, self.client.request(request))
            .await
            .map_err(|_| TransportError::Timeout(self.request_timeout))??;

        Ok(response.map(|body| body.map_err(TransportError::from).boxed()))
    }
}

/// Wrap an in-memory payload as a transport body
pub fn full_body(data: impl Into<Bytes>) -> TransportBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}
