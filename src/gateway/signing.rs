//! Signing client: the boundary between the gateway client and the wire
//!
//! Holds endpoint, region, credentials and API key, and turns an
//! `OutboundRequest` into a signed hyper request sent over an `HttpTransport`.

use crate::gateway::signer::{Credentials, SigV4Signer};
use crate::transport::{HttpTransport, TransportBody, TransportError};
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Request, Response};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Header carrying the usage-plan API key
pub const API_KEY_HEADER: &str = "x-api-key";

/// A request ready for signing: absolute URL, caller headers, body
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
}

/// Signs (when credentials are configured) and sends requests
#[derive(Clone)]
pub struct SigningClient {
    endpoint: String,
    region: String,
    /// Shared so clones reuse the daily signing key cache
    signer: Option<Arc<SigV4Signer>>,
    api_key: Option<String>,
    transport: Arc<dyn HttpTransport>,
}

impl SigningClient {
    pub fn new(
        endpoint: String,
        region: String,
        credentials: Option<Credentials>,
        api_key: Option<String>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let signer = credentials.map(|creds| Arc::new(SigV4Signer::new(creds, region.clone())));
        Self {
            endpoint,
            region,
            signer,
            api_key,
            transport,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Whether requests carry a SigV4 Authorization header
    pub fn is_signing(&self) -> bool {
        self.signer.is_some()
    }

    /// Attach the API key, sign, and send. No retries.
    pub async fn send(
        &self,
        request: OutboundRequest,
    ) -> Result<Response<TransportBody>, TransportError> {
        let OutboundRequest {
            method,
            url,
            headers,
            body,
        } = request;

        // Canonical header names are lowercase; case collisions are
        // rejected by the gateway client before this point
        let mut headers: BTreeMap<String, String> = headers
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();

        if let Some(api_key) = &self.api_key {
            headers.insert(API_KEY_HEADER.to_string(), api_key.clone());
        }

        let headers = match &self.signer {
            Some(signer) => signer.sign(method.as_str(), &url, headers, &body),
            None => headers,
        };

        let mut req = Request::builder().method(method).uri(url.as_str());
        for (key, value) in headers.iter() {
            req = req.header(key, value);
        }
        let request = req.body(Full::new(body))?;

        self.transport.send(request).await
    }
}
