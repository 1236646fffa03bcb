//! Gateway client
//!
//! Maps a `GatewayRequest` onto a signed outbound call and the raw response
//! back onto `GatewayResponse` or `GatewayError`:
//! - URL = endpoint + encoded resource path + encoded query string
//! - Caller headers are copied verbatim; the signing client adds x-api-key
//! - The response body is always read to the end before returning
//! - Any status outside [200, 300) is an error, 3xx included. No retries.

use crate::config::{HttpConfig, Profile};
use crate::gateway::error::{ClientError, GatewayError, Result};
use crate::gateway::request::GatewayRequest;
use crate::gateway::response::GatewayResponse;
use crate::gateway::signer::Credentials;
use crate::gateway::signing::{OutboundRequest, SigningClient};
use crate::transport::{HttpTransport, HyperTransport};
use http_body_util::BodyExt;
use hyper::header::HeaderMap;
use hyper::Uri;
use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

/// Hex lookup table for URI encoding
static HEX_UPPER: &[u8; 16] = b"0123456789ABCDEF";

/// Client for one API Gateway endpoint
///
/// Clone is cheap - the transport and signer are shared.
#[derive(Clone)]
pub struct GatewayClient {
    signing_client: SigningClient,
}

impl GatewayClient {
    pub fn builder() -> GatewayClientBuilder {
        GatewayClientBuilder::new()
    }

    pub fn endpoint(&self) -> &str {
        self.signing_client.endpoint()
    }

    pub fn region(&self) -> &str {
        self.signing_client.region()
    }

    /// Execute one request against the gateway
    ///
    /// Returns `ClientError::Gateway` for non-2xx responses and
    /// `ClientError::Transport` for connection failures, unchanged.
    pub async fn execute(&self, request: &GatewayRequest) -> Result<GatewayResponse> {
        let method = request
            .http_method()
            .cloned()
            .ok_or_else(|| ClientError::InvalidRequest("HTTP method is required".to_string()))?;
        let resource_path = request
            .resource_path()
            .ok_or_else(|| ClientError::InvalidRequest("resource path is required".to_string()))?;

        Self::check_header_names(request.headers())?;

        let url = self.build_url(resource_path, request.query_parameters());
        url.parse::<Uri>()
            .map_err(|e| ClientError::InvalidRequest(format!("invalid URL {}: {}", url, e)))?;

        tracing::debug!(
            method = %method,
            url = %url,
            headers = request.headers().len(),
            signed = self.signing_client.is_signing(),
            "gateway_request"
        );

        let outbound = OutboundRequest {
            method,
            url,
            headers: request.headers().clone(),
            body: request.body().cloned().unwrap_or_default(),
        };

        let response = self.signing_client.send(outbound).await?;

        // Drain the body on every path so the connection is released
        let (parts, body) = response.into_parts();
        let body_bytes = body.collect().await?.to_bytes();
        let body = String::from_utf8_lossy(&body_bytes).into_owned();
        let status = parts.status.as_u16();

        tracing::debug!(status = status, bytes = body_bytes.len(), "gateway_response");

        if parts.status.is_success() {
            Ok(GatewayResponse::new(
                status,
                body,
                Self::header_map(&parts.headers),
            ))
        } else {
            let err = GatewayError::from_response(status, &body);
            tracing::debug!(status = status, message = %err.error_message(), "gateway_error");
            Err(err.into())
        }
    }

    /// Endpoint (trailing `/` trimmed) + encoded resource path + query string
    fn build_url(&self, resource_path: &str, parameters: &[(String, Vec<String>)]) -> String {
        let endpoint = self.endpoint().trim_end_matches('/');
        let path = Self::encode_path(resource_path);
        let query = Self::encode_query_string(parameters);

        let mut url = String::with_capacity(endpoint.len() + 1 + path.len() + 1 + query.len());
        url.push_str(endpoint);
        if !path.is_empty() && !path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&path);
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// Encode a resource path, preserving forward slashes
    /// Returns Cow::Borrowed when no encoding is needed
    fn encode_path(path: &str) -> Cow<'_, str> {
        let needs_encoding = path.bytes().any(|b| {
            !matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/')
        });

        if !needs_encoding {
            return Cow::Borrowed(path);
        }

        let mut result = String::with_capacity(path.len() + 32);
        for byte in path.bytes() {
            if byte == b'/' {
                result.push('/');
            } else {
                Self::url_encode_byte(&mut result, byte);
            }
        }
        Cow::Owned(result)
    }

    /// `key=value` pairs joined by `&`, keys and values encoded separately.
    /// Keys go out in the given order; repeated keys keep their value order.
    fn encode_query_string(parameters: &[(String, Vec<String>)]) -> String {
        let mut query = String::new();
        for (key, values) in parameters {
            for value in values {
                if !query.is_empty() {
                    query.push('&');
                }
                Self::url_encode_into(&mut query, key);
                query.push('=');
                Self::url_encode_into(&mut query, value);
            }
        }
        query
    }

    /// RFC 3986 unreserved characters pass through; everything else,
    /// including `=` and `&`, is percent-encoded.
    fn url_encode_into(buf: &mut String, s: &str) {
        for byte in s.bytes() {
            Self::url_encode_byte(buf, byte);
        }
    }

    fn url_encode_byte(buf: &mut String, byte: u8) {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                buf.push(byte as char);
            }
            _ => {
                buf.push('%');
                buf.push(HEX_UPPER[(byte >> 4) as usize] as char);
                buf.push(HEX_UPPER[(byte & 0xf) as usize] as char);
            }
        }
    }

    /// Header names are case-insensitive on the wire, so `X-Trace` and
    /// `x-trace` in one request would collapse into a single header.
    fn check_header_names(headers: &BTreeMap<String, String>) -> Result<()> {
        let mut seen = HashSet::with_capacity(headers.len());
        for name in headers.keys() {
            if !seen.insert(name.to_ascii_lowercase()) {
                return Err(ClientError::InvalidRequest(format!(
                    "header {} is set more than once with different case",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Repeated headers keep the last value; non-UTF-8 values are skipped
    fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect()
    }
}

/// Accumulates client configuration; `build` validates it
#[derive(Clone, Default)]
pub struct GatewayClientBuilder {
    http_config: Option<HttpConfig>,
    credentials: Option<Credentials>,
    endpoint: Option<String>,
    region: Option<String>,
    api_key: Option<String>,
    transport: Option<Arc<dyn HttpTransport>>,
}

impl GatewayClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-filled from a config profile
    pub fn from_profile(profile: &Profile, http: &HttpConfig) -> Self {
        let mut builder = Self::new()
            .with_endpoint(profile.endpoint.clone())
            .with_region(profile.region.clone())
            .with_client_config(http.clone());

        if let (Some(access_key), Some(secret_key)) = (&profile.access_key, &profile.secret_key) {
            let mut credentials = Credentials::new(access_key.clone(), secret_key.clone());
            if let Some(token) = &profile.session_token {
                credentials = credentials.with_session_token(token.clone());
            }
            builder = builder.with_credentials(credentials);
        }

        if let Some(api_key) = &profile.api_key {
            builder = builder.with_api_key(api_key.clone());
        }

        builder
    }

    /// Settings for the default transport. Ignored when a transport is given.
    pub fn with_client_config(mut self, config: HttpConfig) -> Self {
        self.http_config = Some(config);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_http_client(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Validate and build the client
    ///
    /// Endpoint and region are required. Without a transport handle, a
    /// `HyperTransport` is built from the client config.
    pub fn build(self) -> Result<GatewayClient> {
        let endpoint = self
            .endpoint
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ClientError::Configuration("endpoint is required".to_string()))?;
        let region = self
            .region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ClientError::Configuration("region is required".to_string()))?;

        let uri = endpoint.parse::<Uri>().map_err(|e| {
            ClientError::Configuration(format!("invalid endpoint {}: {}", endpoint, e))
        })?;
        if uri.scheme().is_none() || uri.authority().is_none() {
            return Err(ClientError::Configuration(format!(
                "endpoint must be an absolute URL: {}",
                endpoint
            )));
        }

        let transport: Arc<dyn HttpTransport> = match self.transport {
            Some(transport) => transport,
            None => {
                let http_config = self.http_config.unwrap_or_default();
                let transport = HyperTransport::new(&http_config).map_err(|e| {
                    ClientError::Configuration(format!("failed to build HTTP transport: {}", e))
                })?;
                Arc::new(transport)
            }
        };

        let signing_client = SigningClient::new(
            endpoint,
            region,
            self.credentials,
            self.api_key,
            transport,
        );

        Ok(GatewayClient { signing_client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        pairs
            .iter()
            .map(|(k, vs)| (k.to_string(), vs.iter().map(|v| v.to_string()).collect()))
            .collect()
    }

    #[test]
    fn test_encode_query_single_pair() {
        let query = GatewayClient::encode_query_string(&params(&[("key1", &["value1"])]));
        assert_eq!(query, "key1=value1");
    }

    #[test]
    fn test_encode_query_multi_value_keeps_order() {
        let query = GatewayClient::encode_query_string(&params(&[
            ("key1", &["value1"]),
            ("key3", &["value4", "value3"]),
        ]));
        assert_eq!(query, "key1=value1&key3=value4&key3=value3");
    }

    #[test]
    fn test_encode_query_follows_given_key_order() {
        let query = GatewayClient::encode_query_string(&params(&[
            ("zeta", &["1"]),
            ("alpha", &["2"]),
            ("mid", &["3", "4"]),
        ]));
        assert_eq!(query, "zeta=1&alpha=2&mid=3&mid=4");
    }

    #[test]
    fn test_header_names_differing_only_in_case_are_rejected() {
        let mut headers = BTreeMap::new();
        headers.insert("X-Trace".to_string(), "a".to_string());
        headers.insert("Account-Id".to_string(), "fubar".to_string());
        assert!(GatewayClient::check_header_names(&headers).is_ok());

        headers.insert("x-trace".to_string(), "b".to_string());
        let err = GatewayClient::check_header_names(&headers).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(ref m) if m.contains("x-trace")));
    }

    #[test]
    fn test_header_map_keeps_last_repeated_value_and_skips_non_utf8() {
        use hyper::header::HeaderValue;

        let mut headers = HeaderMap::new();
        headers.append("x-amzn-trace", HeaderValue::from_static("first"));
        headers.append("x-amzn-trace", HeaderValue::from_static("second"));
        headers.insert("x-binary", HeaderValue::from_bytes(b"caf\xe9").unwrap());
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let map = GatewayClient::header_map(&headers);
        assert_eq!(map.get("x-amzn-trace").map(String::as_str), Some("second"));
        assert!(!map.contains_key("x-binary"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_encode_query_reserved_characters() {
        let query = GatewayClient::encode_query_string(&params(&[("key4=3", &["value5&6"])]));
        assert_eq!(query, "key4%3D3=value5%266");

        let query = GatewayClient::encode_query_string(&params(&[("q", &["a b/c?"])]));
        assert_eq!(query, "q=a%20b%2Fc%3F");
    }

    #[test]
    fn test_encode_query_empty() {
        assert_eq!(GatewayClient::encode_query_string(&[]), "");
        assert_eq!(GatewayClient::encode_query_string(&params(&[("k", &[])])), "");
    }

    #[test]
    fn test_encode_path() {
        let path = GatewayClient::encode_path("/test/orders");
        assert!(matches!(path, Cow::Borrowed(_)));
        assert_eq!(path, "/test/orders");

        let path = GatewayClient::encode_path("/items/a b");
        assert!(matches!(path, Cow::Owned(_)));
        assert_eq!(path, "/items/a%20b");
    }

    #[test]
    fn test_build_requires_endpoint_and_region() {
        let err = GatewayClientBuilder::new()
            .with_region("us-east-1")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Configuration(ref m) if m.contains("endpoint")));

        let err = GatewayClientBuilder::new()
            .with_endpoint("https://foobar.execute-api.us-east-1.amazonaws.com")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Configuration(ref m) if m.contains("region")));

        let err = GatewayClientBuilder::new()
            .with_endpoint("   ")
            .with_region("us-east-1")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Configuration(_)));
    }

    #[test]
    fn test_build_rejects_relative_endpoint() {
        let err = GatewayClientBuilder::new()
            .with_endpoint("/just/a/path")
            .with_region("us-east-1")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Configuration(ref m) if m.contains("absolute")));
    }

    #[tokio::test]
    async fn test_build_url() {
        let client = GatewayClientBuilder::new()
            .with_endpoint("https://foobar.execute-api.us-east-1.amazonaws.com/")
            .with_region("us-east-1")
            .build()
            .unwrap();

        assert_eq!(
            client.build_url("/test/orders", &params(&[("key1", &["value1"])])),
            "https://foobar.execute-api.us-east-1.amazonaws.com/test/orders?key1=value1"
        );
        assert_eq!(
            client.build_url("prod/items", &[]),
            "https://foobar.execute-api.us-east-1.amazonaws.com/prod/items"
        );
        assert_eq!(client.region(), "us-east-1");
    }

    #[test]
    fn test_from_profile() {
        let profile = Profile {
            endpoint: "https://gw.example.com".to_string(),
            region: "eu-west-1".to_string(),
            access_key: Some("AKID".to_string()),
            secret_key: Some("secret".to_string()),
            session_token: Some("token".to_string()),
            api_key: Some("12345".to_string()),
        };

        let builder = GatewayClientBuilder::from_profile(&profile, &HttpConfig::default());
        assert_eq!(builder.endpoint.as_deref(), Some("https://gw.example.com"));
        assert_eq!(builder.region.as_deref(), Some("eu-west-1"));
        assert_eq!(builder.api_key.as_deref(), Some("12345"));
        let creds = builder.credentials.unwrap();
        assert_eq!(creds.access_key_id, "AKID");
        assert_eq!(creds.session_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_from_profile_without_credentials() {
        let profile = Profile {
            endpoint: "https://gw.example.com".to_string(),
            region: "us-east-1".to_string(),
            access_key: Some("AKID".to_string()),
            secret_key: None,
            session_token: None,
            api_key: None,
        };

        let builder = GatewayClientBuilder::from_profile(&profile, &HttpConfig::default());
        assert!(builder.credentials.is_none());
        assert!(builder.api_key.is_none());
    }
}
