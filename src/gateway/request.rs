//! Outbound request value and its builder

use bytes::Bytes;
use hyper::Method;
use std::collections::BTreeMap;

/// Query parameters in insertion order; a key may carry several values
pub type QueryParameters = Vec<(String, Vec<String>)>;

/// One call against the gateway. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRequest {
    http_method: Option<Method>,
    resource_path: Option<String>,
    body: Option<Bytes>,
    headers: BTreeMap<String, String>,
    query_parameters: QueryParameters,
}

impl GatewayRequest {
    pub fn builder() -> GatewayRequestBuilder {
        GatewayRequestBuilder::new()
    }

    pub fn http_method(&self) -> Option<&Method> {
        self.http_method.as_ref()
    }

    pub fn resource_path(&self) -> Option<&str> {
        self.resource_path.as_deref()
    }

    pub fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Distinct keys in the order they were first added
    pub fn query_parameters(&self) -> &[(String, Vec<String>)] {
        &self.query_parameters
    }
}

/// Accumulates request fields. `build` never fails; a missing method or
/// resource path is reported when the request is executed.
#[derive(Debug, Clone, Default)]
pub struct GatewayRequestBuilder {
    http_method: Option<Method>,
    resource_path: Option<String>,
    body: Option<Bytes>,
    headers: BTreeMap<String, String>,
    query_parameters: QueryParameters,
}

impl GatewayRequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http_method(mut self, method: Method) -> Self {
        self.http_method = Some(method);
        self
    }

    pub fn with_resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = Some(path.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Replace all headers
    pub fn with_headers(mut self, headers: BTreeMap<String, String>) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace all query parameters, keeping the iteration order of
    /// `parameters`. Values of a key given twice are merged.
    pub fn with_query_parameters<I, K>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<String>)>,
        K: Into<String>,
    {
        self.query_parameters.clear();
        for (name, values) in parameters {
            let name = name.into();
            for value in values {
                self = self.with_query_parameter(name.clone(), value);
            }
        }
        self
    }

    /// Append one value to a (possibly repeated) query parameter
    pub fn with_query_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        match self.query_parameters.iter_mut().find(|(key, _)| *key == name) {
            Some((_, values)) => values.push(value.into()),
            None => self.query_parameters.push((name, vec![value.into()])),
        }
        self
    }

    pub fn build(self) -> GatewayRequest {
        GatewayRequest {
            http_method: self.http_method,
            resource_path: self.resource_path,
            body: self.body,
            headers: self.headers,
            query_parameters: self.query_parameters,
        }
    }
}
