//! Successful gateway response

use std::collections::BTreeMap;

/// A 2xx response with its body fully read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayResponse {
    status_code: u16,
    body: String,
    headers: BTreeMap<String, String>,
}

impl GatewayResponse {
    pub(crate) fn new(status_code: u16, body: String, headers: BTreeMap<String, String>) -> Self {
        Self {
            status_code,
            body,
            headers,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// Response headers, names lowercase. A header repeated in the response
    /// keeps only its last value; values that are not valid UTF-8 are
    /// left out.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}
