//! Outgoing response representation

use serde_json::Value;
use std::collections::BTreeMap;

pub const CONTENT_TYPE: &str = "content-type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Header map with case-insensitive keys
///
/// Keys are stored lower-cased; lookups lower-case the requested key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: BTreeMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Option<String> {
        self.entries.insert(key.to_ascii_lowercase(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(&key.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Response produced by a module or by the fallback builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: 200,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }
}

impl Response {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// JSON response; the value is pretty-printed
    pub fn json(status: u16, value: &Value) -> Self {
        let mut response = Self::new(status);
        response.set_header(CONTENT_TYPE, JSON_CONTENT_TYPE);
        // Serializing a `Value` cannot fail
        response.body = serde_json::to_vec_pretty(value).unwrap_or_default();
        response
    }

    pub fn with_header(mut self, key: &str, value: impl Into<String>) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    pub fn set_header(&mut self, key: &str, value: impl Into<String>) {
        self.headers.set(key, value);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse the body as JSON
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headers_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/plain");
        assert_eq!(headers.get("content-type"), Some("text/plain"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/plain"));
        headers.set("CONTENT-type", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_json_response() {
        let response = Response::json(201, &json!({"ok": true}));
        assert_eq!(response.status(), 201);
        assert_eq!(response.header("Content-Type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(response.body_json().unwrap()["ok"], true);
    }
}
