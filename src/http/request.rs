//! Incoming request representation
//!
//! Holds the method, URL, body and a mutable context bag that the router
//! and module handlers use to pass values down the call chain.

use std::collections::HashMap;

/// Context key under which every dispatch stores its correlation id
pub const DISPATCHING_ID: &str = "dispatchingId";

/// An already-parsed request
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    url: String,
    body: Vec<u8>,
    context: HashMap<String, String>,
}

impl Request {
    /// Create a request with an empty body
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            body: Vec::new(),
            context: HashMap::new(),
        }
    }

    /// Attach a body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Body decoded as UTF-8, lossy
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Store a context value, returning the previous one
    pub fn set_context(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.context.insert(key.into(), value.into())
    }

    pub fn context(&self, key: &str) -> Option<&str> {
        self.context.get(key).map(String::as_str)
    }

    pub fn context_values(&self) -> &HashMap<String, String> {
        &self.context
    }

    /// Correlation id of the most recent dispatch of this request
    pub fn dispatching_id(&self) -> Option<&str> {
        self.context(DISPATCHING_ID)
    }

    /// Derive a request for a nested dispatch: same method, body and
    /// context, different URL
    pub fn derive(&self, url: impl Into<String>) -> Self {
        Self {
            method: self.method.clone(),
            url: url.into(),
            body: self.body.clone(),
            context: self.context.clone(),
        }
    }
}
