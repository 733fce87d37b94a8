//! Request and response value types
//!
//! The dispatch core never parses wire traffic. Callers hand it an already
//! parsed [`Request`] and receive a [`Response`] back.

pub mod request;
pub mod response;

pub use request::{Request, DISPATCHING_ID};
pub use response::{Headers, Response, CONTENT_TYPE, JSON_CONTENT_TYPE};
