//! Module validation framework
//!
//! Provides manifest validation run during discovery.

pub mod manifest_validator;

pub use manifest_validator::{ManifestValidator, ValidationResult};
