//! Manifest validation
//!
//! Checks manifests for structure before a module is admitted to discovery.

use std::collections::HashSet;
use tracing::{debug, warn};

use crate::module::registry::manifest::{ActionManifest, ModuleManifest};

/// Validation result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Manifest is valid
    Valid,
    /// Manifest is invalid with specific errors
    Invalid(Vec<String>),
}

/// Manifest validator
pub struct ManifestValidator {
    /// Longest accepted module name
    max_name_len: usize,
}

impl ManifestValidator {
    /// Create a new manifest validator
    pub fn new() -> Self {
        Self { max_name_len: 64 }
    }

    /// Validate a module manifest, collecting every error
    pub fn validate(&self, manifest: &ModuleManifest) -> ValidationResult {
        let mut errors = Vec::new();

        if !self.is_valid_name(&manifest.name) {
            errors.push(format!(
                "Invalid module name: {:?} (must be alphanumeric with dashes/underscores/dots)",
                manifest.name
            ));
        }

        if let Some(namespace) = &manifest.namespace {
            if namespace.trim().is_empty() {
                errors.push("Namespace cannot be blank".to_string());
            }
        }

        if let Some(domain) = &manifest.domain {
            if domain.trim().is_empty() {
                errors.push("Domain cannot be blank".to_string());
            }
        }

        if let Some(version) = &manifest.version {
            if !self.is_valid_version(version) {
                errors.push(format!(
                    "Invalid version format: {} (expected semantic versioning)",
                    version
                ));
            }
        }

        let mut seen_deps = HashSet::new();
        for dep in &manifest.dependencies {
            if !self.is_valid_name(dep) {
                errors.push(format!("Invalid dependency name: {:?}", dep));
            }
            if !seen_deps.insert(dep.as_str()) {
                errors.push(format!("Duplicate dependency: {}", dep));
            }
        }

        let mut action_names = HashSet::new();
        for action in &manifest.actions {
            if !action_names.insert(action.name.as_str()) {
                errors.push(format!("Duplicate action name: {}", action.name));
            }
            errors.extend(self.validate_action(action));
        }

        if errors.is_empty() {
            debug!("Manifest validation passed for module: {}", manifest.name);
            ValidationResult::Valid
        } else {
            warn!(
                "Manifest validation failed for module {}: {:?}",
                manifest.name, errors
            );
            ValidationResult::Invalid(errors)
        }
    }

    fn validate_action(&self, action: &ActionManifest) -> Vec<String> {
        let mut errors = Vec::new();

        if action.name.is_empty() {
            errors.push("Action name cannot be empty".to_string());
        }

        if action.handler.is_empty() {
            errors.push(format!("Action {} has no handler", action.name));
        }

        let method_ok = action.method == "*"
            || (!action.method.is_empty() && action.method.chars().all(|c| c.is_ascii_alphabetic()));
        if !method_ok {
            errors.push(format!(
                "Action {} has invalid method: {:?}",
                action.name, action.method
            ));
        }

        for segment in action.path.split('/').filter(|s| !s.is_empty()) {
            let opens = segment.starts_with('{');
            let closes = segment.ends_with('}');
            if opens != closes || (opens && segment.len() < 3) {
                errors.push(format!(
                    "Action {} has malformed path segment: {}",
                    action.name, segment
                ));
            }
        }

        errors
    }

    /// Validate module name format
    #[inline]
    fn is_valid_name(&self, name: &str) -> bool {
        if name.is_empty() || name.len() > self.max_name_len {
            return false;
        }

        // Must start with alphanumeric
        if !name.chars().next().map_or(false, |c| c.is_alphanumeric()) {
            return false;
        }

        name.chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.')
    }

    /// Validate version format (semantic versioning)
    ///
    /// Accepts: major.minor[.patch][-prerelease][+build]
    #[inline]
    fn is_valid_version(&self, version: &str) -> bool {
        let base = version.split('+').next().unwrap_or_default();
        let version_part = base.split('-').next().unwrap_or_default();

        let nums: Vec<&str> = version_part.split('.').collect();
        if nums.len() < 2 || nums.len() > 3 {
            return false;
        }

        nums.iter().all(|n| {
            !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) && n.parse::<u32>().is_ok()
        })
    }
}

impl Default for ManifestValidator {
    fn default() -> Self {
        Self::new()
    }
}
