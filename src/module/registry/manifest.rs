//! Module manifest parsing
//!
//! Handles parsing `module.toml` manifests into module metadata.

use crate::module::traits::{ModuleError, ModuleMetadata};
use crate::router::paths::normalize_domain;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Default manifest file name inside a module directory
pub const MANIFEST_FILE: &str = "module.toml";

/// Module manifest (module.toml structure)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModuleManifest {
    /// Module name
    pub name: String,
    /// Namespace (defaults to the name)
    #[serde(default)]
    pub namespace: Option<String>,
    /// URL prefix (defaults to "/<name>")
    #[serde(default)]
    pub domain: Option<String>,
    /// Module version (semantic versioning)
    #[serde(default)]
    pub version: Option<String>,
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,
    /// Required modules, in declaration order
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Actions served under the domain
    #[serde(default)]
    pub actions: Vec<ActionManifest>,
}

/// One action entry of a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionManifest {
    /// Action identifier
    pub name: String,
    /// HTTP method, or "*" for any
    #[serde(default = "default_method")]
    pub method: String,
    /// Path below the module domain ("" = the domain itself)
    #[serde(default)]
    pub path: String,
    /// Handler kind looked up in the handler registry
    pub handler: String,
    /// Free-form handler parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_method() -> String {
    "*".to_string()
}

impl ActionManifest {
    pub fn new(name: impl Into<String>, handler: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: default_method(),
            path: String::new(),
            handler: handler.into(),
            params: HashMap::new(),
        }
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

impl ModuleManifest {
    /// Manifest for a module directory that ships no module.toml
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            domain: None,
            version: None,
            description: None,
            dependencies: Vec::new(),
            actions: Vec::new(),
        }
    }

    /// Load manifest from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ModuleError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ModuleError::InvalidManifest(format!("Failed to read manifest file: {}", e))
        })?;

        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ModuleError> {
        let manifest: ModuleManifest = toml::from_str(contents).map_err(|e| {
            ModuleError::InvalidManifest(format!("Failed to parse manifest TOML: {}", e))
        })?;

        if manifest.name.is_empty() {
            return Err(ModuleError::InvalidManifest(
                "Module name cannot be empty".to_string(),
            ));
        }

        Ok(manifest)
    }

    /// Load the manifest of a module directory
    ///
    /// A directory without a manifest file is described by its name alone.
    pub fn load_from_dir(dir: &Path, manifest_file: &str) -> Result<Self, ModuleError> {
        let manifest_path = dir.join(manifest_file);
        if manifest_path.is_file() {
            return Self::from_file(&manifest_path);
        }

        let name = dir.file_name().ok_or_else(|| {
            ModuleError::InvalidManifest(format!("Module directory has no name: {:?}", dir))
        })?;
        let name = name.to_str().ok_or_else(|| {
            ModuleError::InvalidManifest(format!(
                "Module directory name is not valid UTF-8: {:?}",
                dir
            ))
        })?;
        Ok(Self::bare(name))
    }

    pub fn namespace(&self) -> &str {
        self.namespace.as_deref().unwrap_or(&self.name)
    }

    /// Declared domain, or "/<name>" when absent
    pub fn domain(&self) -> String {
        match &self.domain {
            Some(domain) => normalize_domain(domain),
            None => normalize_domain(&self.name),
        }
    }

    /// Convert to ModuleMetadata
    pub fn to_metadata(&self, directory: Option<&Path>) -> ModuleMetadata {
        ModuleMetadata {
            name: self.name.clone(),
            namespace: self.namespace().to_string(),
            domain: self.domain(),
            dependencies: self.dependencies.clone(),
            version: self.version.clone(),
            description: self.description.clone().unwrap_or_default(),
            directory: directory.map(Path::to_path_buf),
        }
    }
}
