//! Configuration management for modrouter
//!
//! Handles configuration loading, validation, and module directory layout.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::module::registry::manifest::MANIFEST_FILE;

/// Environment variable overriding [`ModuleConfig::modules_dir`]
pub const MODULES_DIR_ENV: &str = "MODROUTER_MODULES_DIR";

/// Module discovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Enable module discovery (disabled = route over no modules)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// User modules directory, relative paths resolve against `app_root`
    #[serde(default = "default_modules_dir")]
    pub modules_dir: String,

    /// Application root holding the built-in modules
    #[serde(default = "default_app_root")]
    pub app_root: String,

    /// Subdirectory of `app_root` with the built-in (native) modules
    #[serde(default = "default_native_subdir")]
    pub native_subdir: String,

    /// Manifest file name looked up in each module directory
    #[serde(default = "default_manifest_file")]
    pub manifest_file: String,
}

fn default_true() -> bool {
    true
}

fn default_modules_dir() -> String {
    "modules".to_string()
}

fn default_app_root() -> String {
    ".".to_string()
}

fn default_native_subdir() -> String {
    "native".to_string()
}

fn default_manifest_file() -> String {
    MANIFEST_FILE.to_string()
}

fn default_max_samples() -> usize {
    1000
}

impl Default for ModuleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            modules_dir: default_modules_dir(),
            app_root: default_app_root(),
            native_subdir: default_native_subdir(),
            manifest_file: default_manifest_file(),
        }
    }
}

impl ModuleConfig {
    /// User modules directory resolved against `app_root`
    pub fn user_modules_dir(&self) -> PathBuf {
        let dir = Path::new(&self.modules_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            Path::new(&self.app_root).join(dir)
        }
    }

    /// Built-in modules directory (`<app_root>/<native_subdir>`)
    pub fn native_modules_dir(&self) -> PathBuf {
        Path::new(&self.app_root).join(&self.native_subdir)
    }

    /// Directories scanned by discovery, user modules first
    ///
    /// Empty when discovery is disabled.
    pub fn source_dirs(&self) -> Vec<PathBuf> {
        if !self.enabled {
            return Vec::new();
        }
        vec![self.user_modules_dir(), self.native_modules_dir()]
    }
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log filter (e.g. "info", "modrouter=debug"); RUST_LOG takes precedence
    #[serde(default)]
    pub filter: Option<String>,

    /// Emit JSON lines (requires the `json-logging` feature)
    #[serde(default)]
    pub json_format: bool,
}

/// Dispatch instrumentation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Samples kept per stat name before the oldest is evicted
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
}

impl Default for InstrumentationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_samples: default_max_samples(),
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchConfig {
    #[serde(default)]
    pub modules: ModuleConfig,

    #[serde(default)]
    pub logging: Option<LoggingConfig>,

    #[serde(default)]
    pub instrumentation: InstrumentationConfig,
}

impl DispatchConfig {
    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DispatchConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DispatchConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load by extension: `.json` as JSON, anything else as TOML
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_file(path),
            _ => Self::from_toml_file(path),
        }
    }

    /// Save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply environment overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(MODULES_DIR_ENV) {
            if !dir.trim().is_empty() {
                self.modules.modules_dir = dir;
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        let dirs = [
            ("modules_dir", &self.modules.modules_dir),
            ("app_root", &self.modules.app_root),
            ("native_subdir", &self.modules.native_subdir),
            ("manifest_file", &self.modules.manifest_file),
        ];
        for (field, value) in dirs {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("modules.{} must not be empty", field));
            }
        }

        if self.instrumentation.max_samples == 0 {
            return Err(anyhow::anyhow!(
                "instrumentation.max_samples must be greater than 0"
            ));
        }

        Ok(())
    }
}
