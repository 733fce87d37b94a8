//! Test utilities for module tree fixtures
//!
//! Builds an application root in a temporary directory with a user
//! `modules/` directory and a built-in `native/` directory.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use modrouter::DispatchConfig;

/// Temporary application root holding module directories
pub struct ModuleTree {
    /// Kept alive for the lifetime of the fixture
    pub temp_dir: TempDir,
    pub modules_dir: PathBuf,
    pub native_dir: PathBuf,
}

impl ModuleTree {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let modules_dir = temp_dir.path().join("modules");
        let native_dir = temp_dir.path().join("native");
        fs::create_dir_all(&modules_dir).unwrap();
        fs::create_dir_all(&native_dir).unwrap();
        Self {
            temp_dir,
            modules_dir,
            native_dir,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write a user module directory with the given `module.toml`
    pub fn add_module(&self, dir: &str, manifest: &str) -> PathBuf {
        write_module(&self.modules_dir, dir, Some(manifest))
    }

    /// Write a built-in module directory with the given `module.toml`
    pub fn add_native(&self, dir: &str, manifest: &str) -> PathBuf {
        write_module(&self.native_dir, dir, Some(manifest))
    }

    /// User module directory without a manifest
    pub fn add_bare(&self, dir: &str) -> PathBuf {
        write_module(&self.modules_dir, dir, None)
    }

    /// Configuration rooted at this tree
    pub fn config(&self) -> DispatchConfig {
        let mut config = DispatchConfig::default();
        config.modules.app_root = self.root().to_string_lossy().into_owned();
        config
    }

    pub fn source_dirs(&self) -> Vec<PathBuf> {
        vec![self.modules_dir.clone(), self.native_dir.clone()]
    }
}

fn write_module(parent: &Path, dir: &str, manifest: Option<&str>) -> PathBuf {
    let path = parent.join(dir);
    fs::create_dir_all(&path).unwrap();
    if let Some(manifest) = manifest {
        fs::write(path.join("module.toml"), manifest).unwrap();
    }
    path
}

/// Manifest with a single `static` action answering `body`
pub fn static_manifest(name: &str, domain: &str, path: &str, body: &str) -> String {
    format!(
        r#"
name = "{name}"
domain = "{domain}"

[[actions]]
name = "answer"
method = "GET"
path = "{path}"
handler = "static"
[actions.params]
content_type = "text/plain"
body = "{body}"
"#
    )
}
