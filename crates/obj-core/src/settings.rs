//! Store settings, loadable from TOML or JSON
//!
//! # Example TOML
//!
//! ```toml
//! packages_root = "/var/lib/objstore/packages"
//! package = "_api"
//! hashed_name_kinds = ["Comment", "Downtime"]
//! authority_exempt_kinds = ["Comment", "Downtime"]
//! ```

use std::path::PathBuf;

use obj_fs::{NormalizedPath, io};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Settings for an [`crate::ObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Directory holding all config packages
    pub packages_root: PathBuf,
    /// Name of the package runtime-created objects are written to
    pub package: String,
    /// Kinds whose file names are truncated and hashed when too long
    pub hashed_name_kinds: Vec<String>,
    /// Kinds whose creation does not trigger authority recomputation
    pub authority_exempt_kinds: Vec<String>,
    /// File name length limit for kinds that are never truncated
    pub max_file_name_bytes: usize,
    /// Length limit for the complete config file path
    pub max_path_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            packages_root: PathBuf::from("/var/lib/objstore/packages"),
            package: "_api".to_string(),
            hashed_name_kinds: vec!["Comment".to_string(), "Downtime".to_string()],
            authority_exempt_kinds: vec!["Comment".to_string(), "Downtime".to_string()],
            max_file_name_bytes: 255,
            max_path_bytes: 4096,
        }
    }
}

impl Settings {
    /// Default settings rooted at `packages_root`.
    pub fn with_packages_root(packages_root: impl Into<PathBuf>) -> Self {
        Self {
            packages_root: packages_root.into(),
            ..Self::default()
        }
    }

    /// Load settings from a file.
    ///
    /// Format is detected from file extension:
    /// - `.toml` -> TOML
    /// - `.json` -> JSON
    pub fn load(path: &NormalizedPath) -> Result<Self> {
        let content = io::read_text(path)?;
        let extension = path.extension().unwrap_or("");

        let settings: Self = match extension.to_lowercase().as_str() {
            "toml" => toml::from_str(&content).map_err(|e| Error::Settings {
                path: Some(path.to_native()),
                message: e.to_string(),
            })?,
            "json" => serde_json::from_str(&content).map_err(|e| Error::Settings {
                path: Some(path.to_native()),
                message: e.to_string(),
            })?,
            _ => {
                return Err(Error::Settings {
                    path: Some(path.to_native()),
                    message: format!("unsupported format '{extension}'"),
                });
            }
        };

        settings.validate().map_err(|message| Error::Settings {
            path: Some(path.to_native()),
            message,
        })?;

        Ok(settings)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        obj_fs::validate_path_segment(&self.package).map_err(|e| e.to_string())?;
        if self.max_file_name_bytes == 0 || self.max_path_bytes == 0 {
            return Err("length limits must be positive".to_string());
        }
        Ok(())
    }

    pub fn uses_hashed_names(&self, type_name: &str) -> bool {
        self.hashed_name_kinds.iter().any(|k| k == type_name)
    }

    pub fn is_authority_exempt(&self, type_name: &str) -> bool {
        self.authority_exempt_kinds.iter().any(|k| k == type_name)
    }
}
