//! Config file path derivation
//!
//! Runtime-created objects live at
//! `<config dir>/conf.d/<plural type name, lowercase>/<derived name>.conf`.
//! Every cluster member computes the same path independently, so the
//! derivation must stay byte-identical across versions.

use std::collections::BTreeSet;

use obj_fs::{NormalizedPath, escape_name, truncate_using_hash};
use obj_model::{ObjectType, RuntimeObject};

use crate::{Error, Result, Settings};

/// Directory below the stage holding object declarations.
pub const CONF_DIR: &str = "conf.d";

/// Extension of every object declaration file.
pub const CONFIG_FILE_EXTENSION: &str = ".conf";

/// Bound for hashed names: 80 bytes of name, `...`, 40 hex digits of SHA-1.
pub const HASHED_NAME_MAX_BYTES: usize = 80 + 3 + 40;

/// Derives config file paths for (type, name) pairs.
#[derive(Debug, Clone)]
pub struct PathComposer {
    hashed_kinds: BTreeSet<String>,
    max_file_name_bytes: usize,
    max_path_bytes: usize,
}

impl PathComposer {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            hashed_kinds: settings.hashed_name_kinds.iter().cloned().collect(),
            max_file_name_bytes: settings.max_file_name_bytes,
            max_path_bytes: settings.max_path_bytes,
        }
    }

    /// Directory holding all objects of `object_type`.
    pub fn type_dir(&self, config_dir: &NormalizedPath, object_type: &ObjectType) -> Result<NormalizedPath> {
        let type_dir = object_type.plural_name().to_lowercase();
        Ok(config_dir.join(CONF_DIR).join_segment(&type_dir)?)
    }

    /// File name stem for an object, before the extension.
    ///
    /// Kinds listed as hashed get a length-bounded name. All others keep the
    /// full escaped name, as older peers resolve that name verbatim.
    pub fn derived_name(&self, object_type: &ObjectType, full_name: &str) -> String {
        let escaped = escape_name(full_name);

        if self.hashed_kinds.contains(object_type.name()) {
            truncate_using_hash(&escaped, HASHED_NAME_MAX_BYTES)
        } else {
            escaped
        }
    }

    /// Compute the config file path for a new object.
    ///
    /// # Errors
    ///
    /// Returns `Error::Path` when the file name or the whole path would
    /// exceed the configured limits. Non-hashed kinds are never shortened.
    pub fn compute(
        &self,
        config_dir: &NormalizedPath,
        object_type: &ObjectType,
        full_name: &str,
    ) -> Result<NormalizedPath> {
        let type_dir = self.type_dir(config_dir, object_type)?;
        let file_name = format!(
            "{}{}",
            self.derived_name(object_type, full_name),
            CONFIG_FILE_EXTENSION
        );

        if file_name.len() > self.max_file_name_bytes {
            return Err(Error::Path {
                type_name: object_type.name().to_string(),
                name: full_name.to_string(),
                reason: format!(
                    "file name is {} bytes, the limit is {}",
                    file_name.len(),
                    self.max_file_name_bytes
                ),
            });
        }

        let path = type_dir.join(&file_name);
        if path.len() > self.max_path_bytes {
            return Err(Error::Path {
                type_name: object_type.name().to_string(),
                name: full_name.to_string(),
                reason: format!(
                    "path is {} bytes, the limit is {}",
                    path.len(),
                    self.max_path_bytes
                ),
            });
        }

        Ok(path)
    }
}

/// Path of the file an existing object was loaded from.
pub fn existing_object_path(object: &RuntimeObject) -> Option<&NormalizedPath> {
    object.source_path.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use obj_model::TypeCatalog;

    fn composer() -> PathComposer {
        PathComposer::from_settings(&Settings::default())
    }

    #[test]
    fn service_path_uses_lowercase_plural() {
        let catalog = TypeCatalog::builtins();
        let dir = NormalizedPath::new("/pkgs/_api/stage1");
        let path = composer()
            .compute(&dir, catalog.get("Service").unwrap(), "host1!ping")
            .unwrap();
        assert_eq!(path.as_str(), "/pkgs/_api/stage1/conf.d/services/host1!ping.conf");
    }

    #[test]
    fn hostile_characters_are_escaped_in_file_name() {
        let catalog = TypeCatalog::builtins();
        let dir = NormalizedPath::new("/pkgs/_api/stage1");
        let path = composer()
            .compute(&dir, catalog.get("Host").unwrap(), "web/01")
            .unwrap();
        assert_eq!(path.file_name(), Some("web%2f01.conf"));
    }

    #[test]
    fn long_downtime_name_is_hashed() {
        let catalog = TypeCatalog::builtins();
        let downtime = catalog.get("Downtime").unwrap();
        let name = format!("host1!{}", "d".repeat(194));
        assert_eq!(name.len(), 200);

        let derived = composer().derived_name(downtime, &name);
        assert_eq!(derived.len(), HASHED_NAME_MAX_BYTES);
        assert!(derived.starts_with(&name[..80]));
        assert_eq!(&derived[80..83], "...");
        assert_eq!(&derived[83..], obj_fs::sha1_hex(&name));
    }

    #[test]
    fn long_host_name_is_rejected_not_truncated() {
        let catalog = TypeCatalog::builtins();
        let dir = NormalizedPath::new("/pkgs/_api/stage1");
        let name = "h".repeat(300);
        let result = composer().compute(&dir, catalog.get("Host").unwrap(), &name);
        assert!(matches!(result, Err(Error::Path { .. })));
    }

    #[test]
    fn path_limit_is_enforced() {
        let settings = Settings {
            max_path_bytes: 40,
            ..Settings::default()
        };
        let catalog = TypeCatalog::builtins();
        let dir = NormalizedPath::new("/pkgs/_api/stage1");
        let result = PathComposer::from_settings(&settings).compute(
            &dir,
            catalog.get("Host").unwrap(),
            "a-reasonably-named-host",
        );
        assert!(matches!(result, Err(Error::Path { .. })));
    }
}
