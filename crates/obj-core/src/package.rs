//! Config package and stage bookkeeping
//!
//! A package is a directory below the packages root. Each stage is a
//! subdirectory holding one snapshot of declaration files; the name of the
//! active stage is recorded in the package's `active-stage` file.
//!
//! ```text
//! <packages root>/
//!   _api/
//!     include.conf
//!     active.conf
//!     active-stage
//!     1718000000-<uuid>/
//!       include.conf
//!       conf.d/<types>/<name>.conf
//! ```

use std::fs;
use std::path::Path;

use obj_fs::{NormalizedPath, io};
use uuid::Uuid;

use crate::{Error, Result};

const ACTIVE_STAGE_FILE: &str = "active-stage";
const ACTIVE_CONF_FILE: &str = "active.conf";
const INCLUDE_FILE: &str = "include.conf";

/// Filesystem-backed package and stage store.
#[derive(Debug, Clone)]
pub struct PackageStore {
    root: NormalizedPath,
}

impl PackageStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: NormalizedPath::new(root),
        }
    }

    pub fn root(&self) -> &NormalizedPath {
        &self.root
    }

    pub fn package_dir(&self, package: &str) -> Result<NormalizedPath> {
        Ok(self.root.join_segment(package)?)
    }

    pub fn stage_dir(&self, package: &str, stage: &str) -> Result<NormalizedPath> {
        Ok(self.package_dir(package)?.join_segment(stage)?)
    }

    pub fn package_exists(&self, package: &str) -> bool {
        self.package_dir(package).is_ok_and(|dir| dir.is_dir())
    }

    /// Create the package directory and its top-level include file.
    pub fn create_package(&self, package: &str) -> Result<()> {
        let dir = self.package_dir(package)?;
        io::create_dir_private(dir.to_native())?;
        io::write_text(&dir.join(INCLUDE_FILE), "include \"*/include.conf\"\n")?;

        tracing::debug!(package, path = %dir, "created config package");
        Ok(())
    }

    /// Create a new, inactive stage and return its name.
    pub fn create_stage(&self, package: &str) -> Result<String> {
        let stage = format!("{}-{}", chrono::Utc::now().timestamp(), Uuid::new_v4());
        let dir = self.stage_dir(package, &stage)?;

        io::create_dir_private(dir.to_native())?;
        io::write_text(
            &dir.join(INCLUDE_FILE),
            &format!(
                "if (ActiveStages[\"{package}\"] == \"{stage}\") {{\n\tinclude_recursive \"conf.d\"\n}}\n"
            ),
        )?;

        tracing::debug!(package, stage = %stage, "created config stage");
        Ok(stage)
    }

    /// Record `stage` as the active stage of `package`.
    pub fn activate_stage(&self, package: &str, stage: &str) -> Result<()> {
        let stage_dir = self.stage_dir(package, stage)?;
        if !stage_dir.is_dir() {
            return Err(Error::Package {
                package: package.to_string(),
                message: format!("stage '{stage}' does not exist"),
            });
        }

        let package_dir = self.package_dir(package)?;
        io::write_text(&package_dir.join(ACTIVE_STAGE_FILE), stage)?;
        io::write_text(
            &package_dir.join(ACTIVE_CONF_FILE),
            &format!(
                "if (!globals.contains(\"ActiveStages\")) {{\n\tglobals.ActiveStages = {{}}\n}}\n\nActiveStages[\"{package}\"] = \"{stage}\"\n"
            ),
        )?;

        tracing::debug!(package, stage, "activated config stage");
        Ok(())
    }

    /// Name of the active stage, if one is recorded.
    pub fn active_stage(&self, package: &str) -> Result<Option<String>> {
        let path = self.package_dir(package)?.join(ACTIVE_STAGE_FILE);
        if !path.is_file() {
            return Ok(None);
        }

        let stage = io::read_text(&path)?.trim().to_string();
        Ok((!stage.is_empty()).then_some(stage))
    }

    /// All stage directories of a package, sorted by name.
    pub fn stages(&self, package: &str) -> Result<Vec<String>> {
        let dir = self.package_dir(package)?;
        let native = dir.to_native();

        let entries = match fs::read_dir(&native) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(obj_fs::Error::io(native, e).into()),
        };

        let mut stages = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| obj_fs::Error::io(&native, e))?;
            let is_dir = entry
                .file_type()
                .map_err(|e| obj_fs::Error::io(entry.path(), e))?
                .is_dir();
            if is_dir {
                stages.push(entry.file_name().to_string_lossy().into_owned());
            }
        }

        stages.sort();
        Ok(stages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_activate_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = PackageStore::new(dir.path());

        assert!(!store.package_exists("_api"));
        store.create_package("_api").unwrap();
        assert!(store.package_exists("_api"));
        assert_eq!(store.active_stage("_api").unwrap(), None);

        let stage = store.create_stage("_api").unwrap();
        store.activate_stage("_api", &stage).unwrap();

        assert_eq!(store.active_stage("_api").unwrap(), Some(stage.clone()));
        assert_eq!(store.stages("_api").unwrap(), vec![stage.clone()]);

        let active_conf =
            std::fs::read_to_string(dir.path().join("_api").join(ACTIVE_CONF_FILE)).unwrap();
        assert!(active_conf.contains(&format!("ActiveStages[\"_api\"] = \"{stage}\"")));
    }

    #[test]
    fn activate_missing_stage_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = PackageStore::new(dir.path());
        store.create_package("_api").unwrap();

        let result = store.activate_stage("_api", "nope");
        assert!(matches!(result, Err(Error::Package { .. })));
    }

    #[test]
    fn package_names_cannot_escape_root() {
        let dir = tempfile::tempdir().unwrap();
        let store = PackageStore::new(dir.path());
        assert!(store.create_package("../outside").is_err());
        assert!(!store.package_exists(".."));
    }
}
