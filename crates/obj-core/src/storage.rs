//! Lazy creation and repair of the managed config package

use std::sync::{Mutex, MutexGuard};

use obj_fs::NormalizedPath;

use crate::package::PackageStore;
use crate::{Error, Result};

/// Guarantees that the managed package exists and has an active stage.
///
/// Bootstrap and repair run under one process-wide lock so concurrent
/// first requests create exactly one package and one stage.
#[derive(Debug)]
pub struct StorageBootstrap {
    packages: PackageStore,
    package: String,
    lock: Mutex<()>,
}

impl StorageBootstrap {
    pub fn new(packages: PackageStore, package: impl Into<String>) -> Self {
        Self {
            packages,
            package: package.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn packages(&self) -> &PackageStore {
        &self.packages
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // Guarded state lives on disk only.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create the package and an active stage if missing, or adopt an
    /// existing stage when the active-stage record is lost.
    ///
    /// # Errors
    ///
    /// Returns `Error::RepairFailure` when the package has no active stage
    /// and no stage directory to adopt.
    pub fn ensure_storage(&self) -> Result<()> {
        let _guard = self.guard();
        let package = self.package.as_str();

        if !self.packages.package_exists(package) {
            tracing::info!("Package {package} doesn't exist yet, creating it.");

            self.packages.create_package(package)?;
            let stage = self.packages.create_stage(package)?;
            self.packages.activate_stage(package, &stage)?;
            return Ok(());
        }

        if self.packages.active_stage(package)?.is_some() {
            return Ok(());
        }

        let Some(stage) = self.packages.stages(package)?.into_iter().next() else {
            tracing::error!(package, "config package has no stage to activate");
            return Err(Error::RepairFailure {
                package: package.to_string(),
            });
        };

        tracing::info!("Repairing config package '{package}' with stage '{stage}'.");
        self.packages.activate_stage(package, &stage)
    }

    /// Directory of the active stage.
    ///
    /// Runs [`StorageBootstrap::ensure_storage`] once if no stage is active.
    pub fn config_dir(&self) -> Result<NormalizedPath> {
        if let Some(stage) = self.packages.active_stage(&self.package)? {
            return self.packages.stage_dir(&self.package, &stage);
        }

        self.ensure_storage()?;

        match self.packages.active_stage(&self.package)? {
            Some(stage) => self.packages.stage_dir(&self.package, &stage),
            None => Err(Error::RepairFailure {
                package: self.package.clone(),
            }),
        }
    }
}
