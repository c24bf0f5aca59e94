//! The object store facade
//!
//! [`ObjectStore`] ties the managed package, path derivation and the
//! collaborators together. Create and delete live in `create.rs` and
//! `delete.rs` as further `impl ObjectStore` blocks.

use std::fmt;
use std::sync::Arc;

use obj_fs::NormalizedPath;
use obj_model::{ObjectType, TypeCatalog};

use crate::collab::{AuthorityNotifier, Compiler, DependencyGraph, NoopNotifier, Registry, Renderer};
use crate::package::PackageStore;
use crate::path::PathComposer;
use crate::render::DslRenderer;
use crate::storage::StorageBootstrap;
use crate::{Error, Result, Settings};

/// Transactional store for runtime-created configuration objects.
pub struct ObjectStore {
    pub(crate) settings: Settings,
    pub(crate) catalog: Arc<TypeCatalog>,
    pub(crate) bootstrap: StorageBootstrap,
    pub(crate) paths: PathComposer,
    pub(crate) registry: Arc<dyn Registry>,
    pub(crate) dependencies: Arc<dyn DependencyGraph>,
    pub(crate) compiler: Arc<dyn Compiler>,
    pub(crate) renderer: Arc<dyn Renderer>,
    pub(crate) authority: Arc<dyn AuthorityNotifier>,
}

impl fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("settings", &self.settings)
            .field("types", &self.catalog.len())
            .finish_non_exhaustive()
    }
}

impl ObjectStore {
    pub fn builder(settings: Settings) -> ObjectStoreBuilder {
        ObjectStoreBuilder::new(settings)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Name of the managed package.
    pub fn package(&self) -> &str {
        self.bootstrap.package()
    }

    pub fn packages(&self) -> &PackageStore {
        self.bootstrap.packages()
    }

    /// See [`StorageBootstrap::ensure_storage`].
    pub fn ensure_storage(&self) -> Result<()> {
        self.bootstrap.ensure_storage()
    }

    /// Directory of the managed package's active stage.
    pub fn config_dir(&self) -> Result<NormalizedPath> {
        self.bootstrap.config_dir()
    }

    /// Config file path a new object of this type and name would get.
    pub fn compute_path(&self, type_name: &str, full_name: &str) -> Result<NormalizedPath> {
        let object_type = self.object_type(type_name)?;
        let config_dir = self.config_dir()?;
        self.paths.compute(&config_dir, object_type, full_name)
    }

    pub(crate) fn object_type(&self, type_name: &str) -> Result<&ObjectType> {
        self.catalog
            .get(type_name)
            .ok_or_else(|| Error::validation(format!("Invalid type: {type_name}")))
    }
}

/// Builder for [`ObjectStore`].
pub struct ObjectStoreBuilder {
    settings: Settings,
    catalog: Option<Arc<TypeCatalog>>,
    registry: Option<Arc<dyn Registry>>,
    dependencies: Option<Arc<dyn DependencyGraph>>,
    compiler: Option<Arc<dyn Compiler>>,
    renderer: Option<Arc<dyn Renderer>>,
    authority: Option<Arc<dyn AuthorityNotifier>>,
}

impl ObjectStoreBuilder {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            catalog: None,
            registry: None,
            dependencies: None,
            compiler: None,
            renderer: None,
            authority: None,
        }
    }

    /// Types the store accepts. Defaults to [`TypeCatalog::builtins`].
    pub fn catalog(mut self, catalog: Arc<TypeCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn registry(mut self, registry: Arc<dyn Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn dependencies(mut self, dependencies: Arc<dyn DependencyGraph>) -> Self {
        self.dependencies = Some(dependencies);
        self
    }

    pub fn compiler(mut self, compiler: Arc<dyn Compiler>) -> Self {
        self.compiler = Some(compiler);
        self
    }

    /// Defaults to [`DslRenderer`].
    pub fn renderer(mut self, renderer: Arc<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Defaults to [`NoopNotifier`].
    pub fn authority(mut self, authority: Arc<dyn AuthorityNotifier>) -> Self {
        self.authority = Some(authority);
        self
    }

    /// Build the store.
    ///
    /// # Errors
    ///
    /// Returns `Error::Settings` if the registry, dependency graph or
    /// compiler was not supplied, or the package name is not a valid path
    /// segment.
    pub fn build(self) -> Result<ObjectStore> {
        let registry = self.registry.ok_or_else(|| missing("registry"))?;
        let dependencies = self.dependencies.ok_or_else(|| missing("dependency graph"))?;
        let compiler = self.compiler.ok_or_else(|| missing("compiler"))?;

        obj_fs::validate_path_segment(&self.settings.package).map_err(|e| Error::Settings {
            path: None,
            message: e.to_string(),
        })?;

        let packages = PackageStore::new(&self.settings.packages_root);
        let bootstrap = StorageBootstrap::new(packages, self.settings.package.clone());
        let paths = PathComposer::from_settings(&self.settings);

        Ok(ObjectStore {
            catalog: self
                .catalog
                .unwrap_or_else(|| Arc::new(TypeCatalog::builtins())),
            bootstrap,
            paths,
            registry,
            dependencies,
            compiler,
            renderer: self.renderer.unwrap_or_else(|| Arc::new(DslRenderer)),
            authority: self.authority.unwrap_or_else(|| Arc::new(NoopNotifier)),
            settings: self.settings,
        })
    }
}

fn missing(what: &str) -> Error {
    Error::Settings {
        path: None,
        message: format!("no {what} configured"),
    }
}
