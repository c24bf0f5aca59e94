//! [`TestStore`] fixture.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use obj_core::{ObjectStore, Settings};
use obj_fs::NormalizedPath;
use obj_model::TypeCatalog;
use tempfile::TempDir;

use crate::{CountingNotifier, FakeCompiler, MemoryRegistry};

/// An [`ObjectStore`] over a temporary packages root with in-memory
/// collaborators.
///
/// # Example
///
/// ```rust,no_run
/// use obj_core::CreateRequest;
/// use obj_test_utils::TestStore;
///
/// let fixture = TestStore::new();
/// let report = fixture.store.create_object(&CreateRequest::new("Host", "web")).unwrap();
/// assert!(report.is_success());
/// assert_eq!(fixture.conf_files().len(), 1);
/// ```
pub struct TestStore {
    temp_dir: TempDir,
    pub store: ObjectStore,
    pub registry: Arc<MemoryRegistry>,
    pub compiler: Arc<FakeCompiler>,
    pub notifier: Arc<CountingNotifier>,
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TestStore {
    pub fn new() -> Self {
        Self::with_settings(|settings| settings)
    }

    /// Build with settings adjusted by `configure`. The packages root is
    /// always the temporary directory.
    pub fn with_settings(configure: impl FnOnce(Settings) -> Settings) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let mut settings = configure(Settings::default());
        settings.packages_root = temp_dir.path().join("packages");

        let catalog = Arc::new(TypeCatalog::builtins());
        let registry = Arc::new(MemoryRegistry::new(catalog.clone()));
        let compiler = Arc::new(FakeCompiler::new());
        let notifier = Arc::new(CountingNotifier::new());

        let store = ObjectStore::builder(settings)
            .catalog(catalog)
            .registry(registry.clone())
            .dependencies(registry.clone())
            .compiler(compiler.clone())
            .authority(notifier.clone())
            .build()
            .unwrap();

        Self {
            temp_dir,
            store,
            registry,
            compiler,
            notifier,
        }
    }

    pub fn packages_root(&self) -> PathBuf {
        self.temp_dir.path().join("packages")
    }

    pub fn config_dir(&self) -> NormalizedPath {
        self.store.config_dir().unwrap()
    }

    /// Every `.conf` declaration file below any stage's `conf.d`.
    pub fn conf_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        collect_files(&self.packages_root(), &mut files);
        files.retain(|path| {
            path.extension().is_some_and(|ext| ext == "conf")
                && path.components().any(|c| c.as_os_str() == "conf.d")
        });
        files.sort();
        files
    }

    /// Leftover temporary files from pending writes.
    pub fn pending_files(&self) -> Vec<PathBuf> {
        let mut files = Vec::new();
        collect_files(&self.packages_root(), &mut files);
        files.retain(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with(".pending-"))
        });
        files
    }

    pub fn read(&self, path: impl AsRef<Path>) -> String {
        fs::read_to_string(path).unwrap()
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out);
        } else {
            out.push(path);
        }
    }
}
