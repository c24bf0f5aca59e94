//! Transactional creation and cascading deletion of runtime configuration
//! objects
//!
//! Objects created at runtime are persisted as declaration files inside a
//! managed config package so they survive restarts. This crate provides:
//!
//! - [`ObjectStore`]: the facade running create and delete transactions
//! - [`PathComposer`]: deterministic config file paths for (type, name)
//! - [`StorageBootstrap`] / [`PackageStore`]: the managed package and its
//!   active stage, created and repaired on demand
//! - [`DslRenderer`]: declaration source rendering
//! - Collaborator traits ([`Registry`], [`Compiler`], [`DependencyGraph`],
//!   [`AuthorityNotifier`]) implemented by the embedding runtime
//!
//! # Example
//!
//! ```ignore
//! let store = ObjectStore::builder(Settings::with_packages_root("/var/lib/objstore"))
//!     .registry(registry.clone())
//!     .dependencies(registry)
//!     .compiler(compiler)
//!     .build()?;
//!
//! let report = store.create_object(
//!     &CreateRequest::new("Service", "host1!ping")
//!         .with_attribute("check_command", json!("ping4")),
//! )?;
//! assert!(report.is_success());
//! ```

pub mod collab;
pub mod create;
pub mod delete;
pub mod error;
pub mod logging;
pub mod package;
pub mod path;
pub mod render;
pub mod report;
pub mod settings;
pub mod storage;
pub mod store;

pub use collab::{
    ActivateOptions, ActivationScope, AuthorityNotifier, Compiler, DependencyGraph, NoopNotifier,
    Registry, Renderer,
};
pub use create::{CreateRequest, VERSION_ATTRIBUTE};
pub use error::{Error, ErrorKind, Result};
pub use package::PackageStore;
pub use path::{CONF_DIR, CONFIG_FILE_EXTENSION, HASHED_NAME_MAX_BYTES, PathComposer, existing_object_path};
pub use render::DslRenderer;
pub use report::{OperationReport, Outcome};
pub use settings::Settings;
pub use storage::StorageBootstrap;
pub use store::{ObjectStore, ObjectStoreBuilder};
