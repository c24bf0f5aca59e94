//! Shared test utilities for the objstore workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`registry`]: in-memory registry and dependency graph
//! - [`compiler`]: compiler fake that parses rendered declarations
//! - [`notifier`]: authority notifier that counts calls
//! - [`store`]: [`TestStore`] wiring all fakes to a real store on a temp dir

pub mod compiler;
pub mod notifier;
pub mod registry;
pub mod store;

pub use compiler::FakeCompiler;
pub use notifier::CountingNotifier;
pub use registry::{MemoryRegistry, RegistryEvent};
pub use store::TestStore;
