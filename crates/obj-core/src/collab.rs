//! Collaborator seams
//!
//! The store drives a transaction through services it does not own: a
//! renderer, a compiler, the object registry and the dependency graph.
//! Each is a trait so embedders plug in their runtime and tests plug in
//! in-memory fakes.

use obj_fs::NormalizedPath;
use obj_model::{AttributeSet, CompiledUnit, Diagnostic, ObjectKey, OriginCookie, RuntimeObject};

/// Turns an object description into DSL source.
pub trait Renderer: Send + Sync {
    fn render(
        &self,
        type_name: &str,
        object_name: &str,
        templates: &[String],
        attributes: &AttributeSet,
        ignore_on_error: bool,
    ) -> String;
}

/// Compiles DSL source into declarations.
pub trait Compiler: Send + Sync {
    /// Compile `source`, which will live at `path` inside `package`.
    fn compile(
        &self,
        path: &NormalizedPath,
        source: &str,
        package: &str,
    ) -> Result<CompiledUnit, Diagnostic>;
}

/// Evaluated units waiting to be committed.
///
/// A scope belongs to a single create transaction; committing drains it.
#[derive(Debug, Default)]
pub struct ActivationScope {
    units: Vec<CompiledUnit>,
}

impl ActivationScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a compiled unit for commit.
    pub fn evaluate(&mut self, unit: CompiledUnit) {
        self.units.push(unit);
    }

    pub fn units(&self) -> &[CompiledUnit] {
        &self.units
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn drain(&mut self) -> Vec<CompiledUnit> {
        std::mem::take(&mut self.units)
    }
}

/// Flags passed to [`Registry::activate_items`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivateOptions {
    /// Objects were created at runtime rather than loaded at startup
    pub runtime_created: bool,
    /// Suppress per-object activation logging
    pub silent: bool,
    /// Also replay attribute modifications recorded for the objects
    pub with_modified_attrs: bool,
    /// Node the change originated from
    pub origin: Option<OriginCookie>,
}

impl ActivateOptions {
    /// Options for objects created through the store.
    pub fn runtime(origin: Option<OriginCookie>) -> Self {
        Self {
            runtime_created: true,
            silent: false,
            with_modified_attrs: false,
            origin,
        }
    }
}

/// The live object registry.
pub trait Registry: Send + Sync {
    /// Look up an activated object.
    fn get_object(&self, type_name: &str, name: &str) -> Option<RuntimeObject>;

    /// Commit every declaration in `scope`, returning the committed items.
    ///
    /// With `ignore_on_error`, declarations marked as such that fail are
    /// dropped instead of failing the whole commit.
    fn commit_items(
        &self,
        scope: &mut ActivationScope,
        ignore_on_error: bool,
    ) -> Result<Vec<ObjectKey>, Vec<Diagnostic>>;

    fn activate_items(
        &self,
        items: &[ObjectKey],
        options: &ActivateOptions,
    ) -> Result<(), Vec<Diagnostic>>;

    /// Forget committed items and any objects activated from them.
    fn discard_items(&self, items: &[ObjectKey]);

    /// Flag an object so replication and persistence treat it as gone.
    fn mark_deleted(&self, key: &ObjectKey);

    fn deactivate(&self, key: &ObjectKey, origin: Option<&OriginCookie>) -> Result<(), Diagnostic>;

    /// Whether a config item with this key is registered.
    fn has_item(&self, key: &ObjectKey) -> bool;

    fn unregister_item(&self, key: &ObjectKey);

    fn unregister_object(&self, key: &ObjectKey) -> Result<(), Diagnostic>;
}

/// Reverse dependency lookup.
pub trait DependencyGraph: Send + Sync {
    /// Objects that currently depend on `key`.
    fn dependents(&self, key: &ObjectKey) -> Vec<RuntimeObject>;
}

/// Hook fired after objects that take part in authority distribution are
/// created.
pub trait AuthorityNotifier: Send + Sync {
    fn recompute(&self);
}

/// Notifier for deployments without authority distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl AuthorityNotifier for NoopNotifier {
    fn recompute(&self) {}
}
