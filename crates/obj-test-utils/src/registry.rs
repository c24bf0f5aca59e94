//! In-memory [`Registry`] and [`DependencyGraph`].
//!
//! Records every call as a [`RegistryEvent`] so tests can assert on
//! ordering, and exposes knobs to make commit, activation or deactivation
//! fail for chosen object names.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use obj_core::{ActivateOptions, ActivationScope, DependencyGraph, Registry};
use obj_fs::NormalizedPath;
use obj_model::{Diagnostic, ObjectKey, OriginCookie, RuntimeObject, TypeCatalog};

/// One observed registry call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    Committed(ObjectKey),
    Activated {
        key: ObjectKey,
        origin: Option<OriginCookie>,
    },
    Discarded(ObjectKey),
    MarkedDeleted(ObjectKey),
    Deactivated {
        key: ObjectKey,
        origin: Option<OriginCookie>,
    },
    UnregisteredItem(ObjectKey),
    UnregisteredObject(ObjectKey),
}

#[derive(Debug, Clone)]
struct Item {
    package: String,
    path: NormalizedPath,
}

#[derive(Debug, Default)]
struct State {
    items: BTreeMap<ObjectKey, Item>,
    objects: BTreeMap<ObjectKey, RuntimeObject>,
    deleted: BTreeSet<ObjectKey>,
    /// dependency -> objects depending on it
    dependents: BTreeMap<ObjectKey, BTreeSet<ObjectKey>>,
    events: Vec<RegistryEvent>,
    last_activation: Option<ActivateOptions>,
    fail_commit: BTreeSet<String>,
    fail_activation: BTreeSet<String>,
    filter_on_activation: BTreeSet<String>,
    fail_deactivate: BTreeSet<String>,
}

/// Registry fake backed by maps behind a mutex.
#[derive(Debug)]
pub struct MemoryRegistry {
    catalog: Arc<TypeCatalog>,
    state: Mutex<State>,
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new(Arc::new(TypeCatalog::builtins()))
    }
}

impl MemoryRegistry {
    /// `catalog` is used to rebuild full names from compiled declarations.
    pub fn new(catalog: Arc<TypeCatalog>) -> Self {
        Self {
            catalog,
            state: Mutex::new(State::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Register an already activated object that has no config item.
    pub fn register(&self, object: RuntimeObject) {
        self.state().objects.insert(object.key.clone(), object);
    }

    /// Record that `dependent` depends on `dependency`.
    pub fn add_dependency(&self, dependent: &ObjectKey, dependency: &ObjectKey) {
        self.state()
            .dependents
            .entry(dependency.clone())
            .or_default()
            .insert(dependent.clone());
    }

    pub fn contains(&self, type_name: &str, name: &str) -> bool {
        self.state()
            .objects
            .contains_key(&ObjectKey::new(type_name, name))
    }

    pub fn object_count(&self) -> usize {
        self.state().objects.len()
    }

    pub fn item_count(&self) -> usize {
        self.state().items.len()
    }

    pub fn is_marked_deleted(&self, key: &ObjectKey) -> bool {
        self.state().deleted.contains(key)
    }

    pub fn events(&self) -> Vec<RegistryEvent> {
        self.state().events.clone()
    }

    /// Options passed to the most recent `activate_items` call.
    pub fn last_activation(&self) -> Option<ActivateOptions> {
        self.state().last_activation.clone()
    }

    /// Make committing a declaration with this full name fail.
    pub fn fail_commit_for(&self, name: &str) {
        self.state().fail_commit.insert(name.to_string());
    }

    /// Make activating the item with this full name fail.
    pub fn fail_activation_for(&self, name: &str) {
        self.state().fail_activation.insert(name.to_string());
    }

    /// Silently skip this object during activation, without an error.
    pub fn filter_on_activation(&self, name: &str) {
        self.state().filter_on_activation.insert(name.to_string());
    }

    pub fn fail_deactivate_for(&self, name: &str) {
        self.state().fail_deactivate.insert(name.to_string());
    }
}

impl Registry for MemoryRegistry {
    fn get_object(&self, type_name: &str, name: &str) -> Option<RuntimeObject> {
        self.state()
            .objects
            .get(&ObjectKey::new(type_name, name))
            .cloned()
    }

    fn commit_items(
        &self,
        scope: &mut ActivationScope,
        ignore_on_error: bool,
    ) -> Result<Vec<ObjectKey>, Vec<Diagnostic>> {
        let mut state = self.state();
        let mut accepted: Vec<(ObjectKey, Item)> = Vec::new();
        let mut diagnostics = Vec::new();

        for unit in scope.drain() {
            for declaration in &unit.declarations {
                let full_name = match self.catalog.get(&declaration.type_name) {
                    Some(ty) => ty.compose_name(&declaration.name, &declaration.attributes),
                    None => declaration.name.clone(),
                };
                let key = ObjectKey::new(&declaration.type_name, full_name);

                let problem = if self.catalog.get(&key.type_name).is_none() {
                    Some(format!("Unknown type '{}'", key.type_name))
                } else if state.fail_commit.contains(&key.name) {
                    Some(format!("Validation failed for {key}"))
                } else if state.items.contains_key(&key) || state.objects.contains_key(&key) {
                    Some(format!("{key} already exists"))
                } else {
                    None
                };

                match problem {
                    Some(_) if ignore_on_error && declaration.ignore_on_error => {}
                    Some(message) => diagnostics.push(Diagnostic::new(message)),
                    None => accepted.push((
                        key,
                        Item {
                            package: unit.package.clone(),
                            path: unit.path.clone(),
                        },
                    )),
                }
            }
        }

        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        let mut keys = Vec::with_capacity(accepted.len());
        for (key, item) in accepted {
            state.items.insert(key.clone(), item);
            state.events.push(RegistryEvent::Committed(key.clone()));
            keys.push(key);
        }
        Ok(keys)
    }

    fn activate_items(
        &self,
        items: &[ObjectKey],
        options: &ActivateOptions,
    ) -> Result<(), Vec<Diagnostic>> {
        let mut state = self.state();
        state.last_activation = Some(options.clone());

        let diagnostics: Vec<Diagnostic> = items
            .iter()
            .filter(|key| state.fail_activation.contains(&key.name))
            .map(|key| Diagnostic::new(format!("Activation of {key} failed")))
            .collect();
        if !diagnostics.is_empty() {
            return Err(diagnostics);
        }

        for key in items {
            if state.filter_on_activation.contains(&key.name) {
                continue;
            }
            let Some(item) = state.items.get(key).cloned() else {
                continue;
            };
            let object = RuntimeObject::new(key.clone(), item.package).with_source_path(item.path);
            state.objects.insert(key.clone(), object);
            state.events.push(RegistryEvent::Activated {
                key: key.clone(),
                origin: options.origin.clone(),
            });
        }
        Ok(())
    }

    fn discard_items(&self, items: &[ObjectKey]) {
        let mut state = self.state();
        for key in items {
            state.items.remove(key);
            state.objects.remove(key);
            state.events.push(RegistryEvent::Discarded(key.clone()));
        }
    }

    fn mark_deleted(&self, key: &ObjectKey) {
        let mut state = self.state();
        state.deleted.insert(key.clone());
        state.events.push(RegistryEvent::MarkedDeleted(key.clone()));
    }

    fn deactivate(&self, key: &ObjectKey, origin: Option<&OriginCookie>) -> Result<(), Diagnostic> {
        let mut state = self.state();
        if state.fail_deactivate.contains(&key.name) {
            return Err(Diagnostic::new(format!("Deactivation of {key} failed")));
        }
        state.events.push(RegistryEvent::Deactivated {
            key: key.clone(),
            origin: origin.cloned(),
        });
        Ok(())
    }

    fn has_item(&self, key: &ObjectKey) -> bool {
        self.state().items.contains_key(key)
    }

    fn unregister_item(&self, key: &ObjectKey) {
        let mut state = self.state();
        state.items.remove(key);
        state.objects.remove(key);
        state.events.push(RegistryEvent::UnregisteredItem(key.clone()));
    }

    fn unregister_object(&self, key: &ObjectKey) -> Result<(), Diagnostic> {
        let mut state = self.state();
        if state.objects.remove(key).is_none() {
            return Err(Diagnostic::new(format!("{key} is not registered")));
        }
        state.events.push(RegistryEvent::UnregisteredObject(key.clone()));
        Ok(())
    }
}

impl DependencyGraph for MemoryRegistry {
    fn dependents(&self, key: &ObjectKey) -> Vec<RuntimeObject> {
        let state = self.state();
        state
            .dependents
            .get(key)
            .into_iter()
            .flatten()
            .filter_map(|dependent| state.objects.get(dependent).cloned())
            .collect()
    }
}
