//! Object deletion with optional cascade
//!
//! Dependents are removed before the objects they depend on. The traversal
//! keeps an explicit stack so deep dependency chains cannot exhaust the
//! call stack, and it re-queries dependents when a frame is expanded rather
//! than trusting an earlier snapshot.
//!
//! A cascade is not transactional. When one removal fails the traversal
//! stops and objects removed so far stay removed.

use std::collections::HashSet;

use obj_fs::io;
use obj_model::{ObjectKey, OriginCookie, RuntimeObject};

use crate::path::existing_object_path;
use crate::report::OperationReport;
use crate::store::ObjectStore;
use crate::{Error, Result};

struct Frame {
    object: RuntimeObject,
    expanded: bool,
}

impl ObjectStore {
    /// Delete `object`, and with `cascade` everything that depends on it.
    ///
    /// Only objects created through the managed package may be deleted.
    /// Dependents reached by the cascade are removed regardless of their
    /// package; backing files are removed only for managed ones.
    pub fn delete_object(
        &self,
        object: &RuntimeObject,
        cascade: bool,
        origin: Option<&OriginCookie>,
    ) -> OperationReport {
        match self.run_delete(object, cascade, origin) {
            Ok(()) => OperationReport::deleted(),
            Err(err) => {
                tracing::debug!(
                    object = %object.key,
                    cascade,
                    kind = ?err.kind(),
                    "delete failed: {err}"
                );
                OperationReport::failed(&err)
            }
        }
    }

    fn run_delete(
        &self,
        root: &RuntimeObject,
        cascade: bool,
        origin: Option<&OriginCookie>,
    ) -> Result<()> {
        if root.package != self.package() {
            return Err(Error::Ownership {
                type_name: root.type_name().to_string(),
                name: root.name().to_string(),
                package: root.package.clone(),
            });
        }

        let mut stack = vec![Frame {
            object: root.clone(),
            expanded: false,
        }];
        let mut on_path: HashSet<ObjectKey> = HashSet::new();
        let mut removed: HashSet<ObjectKey> = HashSet::new();

        while let Some(top) = stack.len().checked_sub(1) {
            if stack[top].expanded {
                let Some(frame) = stack.pop() else { break };
                on_path.remove(&frame.object.key);
                self.remove_one(&frame.object, origin)?;
                removed.insert(frame.object.key);
                continue;
            }

            let key = stack[top].object.key.clone();

            // A dependent can be queued twice through different parents.
            let gone = removed.contains(&key)
                || (top > 0 && self.registry.get_object(&key.type_name, &key.name).is_none());
            if gone {
                stack.pop();
                continue;
            }

            stack[top].expanded = true;
            on_path.insert(key.clone());

            let dependents = self.dependencies.dependents(&key);
            if dependents.is_empty() {
                continue;
            }

            if !cascade {
                return Err(Error::Dependency {
                    type_name: key.type_name,
                    name: key.name,
                });
            }

            for dependent in dependents.into_iter().rev() {
                if removed.contains(&dependent.key) {
                    continue;
                }
                if on_path.contains(&dependent.key) {
                    return Err(Error::DependencyCycle { key: dependent.key });
                }
                stack.push(Frame {
                    object: dependent,
                    expanded: false,
                });
            }
        }

        Ok(())
    }

    fn remove_one(&self, object: &RuntimeObject, origin: Option<&OriginCookie>) -> Result<()> {
        let key = &object.key;

        self.registry.mark_deleted(key);
        self.registry
            .deactivate(key, origin)
            .map_err(|diagnostic| Error::Deactivation {
                key: key.clone(),
                diagnostic,
            })?;

        if self.registry.has_item(key) {
            self.registry.unregister_item(key);
        } else {
            self.registry
                .unregister_object(key)
                .map_err(|diagnostic| Error::Deactivation {
                    key: key.clone(),
                    diagnostic,
                })?;
        }

        if object.package == self.package() {
            if let Some(path) = existing_object_path(object) {
                io::remove_file(path)?;
            }
        }

        tracing::info!(
            "Deleted object '{}' of type '{}'.",
            object.name(),
            object.type_name()
        );
        Ok(())
    }
}
