//! Transactional object creation
//!
//! A create request is rendered to DSL source, staged in a pending file,
//! compiled, committed and activated. The pending file only becomes visible
//! once the registry reports the new object; every failure before that
//! point drops it, so no file is left behind for an object that does not
//! exist.

use obj_fs::PendingWrite;
use obj_model::{AttributeSet, NAME_ATTRIBUTE, ObjectType, OriginCookie};
use serde_json::Value;

use crate::collab::{ActivateOptions, ActivationScope};
use crate::report::OperationReport;
use crate::store::ObjectStore;
use crate::{Error, Result};

/// Attribute stamped with the creation time for replication ordering.
pub const VERSION_ATTRIBUTE: &str = "version";

/// A request to create one object.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub type_name: String,
    /// Full object name, including composite parts (`host1!ping`)
    pub full_name: String,
    pub templates: Vec<String>,
    pub attributes: AttributeSet,
    pub ignore_on_error: bool,
    pub origin: Option<OriginCookie>,
}

impl CreateRequest {
    pub fn new(type_name: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            full_name: full_name.into(),
            templates: Vec::new(),
            attributes: AttributeSet::new(),
            ignore_on_error: false,
            origin: None,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    pub fn with_attributes(mut self, attributes: AttributeSet) -> Self {
        self.attributes.extend(attributes);
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.templates.push(template.into());
        self
    }

    pub fn ignore_on_error(mut self, ignore: bool) -> Self {
        self.ignore_on_error = ignore;
        self
    }

    pub fn with_origin(mut self, origin: OriginCookie) -> Self {
        self.origin = Some(origin);
        self
    }
}

impl ObjectStore {
    /// Create, persist and activate one object.
    ///
    /// Recoverable failures are returned as a failed [`OperationReport`].
    ///
    /// # Errors
    ///
    /// Returns `Err` only for `Error::RepairFailure`, when the managed
    /// package is damaged beyond automatic repair.
    pub fn create_object(&self, request: &CreateRequest) -> Result<OperationReport> {
        match self.run_create(request) {
            Ok(report) => Ok(report),
            Err(err) if err.is_fatal() => {
                tracing::error!(error = %err, "config package needs operator intervention");
                Err(err)
            }
            Err(err) => {
                tracing::debug!(
                    type_name = %request.type_name,
                    name = %request.full_name,
                    kind = ?err.kind(),
                    "create failed: {err}"
                );
                Ok(OperationReport::failed(&err))
            }
        }
    }

    fn run_create(&self, request: &CreateRequest) -> Result<OperationReport> {
        self.ensure_storage()?;

        let object_type = self.object_type(&request.type_name)?;
        let type_name = object_type.name();
        let full_name = request.full_name.as_str();

        if object_type.config_facet().is_none() {
            return Err(Error::validation(format!(
                "Type '{type_name}' cannot be created at runtime."
            )));
        }

        if self.registry.get_object(type_name, full_name).is_some() {
            return Err(Error::AlreadyExists {
                type_name: type_name.to_string(),
                name: full_name.to_string(),
            });
        }

        if full_name.is_empty() {
            return Err(Error::validation("Object name must not be empty."));
        }

        let config_dir = self.config_dir()?;
        let path = self.paths.compute(&config_dir, object_type, full_name)?;

        let mut name_parts = object_type.parse_name(full_name)?;
        validate_attributes(object_type, &request.attributes)?;

        let short_name = match name_parts.remove(NAME_ATTRIBUTE) {
            Some(Value::String(name)) => name,
            _ => full_name.to_string(),
        };

        let mut attributes = request.attributes.clone();
        attributes.extend(name_parts);
        attributes.remove(NAME_ATTRIBUTE);
        attributes.insert(VERSION_ATTRIBUTE.to_string(), Value::from(version_stamp()));

        let mut source = self.renderer.render(
            type_name,
            &short_name,
            &request.templates,
            &attributes,
            request.ignore_on_error,
        );
        source.push('\n');

        let mut pending = PendingWrite::open(&path)?;
        pending.write_all(source.as_bytes())?;
        pending.flush()?;
        tracing::debug!(path = %path, "staged declaration");

        let unit = self
            .compiler
            .compile(&path, &source, self.package())
            .map_err(|diagnostic| Error::Compile {
                path: path.as_str().to_string(),
                diagnostic,
            })?;

        let mut scope = ActivationScope::new();
        scope.evaluate(unit);

        let items = self
            .registry
            .commit_items(&mut scope, request.ignore_on_error)
            .map_err(|diagnostics| {
                tracing::info!(
                    "Failed to commit config item '{full_name}'. Aborting and removing config path '{path}'."
                );
                Error::Commit {
                    name: full_name.to_string(),
                    diagnostics,
                }
            })?;

        let options = ActivateOptions::runtime(request.origin.clone());
        if let Err(diagnostics) = self.registry.activate_items(&items, &options) {
            tracing::info!(
                "Failed to activate config object '{full_name}'. Aborting and removing config path '{path}'."
            );
            self.registry.discard_items(&items);
            return Err(Error::Activation {
                name: full_name.to_string(),
                diagnostics,
            });
        }

        let report = if self.registry.get_object(type_name, full_name).is_some() {
            if let Err(err) = pending.commit() {
                self.registry.discard_items(&items);
                return Err(err.into());
            }

            tracing::info!("Created and activated object '{full_name}' of type '{type_name}'.");
            OperationReport::created()
        } else {
            if let Err(err) = pending.discard() {
                tracing::warn!(path = %path, error = %err, "failed to remove staged declaration");
            }
            self.registry.discard_items(&items);

            let note = format!("Object '{full_name}' was not created but ignored due to errors.");
            tracing::info!("{note}");
            OperationReport::ignored(note)
        };

        if !self.settings.is_authority_exempt(type_name) {
            self.authority.recompute();
        }

        Ok(report)
    }
}

/// Reject keys the caller may not set. Runs to completion before any write.
fn validate_attributes(object_type: &ObjectType, attributes: &AttributeSet) -> Result<()> {
    for key in attributes.keys() {
        let Some(field) = object_type.field_for_path(key) else {
            return Err(Error::validation(format!(
                "Invalid attribute specified: {key}"
            )));
        };

        if !field.assignable || key == NAME_ATTRIBUTE {
            return Err(Error::validation(format!(
                "Attribute is marked for internal use only and may not be set: {key}"
            )));
        }
    }
    Ok(())
}

/// Wall-clock seconds with sub-second precision.
fn version_stamp() -> f64 {
    chrono::Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use obj_model::TypeCatalog;
    use serde_json::json;

    #[test]
    fn builder_collects_request_parts() {
        let request = CreateRequest::new("Service", "host1!ping")
            .with_attribute("check_command", json!("ping4"))
            .with_template("generic-service")
            .ignore_on_error(true)
            .with_origin(OriginCookie::new("node-2"));

        assert_eq!(request.templates, vec!["generic-service"]);
        assert_eq!(request.attributes["check_command"], json!("ping4"));
        assert!(request.ignore_on_error);
        assert_eq!(request.origin.as_ref().map(|o| o.as_str()), Some("node-2"));
    }

    #[test]
    fn validation_rejects_unknown_and_internal_keys() {
        let catalog = TypeCatalog::builtins();
        let host = catalog.get("Host").unwrap();

        let ok = obj_model::attributes([("vars.os", json!("Linux")), ("address", json!("::1"))]);
        assert!(validate_attributes(host, &ok).is_ok());

        let unknown = obj_model::attributes([("bogus", json!(1))]);
        let err = validate_attributes(host, &unknown).unwrap_err();
        assert_eq!(err.to_string(), "Invalid attribute specified: bogus");

        let internal = obj_model::attributes([("state", json!(0))]);
        let err = validate_attributes(host, &internal).unwrap_err();
        assert!(err.to_string().contains("internal use only"));

        let name = obj_model::attributes([("name", json!("x"))]);
        assert!(validate_attributes(host, &name).is_err());
    }

    #[test]
    fn version_stamp_is_recent() {
        let stamp = version_stamp();
        assert!(stamp > 1_600_000_000.0);
    }
}
