//! Type catalog - builtin types or loaded from TOML
//!
//! # Example TOML
//!
//! ```toml
//! [[types]]
//! name = "Service"
//! plural = "Services"
//! name_components = ["host_name"]
//! assignable = ["host_name", "check_command", "vars"]
//! internal = ["last_check_result"]
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, NameScheme, ObjectType, Result};

/// Serialized form of one type entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
struct TypeDefinition {
    name: String,
    plural: String,
    #[serde(default)]
    name_components: Vec<String>,
    #[serde(default)]
    assignable: Vec<String>,
    #[serde(default)]
    internal: Vec<String>,
    #[serde(default = "default_config_backed")]
    config_backed: bool,
}

fn default_config_backed() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    types: Vec<TypeDefinition>,
}

impl From<TypeDefinition> for ObjectType {
    fn from(def: TypeDefinition) -> Self {
        let mut ty = ObjectType::new(def.name, def.plural)
            .with_assignable(def.assignable)
            .with_internal(def.internal);

        if !def.name_components.is_empty() {
            ty = ty.with_name_scheme(NameScheme::new(def.name_components));
        }
        if !def.config_backed {
            ty = ty.without_config_facet();
        }
        ty
    }
}

/// Known object types by name.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: BTreeMap<String, ObjectType>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog from TOML.
    pub fn from_toml(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let mut catalog = Self::new();
        for def in file.types {
            catalog.insert(def.into());
        }
        Ok(catalog)
    }

    /// Catalog with the monitoring types created at runtime most often.
    pub fn builtins() -> Self {
        let mut catalog = Self::new();

        catalog.insert(
            ObjectType::new("Host", "Hosts")
                .with_assignable([
                    "name",
                    "display_name",
                    "address",
                    "address6",
                    "check_command",
                    "check_interval",
                    "max_check_attempts",
                    "enable_notifications",
                    "groups",
                    "vars",
                    "zone",
                ])
                .with_internal(["last_check_result", "state", "version"]),
        );

        catalog.insert(
            ObjectType::new("Service", "Services")
                .with_assignable([
                    "name",
                    "host_name",
                    "display_name",
                    "check_command",
                    "check_interval",
                    "max_check_attempts",
                    "groups",
                    "vars",
                    "zone",
                ])
                .with_internal(["last_check_result", "state", "version"])
                .with_name_scheme(NameScheme::new(["host_name"])),
        );

        catalog.insert(
            ObjectType::new("Comment", "Comments")
                .with_assignable([
                    "name",
                    "host_name",
                    "service_name",
                    "author",
                    "text",
                    "entry_type",
                    "entry_time",
                    "expire_time",
                    "persistent",
                ])
                .with_internal(["legacy_id", "version"])
                .with_name_scheme(NameScheme::new(["host_name", "service_name"])),
        );

        catalog.insert(
            ObjectType::new("Downtime", "Downtimes")
                .with_assignable([
                    "name",
                    "host_name",
                    "service_name",
                    "author",
                    "comment",
                    "start_time",
                    "end_time",
                    "duration",
                    "fixed",
                    "triggered_by",
                    "scheduled_by",
                    "config_owner",
                ])
                .with_internal(["legacy_id", "was_cancelled", "trigger_time", "version"])
                .with_name_scheme(NameScheme::new(["host_name", "service_name"])),
        );

        catalog.insert(
            ObjectType::new("User", "Users")
                .with_assignable(["name", "display_name", "email", "pager", "groups", "vars"])
                .with_internal(["version"]),
        );

        catalog.insert(
            ObjectType::new("CheckCommand", "CheckCommands")
                .with_assignable(["name", "command", "arguments", "env", "timeout", "vars"])
                .with_internal(["version"]),
        );

        catalog
    }

    pub fn insert(&mut self, ty: ObjectType) {
        self.types.insert(ty.name().to_string(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&ObjectType> {
        self.types.get(name)
    }

    /// Like [`TypeCatalog::get`] but reports unknown names as an error.
    pub fn require(&self, name: &str) -> Result<&ObjectType> {
        self.get(name)
            .ok_or_else(|| Error::UnknownType(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_cover_annotation_kinds() {
        let catalog = TypeCatalog::builtins();
        for name in ["Host", "Service", "Comment", "Downtime", "User", "CheckCommand"] {
            assert!(catalog.get(name).is_some(), "missing builtin {name}");
        }
        assert!(catalog.require("Nope").is_err());
    }

    #[test]
    fn from_toml_builds_types() {
        let catalog = TypeCatalog::from_toml(
            r#"
[[types]]
name = "Service"
plural = "Services"
name_components = ["host_name"]
assignable = ["host_name", "check_command"]
internal = ["last_check_result"]

[[types]]
name = "Zone"
plural = "Zones"
config_backed = false
"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);

        let service = catalog.get("Service").unwrap();
        assert_eq!(service.plural_name(), "Services");
        assert!(service.field("check_command").unwrap().assignable);
        assert!(!service.field("last_check_result").unwrap().assignable);
        assert!(service.name_scheme().is_some());
        assert!(service.config_facet().is_some());

        let zone = catalog.get("Zone").unwrap();
        assert!(zone.config_facet().is_none());
        assert!(zone.name_scheme().is_none());
    }

    #[test]
    fn from_toml_rejects_malformed_input() {
        let result = TypeCatalog::from_toml("[[types]]\nname = 1\n");
        assert!(matches!(result, Err(Error::CatalogParse(_))));
    }
}
