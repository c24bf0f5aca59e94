//! Reflection data for object types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{AttributeSet, Error, Result};

/// Synthetic attribute holding the short object name. Never externally
/// assignable.
pub const NAME_ATTRIBUTE: &str = "name";

/// Separator between components of a composite name (`host!service`).
const NAME_SEPARATOR: char = '!';

/// A single field of an object type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name (the first component of a dotted attribute path)
    pub name: String,
    /// Whether callers may set this field when creating an object
    #[serde(default)]
    pub assignable: bool,
}

impl FieldDescriptor {
    pub fn assignable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assignable: true,
        }
    }

    pub fn internal(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            assignable: false,
        }
    }
}

/// Composite-name scheme such as `host!service` for services.
///
/// `components` names the attributes filled from the leading tokens; the
/// last token always becomes [`NAME_ATTRIBUTE`]. The first component is
/// required, later ones are optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameScheme {
    pub components: Vec<String>,
}

impl NameScheme {
    pub fn new<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            components: components.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a full name into its component attributes plus `name`.
    pub fn parse(&self, type_name: &str, full_name: &str) -> Result<AttributeSet> {
        let tokens: Vec<&str> = full_name.split(NAME_SEPARATOR).collect();
        let max_tokens = self.components.len() + 1;

        if tokens.len() < 2 || tokens.len() > max_tokens {
            return Err(Error::InvalidName {
                type_name: type_name.to_string(),
                name: full_name.to_string(),
                reason: format!(
                    "expected between 2 and {max_tokens} '{NAME_SEPARATOR}'-separated parts, got {}",
                    tokens.len()
                ),
            });
        }

        if let Some(empty) = tokens.iter().position(|t| t.is_empty()) {
            return Err(Error::InvalidName {
                type_name: type_name.to_string(),
                name: full_name.to_string(),
                reason: format!("part {} is empty", empty + 1),
            });
        }

        let (last, leading) = tokens.split_last().ok_or_else(|| Error::InvalidName {
            type_name: type_name.to_string(),
            name: full_name.to_string(),
            reason: "name is empty".to_string(),
        })?;

        let mut parts: AttributeSet = self
            .components
            .iter()
            .zip(leading.iter())
            .map(|(component, token)| (component.clone(), Value::String((*token).to_string())))
            .collect();
        parts.insert(NAME_ATTRIBUTE.to_string(), Value::String((*last).to_string()));

        Ok(parts)
    }

    /// Rebuild the full name from a short name and the component
    /// attributes. Missing or non-string components are skipped.
    pub fn compose(&self, short_name: &str, attributes: &AttributeSet) -> String {
        let mut full = String::new();

        for component in &self.components {
            if let Some(Value::String(part)) = attributes.get(component) {
                if !part.is_empty() {
                    full.push_str(part);
                    full.push(NAME_SEPARATOR);
                }
            }
        }

        full.push_str(short_name);
        full
    }
}

/// Marker facet: objects of this type are backed by config declarations and
/// can be looked up by name in the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfigFacet;

/// Reflection data for one kind of object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    name: String,
    plural_name: String,
    fields: Vec<FieldDescriptor>,
    name_scheme: Option<NameScheme>,
    config: Option<ConfigFacet>,
}

impl ObjectType {
    /// Create a config-backed type with no fields.
    pub fn new(name: impl Into<String>, plural_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plural_name: plural_name.into(),
            fields: Vec::new(),
            name_scheme: None,
            config: Some(ConfigFacet),
        }
    }

    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Add several assignable fields at once.
    pub fn with_assignable<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .extend(names.into_iter().map(FieldDescriptor::assignable));
        self
    }

    /// Add several internal (not externally assignable) fields at once.
    pub fn with_internal<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields
            .extend(names.into_iter().map(FieldDescriptor::internal));
        self
    }

    pub fn with_name_scheme(mut self, scheme: NameScheme) -> Self {
        self.name_scheme = Some(scheme);
        self
    }

    /// Drop the config facet, e.g. for purely runtime types.
    pub fn without_config_facet(mut self) -> Self {
        self.config = None;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plural_name(&self) -> &str {
        &self.plural_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by exact name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Look up the field an attribute path (`vars.os`) targets.
    pub fn field_for_path(&self, path: &str) -> Option<&FieldDescriptor> {
        let head = path.split('.').next().unwrap_or(path);
        self.field(head)
    }

    pub fn name_scheme(&self) -> Option<&NameScheme> {
        self.name_scheme.as_ref()
    }

    pub fn config_facet(&self) -> Option<&ConfigFacet> {
        self.config.as_ref()
    }

    /// Split `full_name` according to the type's name scheme.
    ///
    /// Types without a scheme yield only the `name` attribute.
    pub fn parse_name(&self, full_name: &str) -> Result<AttributeSet> {
        match &self.name_scheme {
            Some(scheme) => scheme.parse(&self.name, full_name),
            None => Ok(AttributeSet::from([(
                NAME_ATTRIBUTE.to_string(),
                Value::String(full_name.to_string()),
            )])),
        }
    }

    /// Full registry name for a declaration of this type.
    pub fn compose_name(&self, short_name: &str, attributes: &AttributeSet) -> String {
        match &self.name_scheme {
            Some(scheme) => scheme.compose(short_name, attributes),
            None => short_name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn service() -> ObjectType {
        ObjectType::new("Service", "Services")
            .with_assignable(["host_name", "check_command"])
            .with_name_scheme(NameScheme::new(["host_name"]))
    }

    fn downtime() -> ObjectType {
        ObjectType::new("Downtime", "Downtimes")
            .with_name_scheme(NameScheme::new(["host_name", "service_name"]))
    }

    #[test]
    fn parse_two_part_service_name() {
        let parts = service().parse_name("host1!ping").unwrap();
        assert_eq!(parts["host_name"], json!("host1"));
        assert_eq!(parts["name"], json!("ping"));
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn parse_rejects_wrong_part_count() {
        assert!(service().parse_name("ping").is_err());
        assert!(service().parse_name("a!b!c").is_err());
        assert!(service().parse_name("host1!").is_err());
    }

    #[test]
    fn parse_optional_middle_component() {
        let host_level = downtime().parse_name("web!maint-1").unwrap();
        assert_eq!(host_level["host_name"], json!("web"));
        assert!(!host_level.contains_key("service_name"));
        assert_eq!(host_level["name"], json!("maint-1"));

        let service_level = downtime().parse_name("web!http!maint-2").unwrap();
        assert_eq!(service_level["service_name"], json!("http"));
        assert_eq!(service_level["name"], json!("maint-2"));
    }

    #[test]
    fn compose_inverts_parse() {
        let ty = downtime();
        for full in ["web!maint-1", "web!http!maint-2"] {
            let parts = ty.parse_name(full).unwrap();
            let short = parts["name"].as_str().unwrap();
            assert_eq!(ty.compose_name(short, &parts), full);
        }
    }

    #[test]
    fn plain_type_keeps_full_name() {
        let host = ObjectType::new("Host", "Hosts");
        let parts = host.parse_name("a!b").unwrap();
        assert_eq!(parts["name"], json!("a!b"));
        assert_eq!(host.compose_name("a!b", &parts), "a!b");
    }

    #[test]
    fn field_for_dotted_path_uses_head() {
        let host = ObjectType::new("Host", "Hosts").with_assignable(["vars"]);
        assert!(host.field_for_path("vars.os").is_some());
        assert!(host.field_for_path("variables.os").is_none());
    }

    #[test]
    fn config_facet_presence() {
        assert!(service().config_facet().is_some());
        assert!(service().without_config_facet().config_facet().is_none());
    }
}
