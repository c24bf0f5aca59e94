//! Object handles, compiler output and diagnostics

use std::collections::BTreeMap;
use std::fmt;

use obj_fs::NormalizedPath;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Attribute path (`vars.os`) to value. Ordered so rendered output is
/// deterministic.
pub type AttributeSet = BTreeMap<String, Value>;

/// Identity of a registered object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub type_name: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.type_name, self.name)
    }
}

/// Opaque token naming the cluster node an operation came from.
///
/// Passed through activation and deactivation so replication does not
/// send a change back to the node that made it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OriginCookie(String);

impl OriginCookie {
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of an activated object as reported by the registry.
///
/// The registry owns the live instance; this is a reference to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeObject {
    pub key: ObjectKey,
    /// Config package the object was loaded from
    pub package: String,
    /// File the object's declaration was compiled from, if any
    pub source_path: Option<NormalizedPath>,
}

impl RuntimeObject {
    pub fn new(key: ObjectKey, package: impl Into<String>) -> Self {
        Self {
            key,
            package: package.into(),
            source_path: None,
        }
    }

    pub fn with_source_path(mut self, path: NormalizedPath) -> Self {
        self.source_path = Some(path);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.key.type_name
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }
}

/// One object declaration produced by compiling rendered source.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub type_name: String,
    /// Short name as written in the source; composite names are rebuilt by
    /// the registry from the name scheme
    pub name: String,
    pub templates: Vec<String>,
    pub attributes: AttributeSet,
    pub ignore_on_error: bool,
}

/// Output of compiling one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledUnit {
    pub path: NormalizedPath,
    /// Package the source belongs to
    pub package: String,
    pub declarations: Vec<Declaration>,
}

/// A reportable problem with a short message and optional extended detail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<String> for Diagnostic {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for Diagnostic {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

/// Convenience for building attribute sets in callers and tests.
pub fn attributes<I, K>(pairs: I) -> AttributeSet
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
