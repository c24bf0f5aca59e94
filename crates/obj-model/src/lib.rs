//! Data model for runtime-created configuration objects
//!
//! - [`ObjectType`]: reflection data for a kind of object (fields, plural
//!   name, composite-name scheme, config facet)
//! - [`TypeCatalog`]: the set of known types, builtin or loaded from TOML
//! - [`RuntimeObject`] / [`ObjectKey`]: handles to activated objects
//! - [`Declaration`] / [`CompiledUnit`]: compiler output fed to the registry

pub mod catalog;
pub mod error;
pub mod object;
pub mod types;

pub use catalog::TypeCatalog;
pub use error::{Error, Result};
pub use object::{
    AttributeSet, CompiledUnit, Declaration, Diagnostic, ObjectKey, OriginCookie, RuntimeObject,
    attributes,
};
pub use types::{ConfigFacet, FieldDescriptor, NAME_ATTRIBUTE, NameScheme, ObjectType};
