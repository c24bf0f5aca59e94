//! Error types for obj-model

/// Result type for obj-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in obj-model operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A composite name does not fit the type's name scheme.
    #[error("Invalid {type_name} name '{name}': {reason}")]
    InvalidName {
        type_name: String,
        name: String,
        reason: String,
    },

    /// Type is not present in the catalog.
    #[error("Unknown object type: {0}")]
    UnknownType(String),

    /// Failed to parse a TOML type catalog.
    #[error("Failed to parse type catalog: {0}")]
    CatalogParse(#[from] toml::de::Error),
}
