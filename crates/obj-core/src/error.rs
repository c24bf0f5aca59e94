//! Error types for obj-core

use std::path::PathBuf;

use obj_model::{Diagnostic, ObjectKey};
use serde::{Deserialize, Serialize};

/// Result type for obj-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification of an [`Error`], stable for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AlreadyExists,
    Path,
    Validation,
    Io,
    Compile,
    Commit,
    Activation,
    Dependency,
    Ownership,
    RepairFailure,
    Config,
}

/// Errors that can occur in obj-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An object with the same type and name is already registered
    #[error("Object '{name}' already exists.")]
    AlreadyExists { type_name: String, name: String },

    /// No usable config file path could be derived
    #[error("Cannot store {type_name} '{name}': {reason}")]
    Path {
        type_name: String,
        name: String,
        reason: String,
    },

    /// Request rejected before any file was written
    #[error("{message}")]
    Validation { message: String },

    /// Compiling the rendered declaration failed
    #[error("Failed to compile {path}: {diagnostic}")]
    Compile { path: String, diagnostic: Diagnostic },

    /// One or more declarations could not be committed
    #[error("Failed to commit config item '{name}'.")]
    Commit {
        name: String,
        diagnostics: Vec<Diagnostic>,
    },

    /// One or more committed items could not be activated
    #[error("Failed to activate config object '{name}'.")]
    Activation {
        name: String,
        diagnostics: Vec<Diagnostic>,
    },

    /// Deactivating or unregistering an object failed
    #[error("Failed to remove {key}: {diagnostic}")]
    Deactivation {
        key: ObjectKey,
        diagnostic: Diagnostic,
    },

    /// The object has live dependents and cascade was not requested
    #[error(
        "Object '{name}' of type '{type_name}' cannot be deleted because other objects depend on it. Use cascading delete to delete it anyway."
    )]
    Dependency { type_name: String, name: String },

    /// Cascade found an object that depends on itself through its dependents
    #[error("Dependency cycle detected while deleting {key}")]
    DependencyCycle { key: ObjectKey },

    /// The object was not created through the managed package
    #[error("Object cannot be deleted because it was not created using the API.")]
    Ownership {
        type_name: String,
        name: String,
        package: String,
    },

    /// Package has no active stage and none could be adopted
    #[error("Cannot repair package '{package}', please check the troubleshooting docs.")]
    RepairFailure { package: String },

    /// Package or stage bookkeeping problem
    #[error("Config package '{package}': {message}")]
    Package { package: String, message: String },

    /// Settings could not be loaded or a collaborator is missing
    #[error("Invalid settings{}: {message}", location(.path))]
    Settings {
        path: Option<PathBuf>,
        message: String,
    },

    /// Filesystem error from obj-fs
    #[error(transparent)]
    Fs(#[from] obj_fs::Error),

    /// Model error from obj-model
    #[error(transparent)]
    Model(#[from] obj_model::Error),
}

fn location(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in {}", p.display()))
        .unwrap_or_default()
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AlreadyExists { .. } => ErrorKind::AlreadyExists,
            Self::Path { .. } => ErrorKind::Path,
            Self::Validation { .. } | Self::Model(_) => ErrorKind::Validation,
            Self::Compile { .. } => ErrorKind::Compile,
            Self::Commit { .. } => ErrorKind::Commit,
            Self::Activation { .. } | Self::Deactivation { .. } => ErrorKind::Activation,
            Self::Dependency { .. } | Self::DependencyCycle { .. } => ErrorKind::Dependency,
            Self::Ownership { .. } => ErrorKind::Ownership,
            Self::RepairFailure { .. } => ErrorKind::RepairFailure,
            Self::Package { .. } | Self::Settings { .. } => ErrorKind::Config,
            Self::Fs(obj_fs::Error::InvalidSegment { .. }) => ErrorKind::Path,
            Self::Fs(_) => ErrorKind::Io,
        }
    }

    /// Whether the operation that hit this error must not be retried
    /// automatically.
    pub fn is_fatal(&self) -> bool {
        self.kind() == ErrorKind::RepairFailure
    }

    /// Per-item diagnostics carried by aggregate errors, or the error itself.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Commit { diagnostics, .. } | Self::Activation { diagnostics, .. }
                if !diagnostics.is_empty() =>
            {
                diagnostics.clone()
            }
            Self::Compile { diagnostic, .. } | Self::Deactivation { diagnostic, .. } => {
                vec![Diagnostic {
                    message: self.to_string(),
                    detail: diagnostic.detail.clone(),
                }]
            }
            _ => vec![Diagnostic::new(self.to_string())],
        }
    }

    /// The error message followed by its source chain.
    pub fn extended(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\ncaused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}
