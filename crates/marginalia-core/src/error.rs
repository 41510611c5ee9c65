//! Error types for the Marginalia application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Marginalia application.
///
/// Variants follow the failure taxonomy the UI reacts to: `NotFound` aborts a
/// navigation, `TransientPersistence` triggers reload-truth recovery in the
/// annotation store, and `Validation` is raised before any network call.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MarginaliaError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Network failure, timeout or rejected write against a persistence service
    #[error("Persistence failure: {0}")]
    TransientPersistence(String),

    /// Input rejected before reaching any service
    #[error("Validation failed: {0}")]
    Validation(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform clipboard could not be used
    #[error("Clipboard unavailable: {0}")]
    ClipboardUnavailable(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarginaliaError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a TransientPersistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::TransientPersistence(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a persistence failure
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientPersistence(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Message suitable for a toast or alert.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound { entity_type, .. } => format!("The requested {entity_type} could not be found."),
            Self::TransientPersistence(_) => {
                "Your change could not be saved. The latest saved state has been restored."
                    .to_string()
            }
            Self::Validation(message) => message.clone(),
            Self::ClipboardUnavailable(_) => "Copy failed.".to_string(),
            _ => "Something went wrong.".to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for MarginaliaError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MarginaliaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MarginaliaError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MarginaliaError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error at crate boundaries
impl From<anyhow::Error> for MarginaliaError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, MarginaliaError>`.
pub type Result<T> = std::result::Result<T, MarginaliaError>;
