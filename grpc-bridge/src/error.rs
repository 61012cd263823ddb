//! Error types for schema generation.
//!
//! Every variant here is fatal: a run that produces one of these errors
//! produces no schema document at all.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for generation operations.
pub type GenerateResult<T> = Result<T, GenerateError>;

/// Main error type for schema generation.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// A referenced type could not be resolved to a declaration.
    #[error("Type '{qualified_name}' referenced from '{referenced_from}' could not be resolved")]
    UnresolvedReference {
        qualified_name: String,
        referenced_from: String,
    },

    /// A primitive or boxed type name is missing from the scalar tables.
    #[error("Unknown scalar type '{type_name}'")]
    UnknownScalar { type_name: String },

    /// An additional-class key is missing its root separator.
    #[error("Malformed additional class key '{key}': expected '<root>:<qualified name>'")]
    MalformedClassKey { key: String },

    /// Two distinct qualified names could not be given distinct identifiers.
    #[error("Identifier '{identifier}' for '{qualified_name}' collides with '{existing}'")]
    NameCollision {
        identifier: String,
        qualified_name: String,
        existing: String,
    },

    /// An on-demand class could not be loaded.
    #[error("Failed to load class: {0}")]
    Load(#[from] LoadError),
}

/// Error while loading a class definition from a search root.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No class file exists for the qualified name under the root.
    #[error("Class '{qualified_name}' not found at {path}")]
    NotFound {
        qualified_name: String,
        path: PathBuf,
    },

    /// IO error reading the class file.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The class file is not a valid class model.
    #[error("Invalid class definition in {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl GenerateError {
    /// Create an unresolved reference error.
    pub fn unresolved(qualified_name: impl Into<String>, referenced_from: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            qualified_name: qualified_name.into(),
            referenced_from: referenced_from.into(),
        }
    }

    /// Create an unknown scalar error.
    pub fn unknown_scalar(type_name: impl Into<String>) -> Self {
        Self::UnknownScalar {
            type_name: type_name.into(),
        }
    }

    /// Create a malformed key error.
    pub fn malformed_key(key: impl Into<String>) -> Self {
        Self::MalformedClassKey { key: key.into() }
    }
}

impl LoadError {
    /// Create a not found error.
    pub fn not_found(qualified_name: impl Into<String>, path: PathBuf) -> Self {
        Self::NotFound {
            qualified_name: qualified_name.into(),
            path,
        }
    }

    /// Returns true if the class file was missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_message_names_both_sides() {
        let err = GenerateError::unresolved("a.b.Missing", "a.b.Holder");
        let message = err.to_string();
        assert!(message.contains("a.b.Missing"));
        assert!(message.contains("a.b.Holder"));
    }

    #[test]
    fn test_load_error_converts() {
        let err: GenerateError = LoadError::not_found("a.B", PathBuf::from("/r/a/B.json")).into();
        assert!(matches!(err, GenerateError::Load(ref e) if e.is_not_found()));
    }
}
