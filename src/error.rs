//! Error types for the document model

use thiserror::Error;

use crate::components::Category;
use crate::validation::ValidationErrors;

/// Result type for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Document model errors
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot decode {type_name}{}: {message}", at_path(.path))]
    Decode {
        type_name: String,
        path: String,
        message: String,
    },

    #[error("cannot encode document: {0}")]
    Encode(String),

    #[error("spec not found: reference cell holds neither a $ref nor a value")]
    SpecNotFound,

    #[error("external references are not supported: {0}")]
    UnsupportedReference(String),

    #[error("components are required to resolve references")]
    ComponentsRequired,

    #[error("reference not found: {reference}")]
    NotFound { reference: String },

    #[error("cycle detected at {reference} (chain: {})", .chain.join(" -> "))]
    CycleDetected { reference: String, chain: Vec<String> },

    #[error("reference {reference} points to {found}, expected {expected}")]
    UnexpectedComponentType {
        reference: String,
        expected: Category,
        found: Category,
    },

    #[error("invalid component name: '{0}'")]
    InvalidComponentName(String),

    #[error("{0}")]
    Validation(ValidationErrors),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

fn at_path(path: &str) -> String {
    if path.is_empty() || path == "." {
        String::new()
    } else {
        format!(" at {}", path)
    }
}

impl Error {
    /// Whether this error came out of reference resolution
    pub fn is_resolution(&self) -> bool {
        matches!(
            self,
            Error::SpecNotFound
                | Error::UnsupportedReference(_)
                | Error::ComponentsRequired
                | Error::NotFound { .. }
                | Error::CycleDetected { .. }
                | Error::UnexpectedComponentType { .. }
        )
    }
}
