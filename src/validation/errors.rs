//! Validation findings
//!
//! Every rule violation becomes one [`ValidationError`] tagged with the
//! document path it was found at. A run collects all of them into a
//! [`ValidationErrors`] collection instead of stopping at the first one.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Validation Codes
// =============================================================================

/// Code categorizing a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationCode {
    // === Structure ===
    /// A required field is absent or empty
    MissingField,
    /// A field holds a value outside its allowed set
    InvalidValue,
    /// Two fields that exclude each other are both set
    MutuallyExclusive,
    /// A field is present but has no effect
    IgnoredField,
    /// Extension field without the `x-` prefix
    ExtensionPrefix,

    // === Formats ===
    /// `openapi` is not a 3.x semantic version
    InvalidVersion,
    /// Not a valid URL
    InvalidUrl,
    /// Not a valid email address
    InvalidEmail,
    /// Not a valid regular expression
    InvalidRegex,

    // === Uniqueness ===
    /// `operationId` used by more than one operation
    DuplicateOperationId,
    /// Tag declared more than once
    DuplicateTag,
    /// Parameter repeated with the same name and location
    DuplicateParameter,
    /// Templated paths with the same shape
    DuplicatePath,

    // === Cross references ===
    /// Operation uses a tag missing from the top-level list
    UndefinedTag,
    /// Template variable without a matching path parameter
    UndeclaredPathParameter,
    /// Security requirement names an unknown scheme
    UndefinedSecurityScheme,
    /// `$ref` could not be resolved
    UnresolvedReference,
    /// Components key outside the allowed alphabet
    InvalidComponentName,

    // === Operations ===
    /// Path key does not start with `/`
    InvalidPath,
    /// Request body on a method that has no body semantics
    RequestBodyNotAllowed,
    /// Responses key is neither `default` nor a status code pattern
    InvalidResponseCode,

    // === Schemas ===
    /// Contradictory or out-of-range schema keywords
    InvalidSchema,
    /// Example value does not match its schema
    ExampleMismatch,
    /// Default value does not match its schema
    DefaultMismatch,

    // === Limits ===
    /// Nesting deeper than the configured maximum
    MaxDepthExceeded,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingField => "E001",
            Self::InvalidValue => "E002",
            Self::MutuallyExclusive => "E003",
            Self::IgnoredField => "W001",
            Self::ExtensionPrefix => "E004",
            Self::InvalidVersion => "E005",
            Self::InvalidUrl => "E006",
            Self::InvalidEmail => "E007",
            Self::InvalidRegex => "E008",
            Self::DuplicateOperationId => "E009",
            Self::DuplicateTag => "E010",
            Self::DuplicateParameter => "E011",
            Self::DuplicatePath => "E012",
            Self::UndefinedTag => "E013",
            Self::UndeclaredPathParameter => "E014",
            Self::UndefinedSecurityScheme => "E015",
            Self::UnresolvedReference => "E016",
            Self::InvalidComponentName => "E017",
            Self::InvalidPath => "E018",
            Self::RequestBodyNotAllowed => "E019",
            Self::InvalidResponseCode => "E020",
            Self::InvalidSchema => "E021",
            Self::ExampleMismatch => "E022",
            Self::DefaultMismatch => "E023",
            Self::MaxDepthExceeded => "E024",
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Document path, e.g. `paths./pets.get.parameters[0].schema`
    pub path: String,
    pub code: ValidationCode,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "<root>" } else { &self.path };
        write!(f, "[{}] {}: {}", self.code, path, self.message)
    }
}

// =============================================================================
// Collection
// =============================================================================

/// All findings of one validation run, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors {
    items: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: ValidationError) {
        self.items.push(item);
    }

    /// Record a finding
    pub fn error(&mut self, path: impl Into<String>, code: ValidationCode, message: impl Into<String>) {
        self.push(ValidationError::new(path, code, message));
    }

    pub fn all(&self) -> &[ValidationError] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Findings carrying the given code
    pub fn with_code(&self, code: ValidationCode) -> impl Iterator<Item = &ValidationError> {
        self.items.iter().filter(move |e| e.code == code)
    }

    pub fn has_code(&self, code: ValidationCode) -> bool {
        self.with_code(code).next().is_some()
    }

    /// Findings reported at exactly this path
    pub fn at_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.items.iter().filter(move |e| e.path == path)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        self.items.extend(other.items);
    }

    /// `Ok` when nothing was found
    pub fn into_result(self) -> crate::Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(crate::Error::Validation(self))
        }
    }

    /// Format all findings, one per line, followed by a count
    pub fn format_all(&self) -> String {
        let mut output = String::new();

        for item in &self.items {
            output.push_str(&format!("{}\n", item));
        }
        if !self.is_empty() {
            output.push_str(&format!("{} error(s)", self.len()));
        }

        output
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_all())
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
