//! OpenAPI Document Model
//!
//! A typed, lossless in-memory model of OpenAPI 3.1 documents with a
//! reference-resolving semantic validator.
//!
//! ## Features
//!
//! - **Lossless extensions**: every object travels in an [`Extendable`]
//!   envelope that keeps fields its type does not declare
//! - **References**: [`RefOrSpec`] cells hold either a `$ref` or an inline
//!   value and resolve through the [`Components`] registry with cycle detection
//! - **JSON and YAML**: both decode through the same tree and re-encode
//!   without losing fields
//! - **Validation**: [`Validator`] collects every finding with its document path
//!
//! ## Example
//!
//! ```no_run
//! use openapi_model::{Document, ValidationOptions};
//!
//! let src = std::fs::read_to_string("petstore.yaml")?;
//! let document = Document::from_yaml(&src)?;
//!
//! if let Err(err) = document.validate(ValidationOptions::default()) {
//!     eprintln!("{}", err);
//! }
//! println!("{}", document.to_json()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bool_or_schema;
pub mod codec;
pub mod components;
pub mod config;
pub mod error;
pub mod extendable;
pub mod reference;
pub mod single_or_array;
pub mod spec;
pub mod validation;

pub use bool_or_schema::BoolOrSchema;
pub use codec::Format;
pub use components::{Category, Component, ComponentMap, Components};
pub use config::Settings;
pub use error::{Error, Result};
pub use extendable::{Extendable, Extensions, KnownFields, EXTENSION_PREFIX};
pub use reference::{ComponentRef, Ref, RefOrSpec};
pub use single_or_array::SingleOrArray;
pub use spec::*;
pub use validation::{ValidationCode, ValidationError, ValidationErrors, ValidationOptions, Validator};
