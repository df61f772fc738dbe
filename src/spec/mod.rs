//! Document object catalogue
//!
//! Inert records for every OpenAPI 3.1 object. Behaviour lives in the core
//! cells ([`crate::Extendable`], [`crate::RefOrSpec`]) and in the
//! validator; these types only carry fields.
//!
//! Field conventions:
//! - every optional field is an `Option`, so present-but-empty values
//!   survive a round trip;
//! - fields the format marks as required are plain `String`s defaulting to
//!   empty, so a missing value is a validation finding rather than a decode
//!   failure;
//! - string enumerations stay strings on the wire, with typed views
//!   (e.g. [`ParameterLocation`]) used by the validator.

mod example;
mod info;
mod media;
mod openapi;
mod operation;
mod parameter;
mod paths;
mod response;
mod schema;
mod security;
mod server;

pub use example::{Example, Link};
pub use info::{Contact, Info, License};
pub use media::{Encoding, MediaType, RequestBody};
pub use openapi::{Document, OpenApi, OPENAPI_VERSION};
pub use operation::{ExternalDocs, Operation, Tag};
pub use parameter::{Header, Parameter, ParameterLocation, ParameterStyle};
pub use paths::{Callback, PathItem, Paths};
pub use response::{Response, Responses};
pub use schema::{Discriminator, Schema, Xml, SCHEMA_TYPES};
pub use security::{
    ApiKeyLocation, OAuthFlow, OAuthFlows, SecurityRequirement, SecurityScheme, SecuritySchemeType,
};
pub use server::{Server, ServerVariable};
