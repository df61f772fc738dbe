//! Document root

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::components::Components;
use crate::error::Result;
use crate::extendable::{Extendable, KnownFields};
use crate::reference::RefOrSpec;
use crate::validation::{ValidationOptions, Validator};

use super::{ExternalDocs, Info, PathItem, Paths, SecurityRequirement, Server, Tag};

/// Version written by [`OpenApi::default`]
pub const OPENAPI_VERSION: &str = "3.1.0";

/// Root object of an API description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApi {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub openapi: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Extendable<Info>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_schema_dialect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Extendable<Server>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Extendable<Paths>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhooks: Option<IndexMap<String, RefOrSpec<Extendable<PathItem>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Extendable<Components>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Extendable<Tag>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Extendable<ExternalDocs>>,
}

impl Default for OpenApi {
    fn default() -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info: None,
            json_schema_dialect: None,
            servers: None,
            paths: None,
            webhooks: None,
            components: None,
            security: None,
            tags: None,
            external_docs: None,
        }
    }
}

impl KnownFields for OpenApi {
    const FIELDS: &'static [&'static str] = &[
        "openapi",
        "info",
        "jsonSchemaDialect",
        "servers",
        "paths",
        "webhooks",
        "components",
        "security",
        "tags",
        "externalDocs",
    ];
}

impl OpenApi {
    /// New 3.1 document with the given info
    pub fn new(info: Info) -> Self {
        Self {
            info: Some(Extendable::new(info)),
            ..Default::default()
        }
    }
}

/// A whole document: the root object plus its top-level extensions
pub type Document = Extendable<OpenApi>;

impl Extendable<OpenApi> {
    pub fn from_json(src: &str) -> Result<Self> {
        codec::from_json(src)
    }

    pub fn from_yaml(src: &str) -> Result<Self> {
        codec::from_yaml(src)
    }

    pub fn to_json(&self) -> Result<String> {
        codec::to_json(self)
    }

    pub fn to_yaml(&self) -> Result<String> {
        codec::to_yaml(self)
    }

    /// The registry references resolve against
    pub fn components(&self) -> Option<&Extendable<Components>> {
        self.spec()?.components.as_ref()
    }

    /// Mutable registry, created on first use
    pub fn components_mut(&mut self) -> &mut Components {
        let root = self.spec.get_or_insert_with(OpenApi::default);
        let envelope = root.components.get_or_insert_with(|| Extendable::new(Components::new()));
        envelope.spec.get_or_insert_with(Components::new)
    }

    /// Validate the document, failing with every finding at once
    pub fn validate(&self, options: ValidationOptions) -> Result<()> {
        Validator::new(self, options).validate().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Category;
    use crate::spec::Schema;
    use crate::Error;

    #[test]
    fn test_build_and_validate() {
        let mut document = Document::new(OpenApi::new(Info::new("Pets", "1.0.0")));
        document
            .components_mut()
            .add("Pet", RefOrSpec::from_spec(Schema::of_type("object")))
            .unwrap();

        assert!(document.components().unwrap().spec().unwrap().contains(Category::Schemas, "Pet"));
        assert!(document.validate(ValidationOptions::default()).is_ok());
    }

    #[test]
    fn test_validate_collects_everything() {
        let document = Document::from_json(r#"{"openapi": "3.1.0", "paths": {"pets": {}}}"#).unwrap();
        match document.validate(ValidationOptions::default()) {
            Err(Error::Validation(errors)) => assert_eq!(errors.len(), 2, "{}", errors),
            other => panic!("Expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_root_extensions_round_trip() {
        let src = r#"{"openapi":"3.1.0","info":{"title":"t","version":"1"},"x-audience":"internal"}"#;
        let document = Document::from_json(src).unwrap();
        assert_eq!(document.extension("x-audience").and_then(|v| v.as_str()), Some("internal"));

        let reparsed: serde_json::Value = serde_json::from_str(&document.to_json().unwrap()).unwrap();
        let original: serde_json::Value = serde_json::from_str(src).unwrap();
        assert_eq!(reparsed, original);
    }
}
