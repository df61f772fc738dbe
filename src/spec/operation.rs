//! Operations, tags and external documentation

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extendable::{Extendable, KnownFields};
use crate::reference::RefOrSpec;

use super::{Callback, Parameter, RequestBody, Responses, SecurityRequirement, Server};

/// A single API operation on a path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Extendable<ExternalDocs>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOrSpec<Extendable<Parameter>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RefOrSpec<Extendable<RequestBody>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<Extendable<Responses>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<IndexMap<String, RefOrSpec<Extendable<Callback>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<SecurityRequirement>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Extendable<Server>>>,
}

impl KnownFields for Operation {
    const FIELDS: &'static [&'static str] = &[
        "tags",
        "summary",
        "description",
        "externalDocs",
        "operationId",
        "parameters",
        "requestBody",
        "responses",
        "callbacks",
        "deprecated",
        "security",
        "servers",
    ];
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExternalDocs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

impl KnownFields for ExternalDocs {
    const FIELDS: &'static [&'static str] = &["description", "url"];
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Extendable<ExternalDocs>>,
}

impl KnownFields for Tag {
    const FIELDS: &'static [&'static str] = &["name", "description", "externalDocs"];
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}
