//! Request bodies, media types and encodings

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::extendable::{Extendable, KnownFields};
use crate::reference::RefOrSpec;

use super::{Example, Header, Schema};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, Extendable<MediaType>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
}

impl KnownFields for RequestBody {
    const FIELDS: &'static [&'static str] = &["description", "content", "required"];
}

/// Schema and examples for one media type
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<RefOrSpec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<IndexMap<String, RefOrSpec<Extendable<Example>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<IndexMap<String, Extendable<Encoding>>>,
}

impl KnownFields for MediaType {
    const FIELDS: &'static [&'static str] = &["schema", "example", "examples", "encoding"];
}

impl MediaType {
    pub fn with_schema(schema: impl Into<RefOrSpec<Schema>>) -> Self {
        Self {
            schema: Some(schema.into()),
            ..Default::default()
        }
    }
}

/// Encoding of a single schema property
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, RefOrSpec<Extendable<Header>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_reserved: Option<bool>,
}

impl KnownFields for Encoding {
    const FIELDS: &'static [&'static str] = &[
        "contentType",
        "headers",
        "style",
        "explode",
        "allowReserved",
    ];
}
