//! Responses

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extendable::{is_extension_name, Extendable, KnownFields};
use crate::reference::RefOrSpec;

use super::{Header, Link, MediaType};

/// Status code (or `default`) -> expected response
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Responses {
    pub responses: IndexMap<String, RefOrSpec<Extendable<Response>>>,
}

impl KnownFields for Responses {
    const FIELDS: &'static [&'static str] = &[];

    fn is_known_field(name: &str) -> bool {
        !is_extension_name(name)
    }
}

impl Responses {
    pub const DEFAULT: &'static str = "default";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn default_response(&self) -> Option<&RefOrSpec<Extendable<Response>>> {
        self.responses.get(Self::DEFAULT)
    }

    pub fn add(&mut self, code: impl Into<String>, response: impl Into<RefOrSpec<Extendable<Response>>>) {
        self.responses.insert(code.into(), response.into());
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Response {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, RefOrSpec<Extendable<Header>>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, Extendable<MediaType>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<IndexMap<String, RefOrSpec<Extendable<Link>>>>,
}

impl KnownFields for Response {
    const FIELDS: &'static [&'static str] = &["description", "headers", "content", "links"];
}

impl Response {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }
}
