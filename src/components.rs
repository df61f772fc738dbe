//! Components registry
//!
//! Named, per-category storage of reusable definitions. References of the
//! form `#/components/<category>/<name>` resolve against these tables.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::extendable::{Extendable, KnownFields};
use crate::reference::RefOrSpec;
use crate::spec::{
    Callback, Example, Header, Link, Parameter, PathItem, RequestBody, Response, Schema,
    SecurityScheme,
};

/// One category table: name -> definition or reference
pub type ComponentMap<T> = IndexMap<String, RefOrSpec<T>>;

static COMPONENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9.\-_]+$").expect("component name pattern"));

/// Whether a name is usable as a components key
pub fn is_valid_component_name(name: &str) -> bool {
    COMPONENT_NAME.is_match(name)
}

/// Registry category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Schemas,
    Responses,
    Parameters,
    Examples,
    RequestBodies,
    Headers,
    SecuritySchemes,
    Links,
    Callbacks,
    PathItems,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Schemas,
        Category::Responses,
        Category::Parameters,
        Category::Examples,
        Category::RequestBodies,
        Category::Headers,
        Category::SecuritySchemes,
        Category::Links,
        Category::Callbacks,
        Category::PathItems,
    ];

    /// Key of this category under `components`
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Schemas => "schemas",
            Category::Responses => "responses",
            Category::Parameters => "parameters",
            Category::Examples => "examples",
            Category::RequestBodies => "requestBodies",
            Category::Headers => "headers",
            Category::SecuritySchemes => "securitySchemes",
            Category::Links => "links",
            Category::Callbacks => "callbacks",
            Category::PathItems => "pathItems",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            // `paths` is accepted for path items as well
            "paths" => Ok(Category::PathItems),
            other => Category::ALL
                .into_iter()
                .find(|c| c.as_str() == other)
                .ok_or_else(|| format!("unknown components category '{}'", other)),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A type that lives in one registry category
pub trait Component: Sized {
    const CATEGORY: Category;

    fn table(components: &Components) -> Option<&ComponentMap<Self>>;

    fn table_mut(components: &mut Components) -> &mut ComponentMap<Self>;
}

/// The components object
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<ComponentMap<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responses: Option<ComponentMap<Extendable<Response>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ComponentMap<Extendable<Parameter>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<ComponentMap<Extendable<Example>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_bodies: Option<ComponentMap<Extendable<RequestBody>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<ComponentMap<Extendable<Header>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<ComponentMap<Extendable<SecurityScheme>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<ComponentMap<Extendable<Link>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callbacks: Option<ComponentMap<Extendable<Callback>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_items: Option<ComponentMap<Extendable<PathItem>>>,
}

impl KnownFields for Components {
    const FIELDS: &'static [&'static str] = &[
        "schemas",
        "responses",
        "parameters",
        "examples",
        "requestBodies",
        "headers",
        "securitySchemes",
        "links",
        "callbacks",
        "pathItems",
    ];
}

macro_rules! impl_component {
    ($ty:ty, $category:ident, $field:ident) => {
        impl Component for $ty {
            const CATEGORY: Category = Category::$category;

            fn table(components: &Components) -> Option<&ComponentMap<Self>> {
                components.$field.as_ref()
            }

            fn table_mut(components: &mut Components) -> &mut ComponentMap<Self> {
                components.$field.get_or_insert_with(IndexMap::new)
            }
        }
    };
}

impl_component!(Schema, Schemas, schemas);
impl_component!(Extendable<Response>, Responses, responses);
impl_component!(Extendable<Parameter>, Parameters, parameters);
impl_component!(Extendable<Example>, Examples, examples);
impl_component!(Extendable<RequestBody>, RequestBodies, request_bodies);
impl_component!(Extendable<Header>, Headers, headers);
impl_component!(Extendable<SecurityScheme>, SecuritySchemes, security_schemes);
impl_component!(Extendable<Link>, Links, links);
impl_component!(Extendable<Callback>, Callbacks, callbacks);
impl_component!(Extendable<PathItem>, PathItems, path_items);

impl Components {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition into the table of its category
    ///
    /// Returns the entry previously stored under `name`, if any.
    pub fn add<T: Component>(
        &mut self,
        name: impl Into<String>,
        value: RefOrSpec<T>,
    ) -> Result<Option<RefOrSpec<T>>> {
        let name = name.into();
        if !is_valid_component_name(&name) {
            return Err(Error::InvalidComponentName(name));
        }
        Ok(T::table_mut(self).insert(name, value))
    }

    /// Look up an entry by name, without following references
    pub fn get<T: Component>(&self, name: &str) -> Option<&RefOrSpec<T>> {
        T::table(self)?.get(name)
    }

    /// Names defined in one category, in document order
    pub fn names(&self, category: Category) -> Vec<&str> {
        fn keys<T>(table: &Option<ComponentMap<T>>) -> Vec<&str> {
            table
                .as_ref()
                .map(|t| t.keys().map(String::as_str).collect())
                .unwrap_or_default()
        }

        match category {
            Category::Schemas => keys(&self.schemas),
            Category::Responses => keys(&self.responses),
            Category::Parameters => keys(&self.parameters),
            Category::Examples => keys(&self.examples),
            Category::RequestBodies => keys(&self.request_bodies),
            Category::Headers => keys(&self.headers),
            Category::SecuritySchemes => keys(&self.security_schemes),
            Category::Links => keys(&self.links),
            Category::Callbacks => keys(&self.callbacks),
            Category::PathItems => keys(&self.path_items),
        }
    }

    pub fn contains(&self, category: Category, name: &str) -> bool {
        self.names(category).contains(&name)
    }
}
