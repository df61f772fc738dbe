//! Reference-or-value cells
//!
//! Almost every position in a document may hold either an inline object or
//! a `$ref` to a reusable definition in the components registry.
//! [`RefOrSpec<T>`] models that choice and knows how to follow a reference
//! chain through the registry, failing closed on cycles.

use std::fmt;

use indexmap::IndexSet;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::codec;
use crate::components::{Category, Component, Components};
use crate::error::{Error, Result};
use crate::extendable::Extendable;

/// A `$ref` pointer with optional overriding summary and description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "$ref")]
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Ref {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            summary: None,
            description: None,
        }
    }

    /// Reference to a named entry of the components registry
    pub fn component(category: Category, name: &str) -> Self {
        Self::new(ComponentRef::new(category, name).to_string())
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

impl From<&str> for Ref {
    fn from(reference: &str) -> Self {
        Self::new(reference)
    }
}

impl From<String> for Ref {
    fn from(reference: String) -> Self {
        Self::new(reference)
    }
}

/// A parsed `#/components/<category>/<name>` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentRef {
    pub category: Category,
    pub name: String,
}

impl ComponentRef {
    pub const PREFIX: &'static str = "#/components/";

    pub fn new(category: Category, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
        }
    }

    /// Parse an identifier; anything outside the internal grammar is unsupported
    pub fn parse(reference: &str) -> Result<Self> {
        let unsupported = || Error::UnsupportedReference(reference.to_string());

        let rest = reference.strip_prefix(Self::PREFIX).ok_or_else(unsupported)?;
        let (category, name) = rest.split_once('/').ok_or_else(unsupported)?;
        if name.is_empty() || name.contains('/') {
            return Err(unsupported());
        }
        let category = category.parse::<Category>().map_err(|_| unsupported())?;

        Ok(Self {
            category,
            name: unescape_pointer(name),
        })
    }
}

impl fmt::Display for ComponentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}/{}",
            Self::PREFIX,
            self.category.as_str(),
            escape_pointer(&self.name)
        )
    }
}

fn unescape_pointer(token: &str) -> String {
    token.replace("~1", "/").replace("~0", "~")
}

fn escape_pointer(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// Either a `$ref` or an inline value, never both
///
/// When both are supplied at construction the reference wins and the value
/// is dropped, so the cell always encodes as exactly what it resolves
/// through. A cell with neither encodes as `null`.
#[derive(Debug, Clone, PartialEq)]
pub struct RefOrSpec<T> {
    reference: Option<Ref>,
    spec: Option<Box<T>>,
}

impl<T> Default for RefOrSpec<T> {
    fn default() -> Self {
        Self {
            reference: None,
            spec: None,
        }
    }
}

impl<T> From<T> for RefOrSpec<T> {
    fn from(spec: T) -> Self {
        Self::from_spec(spec)
    }
}

impl<T> RefOrSpec<T> {
    pub fn new(reference: Option<Ref>, spec: Option<T>) -> Self {
        match reference {
            Some(reference) => Self::from_ref(reference),
            None => Self {
                reference: None,
                spec: spec.map(Box::new),
            },
        }
    }

    pub fn from_ref(reference: impl Into<Ref>) -> Self {
        Self {
            reference: Some(reference.into()),
            spec: None,
        }
    }

    pub fn from_spec(spec: T) -> Self {
        Self {
            reference: None,
            spec: Some(Box::new(spec)),
        }
    }

    pub fn get_ref(&self) -> Option<&Ref> {
        self.reference.as_ref()
    }

    /// The inline value, without following references
    pub fn get_spec(&self) -> Option<&T> {
        self.spec.as_deref()
    }

    pub fn spec_mut(&mut self) -> Option<&mut T> {
        self.spec.as_deref_mut()
    }

    pub fn is_ref(&self) -> bool {
        self.reference.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.reference.is_none() && self.spec.is_none()
    }

    /// Replace the contents with a reference
    pub fn set_ref(&mut self, reference: impl Into<Ref>) {
        self.reference = Some(reference.into());
        self.spec = None;
    }

    /// Replace the contents with an inline value
    pub fn set_spec(&mut self, spec: T) {
        self.reference = None;
        self.spec = Some(Box::new(spec));
    }
}

impl<T: Component> RefOrSpec<T> {
    /// Resolve to a concrete value, following references through `components`
    pub fn resolve<'a>(&'a self, components: Option<&'a Extendable<Components>>) -> Result<&'a T> {
        let mut visited = IndexSet::new();
        self.resolve_with(components, &mut visited)
    }

    /// Resolve with a caller-supplied visited-set
    ///
    /// Every identifier followed is recorded in `visited`; meeting one that
    /// is already there fails with [`Error::CycleDetected`].
    pub fn resolve_with<'a>(
        &'a self,
        components: Option<&'a Extendable<Components>>,
        visited: &mut IndexSet<String>,
    ) -> Result<&'a T> {
        if let Some(spec) = self.spec.as_deref() {
            return Ok(spec);
        }
        let reference = match &self.reference {
            Some(r) => r.reference.as_str(),
            None => return Err(Error::SpecNotFound),
        };

        let target = ComponentRef::parse(reference)?;
        if target.category != T::CATEGORY {
            return Err(Error::UnexpectedComponentType {
                reference: reference.to_string(),
                expected: T::CATEGORY,
                found: target.category,
            });
        }

        let registry = components
            .and_then(Extendable::spec)
            .ok_or(Error::ComponentsRequired)?;

        let key = target.to_string();
        if visited.contains(&key) {
            let mut chain: Vec<String> = visited.iter().cloned().collect();
            chain.push(key);
            return Err(Error::CycleDetected {
                reference: reference.to_string(),
                chain,
            });
        }
        visited.insert(key);
        trace!(reference, hops = visited.len(), "following reference");

        let entry = T::table(registry)
            .ok_or(Error::ComponentsRequired)?
            .get(&target.name)
            .ok_or_else(|| Error::NotFound {
                reference: reference.to_string(),
            })?;

        entry.resolve_with(components, visited)
    }
}

fn is_reference(raw: &Value) -> bool {
    raw.get("$ref")
        .and_then(Value::as_str)
        .map_or(false, |r| !r.is_empty())
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for RefOrSpec<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;

        if raw.is_null() {
            return Ok(Self::default());
        }
        if is_reference(&raw) {
            let reference = codec::from_value::<Ref>(raw).map_err(de::Error::custom)?;
            return Ok(Self::from_ref(reference));
        }

        let spec = codec::from_value::<T>(raw).map_err(de::Error::custom)?;
        Ok(Self::from_spec(spec))
    }
}

impl<T: Serialize> Serialize for RefOrSpec<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match (&self.reference, &self.spec) {
            (Some(reference), _) => reference.serialize(serializer),
            (None, Some(spec)) => spec.serialize(serializer),
            (None, None) => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Parameter, Schema};
    use serde_json::json;

    fn registry(schemas: Vec<(&str, RefOrSpec<Schema>)>) -> Extendable<Components> {
        let mut components = Components::default();
        for (name, schema) in schemas {
            components.add(name, schema).unwrap();
        }
        Extendable::new(components)
    }

    fn titled(title: &str) -> Schema {
        Schema {
            title: Some(title.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_component_ref() {
        let parsed = ComponentRef::parse("#/components/schemas/Pet").unwrap();
        assert_eq!(parsed.category, Category::Schemas);
        assert_eq!(parsed.name, "Pet");

        let escaped = ComponentRef::parse("#/components/pathItems/a~1b~0c").unwrap();
        assert_eq!(escaped.category, Category::PathItems);
        assert_eq!(escaped.name, "a/b~c");
        assert_eq!(escaped.to_string(), "#/components/pathItems/a~1b~0c");
    }

    #[test]
    fn test_parse_rejects_external_refs() {
        for reference in [
            "https://example.com/pet.json",
            "pet.yaml#/Pet",
            "#/definitions/Pet",
            "#/components/widgets/Pet",
            "#/components/schemas/",
            "#/components/schemas/Pet/properties/name",
        ] {
            assert!(
                matches!(ComponentRef::parse(reference), Err(Error::UnsupportedReference(_))),
                "{} should be unsupported",
                reference
            );
        }
    }

    #[test]
    fn test_decode_prefers_reference() {
        let cell: RefOrSpec<Schema> =
            serde_json::from_value(json!({"$ref": "#/components/schemas/Pet", "description": "a pet"})).unwrap();
        assert!(cell.is_ref());
        assert!(cell.get_spec().is_none());
        assert_eq!(cell.get_ref().unwrap().description.as_deref(), Some("a pet"));
    }

    #[test]
    fn test_empty_ref_decodes_as_value() {
        let cell: RefOrSpec<Schema> = serde_json::from_value(json!({"$ref": "", "title": "x"})).unwrap();
        assert!(!cell.is_ref());
        assert_eq!(cell.get_spec().unwrap().title.as_deref(), Some("x"));
    }

    #[test]
    fn test_reference_precedence_on_encode() {
        let both = RefOrSpec::new(Some(Ref::new("#/components/schemas/Pet")), Some(titled("anything")));
        let only_ref = RefOrSpec::<Schema>::from_ref("#/components/schemas/Pet");
        assert_eq!(
            serde_json::to_value(&both).unwrap(),
            serde_json::to_value(&only_ref).unwrap()
        );
        assert_eq!(
            serde_json::to_value(&both).unwrap(),
            json!({"$ref": "#/components/schemas/Pet"})
        );
    }

    #[test]
    fn test_empty_cell_encodes_null() {
        let cell = RefOrSpec::<Schema>::default();
        assert!(cell.is_empty());
        assert_eq!(serde_json::to_value(&cell).unwrap(), Value::Null);
        assert!(matches!(cell.resolve(None), Err(Error::SpecNotFound)));
    }

    #[test]
    fn test_resolve_chain() {
        let components = registry(vec![
            ("Pet", RefOrSpec::from_ref("#/components/schemas/Pet2")),
            ("Pet2", RefOrSpec::from_spec(titled("foo"))),
        ]);

        let cell = RefOrSpec::<Schema>::from_ref("#/components/schemas/Pet");
        let resolved = cell.resolve(Some(&components)).unwrap();
        assert_eq!(resolved.title.as_deref(), Some("foo"));
    }

    #[test]
    fn test_resolve_inline_needs_no_registry() {
        let cell = RefOrSpec::from_spec(titled("inline"));
        assert_eq!(cell.resolve(None).unwrap().title.as_deref(), Some("inline"));
    }

    #[test]
    fn test_resolve_cycle_terminates() {
        let components = registry(vec![
            ("A", RefOrSpec::from_ref("#/components/schemas/B")),
            ("B", RefOrSpec::from_ref("#/components/schemas/A")),
        ]);

        let cell = RefOrSpec::<Schema>::from_ref("#/components/schemas/A");
        match cell.resolve(Some(&components)) {
            Err(Error::CycleDetected { reference, chain }) => {
                assert_eq!(reference, "#/components/schemas/A");
                assert_eq!(
                    chain,
                    vec![
                        "#/components/schemas/A",
                        "#/components/schemas/B",
                        "#/components/schemas/A",
                    ]
                );
            }
            other => panic!("Expected cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_resolve_self_cycle() {
        let components = registry(vec![("Loop", RefOrSpec::from_ref("#/components/schemas/Loop"))]);
        let cell = RefOrSpec::<Schema>::from_ref("#/components/schemas/Loop");
        assert!(matches!(
            cell.resolve(Some(&components)),
            Err(Error::CycleDetected { .. })
        ));
    }

    #[test]
    fn test_resolve_failures() {
        let components = registry(vec![("Pet", RefOrSpec::from_spec(titled("pet")))]);

        let missing = RefOrSpec::<Schema>::from_ref("#/components/schemas/Cat");
        assert!(matches!(
            missing.resolve(Some(&components)),
            Err(Error::NotFound { .. })
        ));

        let detached = RefOrSpec::<Schema>::from_ref("#/components/schemas/Pet");
        assert!(matches!(detached.resolve(None), Err(Error::ComponentsRequired)));

        let external = RefOrSpec::<Schema>::from_ref("https://example.com/schemas/pet.json");
        assert!(matches!(
            external.resolve(Some(&components)),
            Err(Error::UnsupportedReference(_))
        ));

        let no_params_table = RefOrSpec::<Extendable<Parameter>>::from_ref("#/components/parameters/limit");
        assert!(matches!(
            no_params_table.resolve(Some(&components)),
            Err(Error::ComponentsRequired)
        ));
    }

    #[test]
    fn test_resolve_category_mismatch() {
        let components = registry(vec![("Pet", RefOrSpec::from_spec(titled("pet")))]);
        let cell = RefOrSpec::<Extendable<Parameter>>::from_ref("#/components/schemas/Pet");

        match cell.resolve(Some(&components)) {
            Err(Error::UnexpectedComponentType { expected, found, .. }) => {
                assert_eq!(expected, Category::Parameters);
                assert_eq!(found, Category::Schemas);
            }
            other => panic!("Expected type mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_setters_keep_single_variant() {
        let mut cell = RefOrSpec::from_spec(titled("inline"));
        cell.set_ref("#/components/schemas/Pet");
        assert!(cell.get_spec().is_none());

        cell.set_spec(titled("again"));
        assert!(cell.get_ref().is_none());
        assert_eq!(cell.get_spec().unwrap().title.as_deref(), Some("again"));
    }
}
