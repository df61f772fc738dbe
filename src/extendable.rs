//! Extension-aware envelope
//!
//! [`Extendable<T>`] carries a statically-typed payload together with every
//! field the payload type does not declare. Decode partitions the incoming
//! object by the payload's [`KnownFields`] table; encode merges both halves
//! back into one flat object.

use indexmap::IndexMap;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{self, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::codec;

/// Conventional prefix of vendor extension fields
pub const EXTENSION_PREFIX: &str = "x-";

/// Vendor extension fields, in document order
pub type Extensions = IndexMap<String, Value>;

/// Serialized field names declared by a payload type
///
/// The table lists wire names (after any serde rename) and omits skipped
/// fields. Patterned-field objects such as paths or responses have no fixed
/// table and override [`KnownFields::is_known_field`] instead.
pub trait KnownFields {
    const FIELDS: &'static [&'static str];

    fn is_known_field(name: &str) -> bool {
        Self::FIELDS.contains(&name)
    }
}

/// Whether a field name carries the extension prefix
pub fn is_extension_name(name: &str) -> bool {
    name.starts_with(EXTENSION_PREFIX)
}

/// A payload plus its extension fields
#[derive(Debug, Clone, PartialEq)]
pub struct Extendable<T> {
    /// The typed payload; `None` encodes as the extensions alone
    pub spec: Option<T>,
    /// Every field the payload type does not declare
    pub extensions: Extensions,
}

impl<T> Default for Extendable<T> {
    fn default() -> Self {
        Self {
            spec: None,
            extensions: Extensions::new(),
        }
    }
}

impl<T> From<T> for Extendable<T> {
    fn from(spec: T) -> Self {
        Self::new(spec)
    }
}

impl<T> Extendable<T> {
    /// Wrap a payload with no extensions
    pub fn new(spec: T) -> Self {
        Self {
            spec: Some(spec),
            extensions: Extensions::new(),
        }
    }

    pub fn spec(&self) -> Option<&T> {
        self.spec.as_ref()
    }

    pub fn spec_mut(&mut self) -> Option<&mut T> {
        self.spec.as_mut()
    }

    /// Get an extension value by its full name (e.g. `x-internal`)
    pub fn extension(&self, name: &str) -> Option<&Value> {
        self.extensions.get(name)
    }

    /// Set an extension value, returning the previous one
    pub fn add_extension(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.extensions.insert(name.into(), value.into())
    }
}

/// Split an object into (declared fields, extensions) for payload type `T`
pub(crate) fn split_fields<T: KnownFields>(raw: Map<String, Value>) -> (Map<String, Value>, Extensions) {
    let mut known = Map::with_capacity(raw.len());
    let mut extensions = Extensions::new();

    for (name, value) in raw {
        if T::is_known_field(&name) {
            known.insert(name, value);
        } else {
            extensions.insert(name, value);
        }
    }

    (known, extensions)
}

impl<'de, T> Deserialize<'de> for Extendable<T>
where
    T: DeserializeOwned + KnownFields,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Map::<String, Value>::deserialize(deserializer)?;
        let (known, extensions) = split_fields::<T>(raw);
        let spec = codec::from_value::<T>(Value::Object(known)).map_err(de::Error::custom)?;

        Ok(Self {
            spec: Some(spec),
            extensions,
        })
    }
}

impl<T: Serialize> Serialize for Extendable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut merged = match &self.spec {
            None => Map::with_capacity(self.extensions.len()),
            Some(spec) => match serde_json::to_value(spec).map_err(ser::Error::custom)? {
                Value::Object(fields) => fields,
                Value::Null => Map::new(),
                other => {
                    return Err(ser::Error::custom(format!(
                        "{} must encode as an object, got {}",
                        codec::type_name::<T>(),
                        other
                    )))
                }
            },
        };

        // Declared fields win over an extension of the same name
        for (name, value) in &self.extensions {
            if !merged.contains_key(name) {
                merged.insert(name.clone(), value.clone());
            }
        }

        merged.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
    struct Sample {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        a: Option<String>,
        #[serde(rename = "in", default, skip_serializing_if = "Option::is_none")]
        location: Option<String>,
        #[serde(skip)]
        cached: Option<u32>,
    }

    impl KnownFields for Sample {
        const FIELDS: &'static [&'static str] = &["a", "in"];
    }

    #[test]
    fn test_extension_partition() {
        let raw = json!({"a": "x", "x-ext": 1});
        let decoded: Extendable<Sample> = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(decoded.spec().unwrap().a.as_deref(), Some("x"));
        assert_eq!(decoded.extensions.len(), 1);
        assert_eq!(decoded.extension("x-ext"), Some(&json!(1)));

        assert_eq!(serde_json::to_value(&decoded).unwrap(), raw);
    }

    #[test]
    fn test_renamed_and_skipped_fields() {
        let raw = json!({"in": "query", "cached": 3, "location": "nope"});
        let decoded: Extendable<Sample> = serde_json::from_value(raw.clone()).unwrap();
        let spec = decoded.spec().unwrap();

        assert_eq!(spec.location.as_deref(), Some("query"));
        assert_eq!(spec.cached, None);
        // Skipped and in-memory-only names are ordinary extensions
        assert_eq!(decoded.extension("cached"), Some(&json!(3)));
        assert_eq!(decoded.extension("location"), Some(&json!("nope")));
        assert_eq!(serde_json::to_value(&decoded).unwrap(), raw);
    }

    #[test]
    fn test_unprefixed_unknown_fields_are_kept() {
        let raw = json!({"a": "x", "vendor": {"nested": [1, 2]}});
        let decoded: Extendable<Sample> = serde_json::from_value(raw.clone()).unwrap();
        assert!(decoded.extension("vendor").is_some());
        assert!(!is_extension_name("vendor"));
        assert_eq!(serde_json::to_value(&decoded).unwrap(), raw);
    }

    #[test]
    fn test_nil_payload_encodes_extensions_only() {
        let mut envelope = Extendable::<Sample>::default();
        envelope.add_extension("x-only", "here");
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({"x-only": "here"}));
    }

    #[test]
    fn test_declared_field_wins_on_collision() {
        let mut envelope = Extendable::new(Sample {
            a: Some("typed".to_string()),
            ..Default::default()
        });
        envelope.add_extension("a", "shadow");
        assert_eq!(serde_json::to_value(&envelope).unwrap(), json!({"a": "typed"}));
    }

    #[test]
    fn test_payload_decode_error_names_type() {
        let err = serde_json::from_value::<Extendable<Sample>>(json!({"a": 5})).unwrap_err();
        assert!(err.to_string().contains("Sample"), "{}", err);
    }
}
