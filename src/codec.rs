//! JSON and YAML encodings
//!
//! Both encodings go through one abstract tree, [`serde_json::Value`]. YAML
//! is parsed into its own tree first and normalized (mapping keys such as
//! `200:` become strings) so that every typed decode runs the exact same
//! code path regardless of the source format.

use std::path::Path;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Textual encoding of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    /// Guess the format from a file extension
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        match path.as_ref().extension()?.to_str()? {
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Parse text into the abstract tree
    pub fn parse(self, src: &str) -> Result<Value> {
        match self {
            Format::Json => Ok(serde_json::from_str(src)?),
            Format::Yaml => yaml_to_json(serde_yaml::from_str(src)?),
        }
    }

    /// Decode text into a typed value
    pub fn decode<T: DeserializeOwned>(self, src: &str) -> Result<T> {
        from_value(self.parse(src)?)
    }

    /// Encode a typed value as text
    pub fn encode<T: Serialize + ?Sized>(self, value: &T) -> Result<String> {
        let tree = to_value(value)?;
        match self {
            Format::Json => Ok(serde_json::to_string_pretty(&tree)?),
            Format::Yaml => Ok(serde_yaml::to_string(&tree)?),
        }
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            other => Err(format!("unknown format '{}', expected json or yaml", other)),
        }
    }
}

/// Decode JSON text into a typed value
pub fn from_json<T: DeserializeOwned>(src: &str) -> Result<T> {
    Format::Json.decode(src)
}

/// Decode YAML text into a typed value
pub fn from_yaml<T: DeserializeOwned>(src: &str) -> Result<T> {
    Format::Yaml.decode(src)
}

/// Encode a typed value as pretty-printed JSON
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Format::Json.encode(value)
}

/// Encode a typed value as YAML
pub fn to_yaml<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Format::Yaml.encode(value)
}

/// Decode a typed value from the abstract tree, keeping the failing field path
pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|err| Error::Decode {
        type_name: type_name::<T>(),
        path: err.path().to_string(),
        message: err.into_inner().to_string(),
    })
}

/// Encode a typed value into the abstract tree
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(|e| Error::Encode(e.to_string()))
}

/// Type name without module paths, e.g. `Extendable<Parameter>`
pub(crate) fn type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    let mut chars = full.chars().peekable();

    while let Some(c) = chars.next() {
        if c == ':' && chars.peek() == Some(&':') {
            chars.next();
            segment.clear();
        } else if c.is_alphanumeric() || c == '_' {
            segment.push(c);
        } else {
            out.push_str(&segment);
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(&segment);
    out
}

fn yaml_to_json(value: serde_yaml::Value) -> Result<Value> {
    use serde_yaml::Value as Yaml;

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => yaml_number(&n)?,
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(
            items
                .into_iter()
                .map(yaml_to_json)
                .collect::<Result<Vec<_>>>()?,
        ),
        Yaml::Mapping(mapping) => {
            let mut out = Map::with_capacity(mapping.len());
            for (key, value) in mapping {
                out.insert(yaml_key(key)?, yaml_to_json(value)?);
            }
            Value::Object(out)
        }
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value)?,
    })
}

fn yaml_number(n: &serde_yaml::Number) -> Result<Value> {
    if let Some(u) = n.as_u64() {
        return Ok(Value::from(u));
    }
    if let Some(i) = n.as_i64() {
        return Ok(Value::from(i));
    }
    n.as_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| Error::Decode {
            type_name: "number".to_string(),
            path: String::new(),
            message: format!("{} has no JSON representation", n),
        })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String> {
    use serde_yaml::Value as Yaml;

    match key {
        Yaml::String(s) => Ok(s),
        Yaml::Number(n) => Ok(n.to_string()),
        Yaml::Bool(b) => Ok(b.to_string()),
        Yaml::Null => Ok("null".to_string()),
        Yaml::Tagged(tagged) => yaml_key(tagged.value),
        other => Err(Error::Decode {
            type_name: "mapping key".to_string(),
            path: String::new(),
            message: format!("unsupported mapping key {:?}", other),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_short_type_name() {
        assert_eq!(type_name::<String>(), "String");
        assert_eq!(
            type_name::<Vec<crate::spec::Parameter>>(),
            "Vec<Parameter>"
        );
    }

    #[test]
    fn test_yaml_numeric_keys_become_strings() {
        let tree = Format::Yaml
            .parse("responses:\n  200:\n    description: ok\n  4XX:\n    description: bad\n")
            .unwrap();
        assert_eq!(
            tree,
            json!({"responses": {"200": {"description": "ok"}, "4XX": {"description": "bad"}}})
        );
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(Format::from_path("api.yml"), Some(Format::Yaml));
        assert_eq!(Format::from_path("api.json"), Some(Format::Json));
        assert_eq!(Format::from_path("api.toml"), None);
    }

    #[test]
    fn test_decode_error_carries_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Outer {
            #[allow(dead_code)]
            inner: Inner,
        }
        #[derive(Debug, serde::Deserialize)]
        struct Inner {
            #[allow(dead_code)]
            count: u32,
        }

        let err = from_json::<Outer>(r#"{"inner": {"count": "many"}}"#).unwrap_err();
        match err {
            Error::Decode { type_name, path, .. } => {
                assert_eq!(type_name, "Outer");
                assert_eq!(path, "inner.count");
            }
            other => panic!("Expected decode error, got {:?}", other),
        }
    }
}
