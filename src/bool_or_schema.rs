//! Positions where `true`/`false` and a full schema are both legal

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec;
use crate::reference::RefOrSpec;
use crate::spec::Schema;

/// Either a boolean or a schema (e.g. `additionalProperties`)
///
/// Carried as `Option<BoolOrSchema>` so that an explicit `false` stays
/// distinct from an absent field and is always written back.
#[derive(Debug, Clone, PartialEq)]
pub enum BoolOrSchema {
    Bool(bool),
    Schema(RefOrSpec<Schema>),
}

impl BoolOrSchema {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BoolOrSchema::Bool(b) => Some(*b),
            BoolOrSchema::Schema(_) => None,
        }
    }

    pub fn as_schema(&self) -> Option<&RefOrSpec<Schema>> {
        match self {
            BoolOrSchema::Bool(_) => None,
            BoolOrSchema::Schema(schema) => Some(schema),
        }
    }
}

impl From<bool> for BoolOrSchema {
    fn from(b: bool) -> Self {
        BoolOrSchema::Bool(b)
    }
}

impl From<Schema> for BoolOrSchema {
    fn from(schema: Schema) -> Self {
        BoolOrSchema::Schema(RefOrSpec::from_spec(schema))
    }
}

impl From<RefOrSpec<Schema>> for BoolOrSchema {
    fn from(schema: RefOrSpec<Schema>) -> Self {
        BoolOrSchema::Schema(schema)
    }
}

impl<'de> Deserialize<'de> for BoolOrSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Bool(b) => Ok(BoolOrSchema::Bool(b)),
            other => codec::from_value::<RefOrSpec<Schema>>(other)
                .map(BoolOrSchema::Schema)
                .map_err(de::Error::custom),
        }
    }
}

impl Serialize for BoolOrSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BoolOrSchema::Bool(b) => serializer.serialize_bool(*b),
            BoolOrSchema::Schema(schema) => schema.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize)]
    struct Holder {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extra: Option<BoolOrSchema>,
    }

    #[test]
    fn test_false_is_not_absent() {
        let holder: Holder = serde_json::from_value(json!({"extra": false})).unwrap();
        assert_eq!(holder.extra, Some(BoolOrSchema::Bool(false)));
        assert_eq!(serde_json::to_value(&holder).unwrap(), json!({"extra": false}));

        let absent: Holder = serde_json::from_value(json!({})).unwrap();
        assert_eq!(absent.extra, None);
        assert_eq!(serde_json::to_value(&absent).unwrap(), json!({}));
    }

    #[test]
    fn test_object_is_schema() {
        let value: BoolOrSchema = serde_json::from_value(json!({"title": "x"})).unwrap();
        let schema = value.as_schema().and_then(RefOrSpec::get_spec).unwrap();
        assert_eq!(schema.title.as_deref(), Some("x"));
        assert_eq!(value.as_bool(), None);
    }

    #[test]
    fn test_reference_is_schema() {
        let value: BoolOrSchema =
            serde_json::from_value(json!({"$ref": "#/components/schemas/Extra"})).unwrap();
        assert!(value.as_schema().unwrap().is_ref());
    }

    #[test]
    fn test_invalid_shape_is_rejected() {
        assert!(serde_json::from_value::<BoolOrSchema>(json!("yes")).is_err());
    }
}
