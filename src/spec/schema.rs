//! Schema object (JSON Schema 2020-12 as used by OpenAPI 3.1)
//!
//! Unlike the other objects the schema is not wrapped in an envelope: JSON
//! Schema allows arbitrary sibling keywords, so the schema itself is the
//! field boundary and any keyword it does not declare lands in
//! [`Schema::extensions`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::bool_or_schema::BoolOrSchema;
use crate::extendable::{Extendable, Extensions, KnownFields};
use crate::reference::RefOrSpec;
use crate::single_or_array::SingleOrArray;

use super::ExternalDocs;

/// Primitive types allowed in `type`
pub const SCHEMA_TYPES: &[&str] = &[
    "null", "boolean", "object", "array", "number", "string", "integer",
];

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    // Core vocabulary
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema_uri: Option<String>,
    #[serde(rename = "$id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "$anchor", default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(rename = "$dynamicAnchor", default, skip_serializing_if = "Option::is_none")]
    pub dynamic_anchor: Option<String>,
    #[serde(rename = "$comment", default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(rename = "$defs", default, skip_serializing_if = "Option::is_none")]
    pub defs: Option<IndexMap<String, RefOrSpec<Schema>>>,

    // Meta-data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examples: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub write_only: Option<bool>,

    // Validation: any instance
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SingleOrArray<String>>,
    #[serde(rename = "const", default, skip_serializing_if = "Option::is_none")]
    pub const_value: Option<Value>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    // Validation: numbers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<Number>,

    // Validation: strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_schema: Option<RefOrSpec<Schema>>,

    // Arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<BoolOrSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_items: Option<Vec<RefOrSpec<Schema>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<RefOrSpec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_contains: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_contains: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unevaluated_items: Option<BoolOrSchema>,

    // Objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, RefOrSpec<Schema>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern_properties: Option<IndexMap<String, RefOrSpec<Schema>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<BoolOrSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_names: Option<RefOrSpec<Schema>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependent_required: Option<IndexMap<String, Vec<String>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependent_schemas: Option<IndexMap<String, RefOrSpec<Schema>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unevaluated_properties: Option<BoolOrSchema>,

    // Composition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<RefOrSpec<Schema>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_of: Option<Vec<RefOrSpec<Schema>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<RefOrSpec<Schema>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<RefOrSpec<Schema>>,
    #[serde(rename = "if", default, skip_serializing_if = "Option::is_none")]
    pub if_schema: Option<RefOrSpec<Schema>>,
    #[serde(rename = "then", default, skip_serializing_if = "Option::is_none")]
    pub then_schema: Option<RefOrSpec<Schema>>,
    #[serde(rename = "else", default, skip_serializing_if = "Option::is_none")]
    pub else_schema: Option<RefOrSpec<Schema>>,

    // OpenAPI vocabulary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Extendable<Discriminator>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml: Option<Extendable<Xml>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<Extendable<ExternalDocs>>,
    /// Deprecated in favour of `examples`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<Value>,

    /// Every keyword not declared above
    #[serde(flatten)]
    pub extensions: Extensions,
}

impl Schema {
    /// Schema with a single `type`
    pub fn of_type(schema_type: impl Into<String>) -> Self {
        Self {
            schema_type: Some(SingleOrArray::single(schema_type.into())),
            ..Default::default()
        }
    }

    /// Whether `type` is exactly the given primitive
    pub fn is_type(&self, schema_type: &str) -> bool {
        self.schema_type
            .as_ref()
            .and_then(SingleOrArray::as_single)
            .map_or(false, |t| t == schema_type)
    }

    /// All directly nested subschemas, each tagged with its relative path
    pub fn subschemas(&self) -> Vec<(String, &RefOrSpec<Schema>)> {
        let mut out = Vec::new();

        let single = [
            ("contentSchema", &self.content_schema),
            ("contains", &self.contains),
            ("propertyNames", &self.property_names),
            ("not", &self.not),
            ("if", &self.if_schema),
            ("then", &self.then_schema),
            ("else", &self.else_schema),
        ];
        for (name, schema) in single {
            if let Some(schema) = schema {
                out.push((name.to_string(), schema));
            }
        }

        let bool_or = [
            ("items", &self.items),
            ("unevaluatedItems", &self.unevaluated_items),
            ("additionalProperties", &self.additional_properties),
            ("unevaluatedProperties", &self.unevaluated_properties),
        ];
        for (name, value) in bool_or {
            if let Some(schema) = value.as_ref().and_then(BoolOrSchema::as_schema) {
                out.push((name.to_string(), schema));
            }
        }

        let lists = [
            ("prefixItems", &self.prefix_items),
            ("allOf", &self.all_of),
            ("anyOf", &self.any_of),
            ("oneOf", &self.one_of),
        ];
        for (name, list) in lists {
            for (i, schema) in list.iter().flatten().enumerate() {
                out.push((format!("{}[{}]", name, i), schema));
            }
        }

        let maps = [
            ("$defs", &self.defs),
            ("properties", &self.properties),
            ("patternProperties", &self.pattern_properties),
            ("dependentSchemas", &self.dependent_schemas),
        ];
        for (name, map) in maps {
            for (key, schema) in map.iter().flatten() {
                out.push((format!("{}.{}", name, key), schema));
            }
        }

        out
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub property_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<IndexMap<String, String>>,
}

impl KnownFields for Discriminator {
    const FIELDS: &'static [&'static str] = &["propertyName", "mapping"];
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Xml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrapped: Option<bool>,
}

impl KnownFields for Xml {
    const FIELDS: &'static [&'static str] = &["name", "namespace", "prefix", "attribute", "wrapped"];
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_keywords_are_kept() {
        let raw = json!({
            "type": ["string", "null"],
            "maxLength": 10,
            "x-nullable-reason": "legacy",
            "$dynamicRef": "#node",
            "contentMediaType": "text/plain"
        });
        let schema: Schema = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(schema.max_length, Some(10));
        assert_eq!(schema.extensions.len(), 2);
        assert!(schema.extensions.contains_key("$dynamicRef"));
        assert_eq!(serde_json::to_value(&schema).unwrap(), raw);
    }

    #[test]
    fn test_numbers_keep_representation() {
        let raw = json!({"minimum": 1, "maximum": 2.5, "multipleOf": 0.5});
        let schema: Schema = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(serde_json::to_value(&schema).unwrap(), raw);
    }

    #[test]
    fn test_subschemas() {
        let schema: Schema = serde_json::from_value(json!({
            "properties": {"name": {"type": "string"}},
            "items": {"type": "integer"},
            "additionalProperties": false,
            "allOf": [{"$ref": "#/components/schemas/Base"}]
        }))
        .unwrap();

        let paths: Vec<String> = schema.subschemas().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["items", "allOf[0]", "properties.name"]);
    }

    #[test]
    fn test_is_type() {
        assert!(Schema::of_type("integer").is_type("integer"));
        let nullable: Schema = serde_json::from_value(json!({"type": ["integer", "null"]})).unwrap();
        assert!(!nullable.is_type("integer"));
    }
}
