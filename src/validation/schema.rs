//! Schema keyword rules

use std::collections::HashSet;

use regex::Regex;
use serde_json::Number;

use crate::codec;
use crate::spec::{Schema, SCHEMA_TYPES};

use super::{index, join, ValidationCode, Validator};

fn as_f64(number: &Option<Number>) -> Option<f64> {
    number.as_ref().and_then(Number::as_f64)
}

impl<'a> Validator<'a> {
    pub(super) fn check_schema(&mut self, schema: &'a Schema, path: &str) {
        if let Some(types) = &schema.schema_type {
            for schema_type in types.iter() {
                if !SCHEMA_TYPES.contains(&schema_type.as_str()) {
                    self.report(
                        &join(path, "type"),
                        ValidationCode::InvalidValue,
                        format!("'{}' is not one of {}", schema_type, SCHEMA_TYPES.join(", ")),
                    );
                }
            }
        }

        if let Some(format) = &schema.format {
            let allowed: &[&str] = if schema.is_type("integer") {
                &["int32", "int64"]
            } else if schema.is_type("number") {
                &["float", "double"]
            } else {
                &[]
            };
            if !allowed.is_empty() && !allowed.contains(&format.as_str()) {
                self.report(
                    &join(path, "format"),
                    ValidationCode::InvalidValue,
                    format!("format '{}' does not apply to this type, expected {}", format, allowed.join(" or ")),
                );
            }
        }

        self.check_numeric_keywords(schema, path);
        self.check_counts(path, "maxLength", schema.max_length, "minLength", schema.min_length);
        self.check_counts(path, "maxItems", schema.max_items, "minItems", schema.min_items);
        self.check_counts(path, "maxContains", schema.max_contains, "minContains", schema.min_contains);
        self.check_counts(path, "maxProperties", schema.max_properties, "minProperties", schema.min_properties);

        if let Some(pattern) = &schema.pattern {
            self.check_regex(pattern, &join(path, "pattern"));
        }
        let pattern_properties_path = join(path, "patternProperties");
        for key in schema.pattern_properties.iter().flat_map(|p| p.keys()) {
            self.check_regex(key, &join(&pattern_properties_path, key));
        }

        if schema.enum_values.as_ref().map_or(false, Vec::is_empty) {
            self.report(&join(path, "enum"), ValidationCode::InvalidValue, "enum must not be empty");
        }

        let mut required = HashSet::new();
        for (i, name) in schema.required.iter().flatten().enumerate() {
            if !required.insert(name) {
                self.report(
                    &index(&join(path, "required"), i),
                    ValidationCode::InvalidValue,
                    format!("required property '{}' is listed more than once", name),
                );
            }
        }

        if let Some(discriminator) = &schema.discriminator {
            let discriminator_path = join(path, "discriminator");
            if let Some(spec) = self.open(discriminator, &discriminator_path) {
                self.require(!spec.property_name.is_empty(), &discriminator_path, "propertyName");
            }
        }
        if let Some(xml) = &schema.xml {
            self.open(xml, &join(path, "xml"));
        }
        if let Some(docs) = &schema.external_docs {
            self.check_external_docs(docs, &join(path, "externalDocs"));
        }

        self.check_schema_values(schema, path);

        for (relative, subschema) in schema.subschemas() {
            self.walk_cell(subschema, &join(path, &relative), Self::check_schema);
        }
    }

    fn check_numeric_keywords(&mut self, schema: &Schema, path: &str) {
        if let Some(multiple_of) = as_f64(&schema.multiple_of) {
            if multiple_of <= 0.0 {
                self.report(
                    &join(path, "multipleOf"),
                    ValidationCode::InvalidSchema,
                    "multipleOf must be greater than 0",
                );
            }
        }

        let maximum = as_f64(&schema.maximum);
        let minimum = as_f64(&schema.minimum);
        let exclusive_maximum = as_f64(&schema.exclusive_maximum);
        let exclusive_minimum = as_f64(&schema.exclusive_minimum);

        if let (Some(max), Some(min)) = (maximum, minimum) {
            if max < min {
                self.report(
                    path,
                    ValidationCode::InvalidSchema,
                    format!("maximum {} is less than minimum {}", max, min),
                );
            }
        }
        self.exclusive(
            maximum.is_some() && exclusive_maximum.is_some(),
            path,
            "maximum",
            "exclusiveMaximum",
        );
        self.exclusive(
            minimum.is_some() && exclusive_minimum.is_some(),
            path,
            "minimum",
            "exclusiveMinimum",
        );
        if let (Some(max), Some(min)) = (exclusive_maximum, exclusive_minimum) {
            if max <= min {
                self.report(
                    path,
                    ValidationCode::InvalidSchema,
                    format!("exclusiveMaximum {} must be greater than exclusiveMinimum {}", max, min),
                );
            }
        }
    }

    fn check_counts(&mut self, path: &str, max_name: &str, max: Option<u64>, min_name: &str, min: Option<u64>) {
        if let (Some(max), Some(min)) = (max, min) {
            if max < min {
                self.report(
                    path,
                    ValidationCode::InvalidSchema,
                    format!("{} {} is less than {} {}", max_name, max, min_name, min),
                );
            }
        }
    }

    fn check_regex(&mut self, pattern: &str, path: &str) {
        if let Err(err) = Regex::new(pattern) {
            self.report(path, ValidationCode::InvalidRegex, err.to_string());
        }
    }

    /// `default`, `examples` and `example` against the schema itself
    fn check_schema_values(&mut self, schema: &Schema, path: &str) {
        let check_default = !self.options.skip_default_values && schema.default.is_some();
        let check_examples =
            !self.options.skip_examples && (schema.examples.is_some() || schema.example.is_some());
        if !check_default && !check_examples {
            return;
        }
        let Ok(encoded) = codec::to_value(schema) else { return };

        if check_default {
            if let Some(default) = &schema.default {
                self.check_value(&encoded, default, &join(path, "default"), ValidationCode::DefaultMismatch);
            }
        }
        if check_examples {
            let examples_path = join(path, "examples");
            for (i, example) in schema.examples.iter().flatten().enumerate() {
                self.check_value(&encoded, example, &index(&examples_path, i), ValidationCode::ExampleMismatch);
            }
            if let Some(example) = &schema.example {
                self.check_value(&encoded, example, &join(path, "example"), ValidationCode::ExampleMismatch);
            }
        }
    }
}
