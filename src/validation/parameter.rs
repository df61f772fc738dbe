//! Parameter, header, request body, media type and example rules

use indexmap::IndexMap;
use serde_json::Value;

use crate::codec;
use crate::extendable::Extendable;
use crate::reference::RefOrSpec;
use crate::spec::{
    Encoding, Example, Header, MediaType, Parameter, ParameterLocation, ParameterStyle, RequestBody, Schema,
};

use super::{join, ValidationCode, Validator};

type ContentMap = IndexMap<String, Extendable<MediaType>>;
type ExampleMap = IndexMap<String, RefOrSpec<Extendable<Example>>>;

impl<'a> Validator<'a> {
    pub(super) fn check_parameter(&mut self, param: &'a Extendable<Parameter>, path: &str) {
        let Some(spec) = self.open(param, path) else { return };

        self.require(!spec.name.is_empty(), path, "name");

        let location = if spec.location.is_empty() {
            self.require(false, path, "in");
            None
        } else {
            let location = spec.location();
            if location.is_none() {
                self.report(
                    &join(path, "in"),
                    ValidationCode::InvalidValue,
                    format!("'{}' is not one of query, header, path, cookie", spec.location),
                );
            }
            location
        };

        if location == Some(ParameterLocation::Path) && spec.required != Some(true) {
            self.report(
                &join(path, "required"),
                ValidationCode::InvalidValue,
                "path parameters must set required: true",
            );
        }

        if let Some(style) = &spec.style {
            match style.parse::<ParameterStyle>() {
                Err(message) => self.report(&join(path, "style"), ValidationCode::InvalidValue, message),
                Ok(parsed) => {
                    if let Some(location) = location.filter(|l| !l.allowed_styles().contains(&parsed)) {
                        self.report(
                            &join(path, "style"),
                            ValidationCode::InvalidValue,
                            format!("style '{}' is not allowed for {} parameters", style, location),
                        );
                    }
                }
            }
        }

        if spec.allow_empty_value.is_some() && location.map_or(false, |l| l != ParameterLocation::Query) {
            self.report(
                &join(path, "allowEmptyValue"),
                ValidationCode::InvalidValue,
                "allowEmptyValue is only allowed for query parameters",
            );
        }

        self.check_schema_or_content(spec.schema.as_ref(), spec.content.as_ref(), path);
        self.check_example_values(spec.schema.as_ref(), spec.example.as_ref(), spec.examples.as_ref(), path);
    }

    pub(super) fn check_header(&mut self, header: &'a Extendable<Header>, path: &str) {
        let Some(spec) = self.open(header, path) else { return };

        if let Some(style) = spec.style.as_deref().filter(|s| *s != "simple") {
            self.report(
                &join(path, "style"),
                ValidationCode::InvalidValue,
                format!("header style must be 'simple', got '{}'", style),
            );
        }

        self.check_schema_or_content(spec.schema.as_ref(), spec.content.as_ref(), path);
        self.check_example_values(spec.schema.as_ref(), spec.example.as_ref(), spec.examples.as_ref(), path);
    }

    pub(super) fn check_headers(&mut self, headers: &'a IndexMap<String, RefOrSpec<Extendable<Header>>>, path: &str) {
        for (name, header) in headers {
            let header_path = join(path, name);
            if name.eq_ignore_ascii_case("content-type") {
                self.report(
                    &header_path,
                    ValidationCode::IgnoredField,
                    "a Content-Type header is ignored; it is described by the content map",
                );
            }
            self.walk_cell(header, &header_path, Self::check_header);
        }
    }

    pub(super) fn check_request_body(&mut self, body: &'a Extendable<RequestBody>, path: &str) {
        let Some(spec) = self.open(body, path) else { return };

        match &spec.content {
            Some(content) if !content.is_empty() => {
                let content_path = join(path, "content");
                for (media_type, media) in content {
                    self.check_media_type(media, &join(&content_path, media_type));
                }
            }
            _ => self.require(false, path, "content"),
        }
    }

    pub(super) fn check_media_type(&mut self, media: &'a Extendable<MediaType>, path: &str) {
        let Some(spec) = self.open(media, path) else { return };

        if let Some(schema) = &spec.schema {
            self.walk_cell(schema, &join(path, "schema"), Self::check_schema);
        }
        self.check_example_values(spec.schema.as_ref(), spec.example.as_ref(), spec.examples.as_ref(), path);

        let properties = spec
            .schema
            .as_ref()
            .and_then(|schema| self.quiet(schema))
            .and_then(|schema| schema.properties.as_ref());

        let encoding_path = join(path, "encoding");
        for (name, encoding) in spec.encoding.iter().flatten() {
            let property_path = join(&encoding_path, name);
            if properties.map_or(false, |properties| !properties.contains_key(name)) {
                self.report(
                    &property_path,
                    ValidationCode::InvalidValue,
                    format!("encoding property '{}' is not defined in the schema", name),
                );
            }
            self.check_encoding(encoding, &property_path);
        }
    }

    fn check_encoding(&mut self, encoding: &'a Extendable<Encoding>, path: &str) {
        let Some(spec) = self.open(encoding, path) else { return };

        if let Some(style) = &spec.style {
            let allowed = style
                .parse::<ParameterStyle>()
                .map_or(false, |s| ParameterLocation::Query.allowed_styles().contains(&s));
            if !allowed {
                self.report(
                    &join(path, "style"),
                    ValidationCode::InvalidValue,
                    format!("'{}' is not one of form, spaceDelimited, pipeDelimited, deepObject", style),
                );
            }
        }

        if let Some(headers) = &spec.headers {
            self.check_headers(headers, &join(path, "headers"));
        }
    }

    pub(super) fn check_example(&mut self, example: &'a Extendable<Example>, path: &str) {
        let Some(spec) = self.open(example, path) else { return };

        self.exclusive(
            spec.value.is_some() && spec.external_value.is_some(),
            path,
            "value",
            "externalValue",
        );
        self.check_url(spec.external_value.as_deref(), &join(path, "externalValue"));
    }

    fn check_schema_or_content(&mut self, schema: Option<&'a RefOrSpec<Schema>>, content: Option<&'a ContentMap>, path: &str) {
        match (schema, content) {
            (Some(_), Some(_)) => self.exclusive(true, path, "schema", "content"),
            (None, None) => self.report(path, ValidationCode::MissingField, "one of schema or content is required"),
            _ => {}
        }

        if let Some(schema) = schema {
            self.walk_cell(schema, &join(path, "schema"), Self::check_schema);
        }

        if let Some(content) = content {
            let content_path = join(path, "content");
            if content.len() != 1 {
                self.report(
                    &content_path,
                    ValidationCode::InvalidValue,
                    format!("content must hold exactly one media type, found {}", content.len()),
                );
            }
            for (media_type, media) in content {
                self.check_media_type(media, &join(&content_path, media_type));
            }
        }
    }

    /// `example`/`examples` exclusivity, the example objects, and their values against `schema`
    fn check_example_values(
        &mut self,
        schema: Option<&'a RefOrSpec<Schema>>,
        example: Option<&'a Value>,
        examples: Option<&'a ExampleMap>,
        path: &str,
    ) {
        self.exclusive(example.is_some() && examples.is_some(), path, "example", "examples");

        let examples_path = join(path, "examples");
        for (name, cell) in examples.into_iter().flatten() {
            self.walk_cell(cell, &join(&examples_path, name), Self::check_example);
        }

        if self.options.skip_examples {
            return;
        }
        let Some(schema) = schema.and_then(|s| codec::to_value(s).ok()) else { return };

        if let Some(example) = example {
            self.check_value(&schema, example, &join(path, "example"), ValidationCode::ExampleMismatch);
        }
        for (name, cell) in examples.into_iter().flatten() {
            let value = self
                .quiet(cell)
                .and_then(Extendable::spec)
                .and_then(|example| example.value.as_ref());
            if let Some(value) = value {
                self.check_value(&schema, value, &join(&examples_path, name), ValidationCode::ExampleMismatch);
            }
        }
    }
}
