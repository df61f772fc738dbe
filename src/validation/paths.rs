//! Path, operation, response, callback and link rules

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extendable::Extendable;
use crate::reference::RefOrSpec;
use crate::spec::{Callback, Link, Operation, Parameter, PathItem, Paths, Response, Responses};

use super::{index, join, ValidationCode, Validator};

static TEMPLATE_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}/]+)\}").expect("path template pattern"));

static RESPONSE_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-5](\d{2}|XX)$").expect("response code pattern"));

/// A resolved parameter: position in its list, name, location
type Declared = (usize, String, String);

/// Variable names of a path template, in order
fn template_variables(template: &str) -> Vec<&str> {
    TEMPLATE_VARIABLE
        .captures_iter(template)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

fn declares_path_parameter(declared: &[Declared], name: &str) -> bool {
    declared
        .iter()
        .any(|(_, declared_name, location)| declared_name == name && location == "path")
}

impl<'a> Validator<'a> {
    pub(super) fn check_paths(&mut self, paths: &'a Extendable<Paths>, path: &str) {
        let Some(spec) = self.open(paths, path) else { return };
        let mut shapes: HashMap<String, &'a str> = HashMap::new();

        for (template, cell) in &spec.paths {
            let item_path = join(path, template);

            if !template.starts_with('/') {
                self.report(
                    &item_path,
                    ValidationCode::InvalidPath,
                    format!("path '{}' must begin with '/'", template),
                );
            }

            let shape = TEMPLATE_VARIABLE.replace_all(template, "{}").into_owned();
            match shapes.get(&shape) {
                Some(first) => {
                    let message = format!("'{}' has the same shape as '{}'", template, first);
                    self.report(&item_path, ValidationCode::DuplicatePath, message);
                }
                None => {
                    shapes.insert(shape, template.as_str());
                }
            }

            if let Some(item) = self.follow(cell, &item_path) {
                self.nested(&item_path, |v| v.check_path_item_for(item, &item_path, Some(template.as_str())));
            }
        }
    }

    /// Path item outside `paths`, where keys are not templates
    pub(super) fn check_path_item(&mut self, item: &'a Extendable<PathItem>, path: &str) {
        self.check_path_item_for(item, path, None);
    }

    fn check_path_item_for(&mut self, item: &'a Extendable<PathItem>, path: &str, template: Option<&str>) {
        let Some(spec) = self.open(item, path) else { return };

        for (i, server) in spec.servers.iter().flatten().enumerate() {
            self.check_server(server, &index(&join(path, "servers"), i));
        }

        let params_path = join(path, "parameters");
        let shared = self.check_parameter_list(spec.parameters.as_ref(), &params_path);

        if let Some(template) = template {
            let variables = template_variables(template);
            for (i, name, location) in &shared {
                if location == "path" && !variables.contains(&name.as_str()) {
                    self.report(
                        &index(&params_path, *i),
                        ValidationCode::InvalidValue,
                        format!("path parameter '{}' does not appear in '{}'", name, template),
                    );
                }
            }

            if spec.operations().next().is_none() {
                for name in variables {
                    if !declares_path_parameter(&shared, name) {
                        self.report(
                            path,
                            ValidationCode::UndeclaredPathParameter,
                            format!("path parameter '{}' is not declared", name),
                        );
                    }
                }
            }
        }

        for (method, operation) in spec.operations() {
            self.check_operation(method, operation, &join(path, method), &shared, template);
        }
    }

    /// Validate a parameter list and return what it declares
    fn check_parameter_list(
        &mut self,
        list: Option<&'a Vec<RefOrSpec<Extendable<Parameter>>>>,
        path: &str,
    ) -> Vec<Declared> {
        let mut declared: Vec<Declared> = Vec::new();

        for (i, cell) in list.into_iter().flatten().enumerate() {
            let param_path = index(path, i);
            self.walk_cell(cell, &param_path, Self::check_parameter);

            let Some(param) = self.quiet(cell).and_then(Extendable::spec) else { continue };
            let duplicate = declared
                .iter()
                .any(|(_, name, location)| *name == param.name && *location == param.location);
            if duplicate {
                self.report(
                    &param_path,
                    ValidationCode::DuplicateParameter,
                    format!("parameter '{}' in '{}' is declared more than once", param.name, param.location),
                );
            } else {
                declared.push((i, param.name.clone(), param.location.clone()));
            }
        }

        declared
    }

    fn check_operation(
        &mut self,
        method: &str,
        operation: &'a Extendable<Operation>,
        path: &str,
        shared: &[Declared],
        template: Option<&str>,
    ) {
        let Some(spec) = self.open(operation, path) else { return };

        if let Some(id) = &spec.operation_id {
            let id_path = join(path, "operationId");
            if id.is_empty() {
                self.report(&id_path, ValidationCode::InvalidValue, "operationId must not be empty");
            } else if let Some(first) = self.state.operation_ids.get(id) {
                let message = format!("operationId '{}' is already used by {}", id, first);
                self.report(&id_path, ValidationCode::DuplicateOperationId, message);
            } else {
                self.state.operation_ids.insert(id.clone(), path.to_string());
            }
        }

        if !self.options.allow_undefined_tags_in_operation {
            for (i, tag) in spec.tags.iter().flatten().enumerate() {
                if !self.state.tags.contains(tag) {
                    self.report(
                        &index(&join(path, "tags"), i),
                        ValidationCode::UndefinedTag,
                        format!("tag '{}' is not declared in the top-level tags", tag),
                    );
                }
            }
        }

        if let Some(body) = &spec.request_body {
            let body_path = join(path, "requestBody");
            let bodiless = matches!(method, "get" | "delete" | "head");
            if bodiless && !self.options.allow_request_body_for_get_and_delete {
                self.report(
                    &body_path,
                    ValidationCode::RequestBodyNotAllowed,
                    format!("{} operations must not have a request body", method.to_uppercase()),
                );
            }
            self.walk_cell(body, &body_path, Self::check_request_body);
        }

        let params_path = join(path, "parameters");
        let own = self.check_parameter_list(spec.parameters.as_ref(), &params_path);

        if let Some(template) = template {
            let variables = template_variables(template);
            for name in &variables {
                if !declares_path_parameter(shared, name) && !declares_path_parameter(&own, name) {
                    self.report(
                        path,
                        ValidationCode::UndeclaredPathParameter,
                        format!("path parameter '{}' is not declared", name),
                    );
                }
            }
            for (i, name, location) in &own {
                if location == "path" && !variables.contains(&name.as_str()) {
                    self.report(
                        &index(&params_path, *i),
                        ValidationCode::InvalidValue,
                        format!("path parameter '{}' does not appear in '{}'", name, template),
                    );
                }
            }
        }

        if let Some(responses) = &spec.responses {
            self.check_responses(responses, &join(path, "responses"));
        }

        let callbacks_path = join(path, "callbacks");
        for (name, callback) in spec.callbacks.iter().flatten() {
            self.walk_cell(callback, &join(&callbacks_path, name), Self::check_callback);
        }

        for (i, requirement) in spec.security.iter().flatten().enumerate() {
            self.check_security_requirement(requirement, &index(&join(path, "security"), i));
        }
        for (i, server) in spec.servers.iter().flatten().enumerate() {
            self.check_server(server, &index(&join(path, "servers"), i));
        }
        if let Some(docs) = &spec.external_docs {
            self.check_external_docs(docs, &join(path, "externalDocs"));
        }
    }

    fn check_responses(&mut self, responses: &'a Extendable<Responses>, path: &str) {
        let Some(spec) = self.open(responses, path) else { return };

        if spec.responses.is_empty() {
            self.report(path, ValidationCode::MissingField, "at least one response is required");
        }

        for (code, cell) in &spec.responses {
            let response_path = join(path, code);
            if code != Responses::DEFAULT && !RESPONSE_CODE.is_match(code) {
                self.report(
                    &response_path,
                    ValidationCode::InvalidResponseCode,
                    format!("'{}' is not a status code, a range like 4XX, or default", code),
                );
            }
            self.walk_cell(cell, &response_path, Self::check_response);
        }
    }

    pub(super) fn check_response(&mut self, response: &'a Extendable<Response>, path: &str) {
        let Some(spec) = self.open(response, path) else { return };

        self.require(!spec.description.is_empty(), path, "description");

        if let Some(headers) = &spec.headers {
            self.check_headers(headers, &join(path, "headers"));
        }

        let content_path = join(path, "content");
        for (media_type, media) in spec.content.iter().flatten() {
            self.check_media_type(media, &join(&content_path, media_type));
        }

        let links_path = join(path, "links");
        for (name, link) in spec.links.iter().flatten() {
            self.walk_cell(link, &join(&links_path, name), Self::check_link);
        }
    }

    pub(super) fn check_callback(&mut self, callback: &'a Extendable<Callback>, path: &str) {
        let Some(spec) = self.open(callback, path) else { return };

        for (expression, item) in &spec.paths {
            self.walk_cell(item, &join(path, expression), Self::check_path_item);
        }
    }

    pub(super) fn check_link(&mut self, link: &'a Extendable<Link>, path: &str) {
        let Some(spec) = self.open(link, path) else { return };

        match (&spec.operation_ref, &spec.operation_id) {
            (Some(_), Some(_)) => self.exclusive(true, path, "operationRef", "operationId"),
            (None, None) => self.report(
                path,
                ValidationCode::MissingField,
                "one of operationRef or operationId is required",
            ),
            (None, Some(id)) => self.state.link_targets.push((path.to_string(), id.clone())),
            (Some(_), None) => {}
        }

        if let Some(server) = &spec.server {
            self.check_server(server, &join(path, "server"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{codes, minimal, run, run_with};
    use super::super::{ValidationCode, ValidationOptions};
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn test_template_variables() {
        assert_eq!(template_variables("/pets/{petId}/toys/{toyId}"), vec!["petId", "toyId"]);
        assert!(template_variables("/pets").is_empty());
    }

    #[rstest]
    #[case("200", true)]
    #[case("4XX", true)]
    #[case("599", true)]
    #[case("default", true)]
    #[case("600", false)]
    #[case("2xx", false)]
    #[case("20", false)]
    #[case("ok", false)]
    fn test_response_codes(#[case] code: &str, #[case] valid: bool) {
        let mut raw = minimal();
        raw["paths"] = json!({
            "/pets": {"get": {"responses": {code: {"description": "ok"}}}}
        });

        let errors = run(raw);
        assert_eq!(errors.has_code(ValidationCode::InvalidResponseCode), !valid, "{}", errors);
    }

    #[test]
    fn test_path_rules() {
        let mut raw = minimal();
        raw["paths"] = json!({
            "pets": {},
            "/pets/{id}": {"parameters": [{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}]},
            "/pets/{petId}": {"parameters": [{"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}}]}
        });

        let found = codes(&run(raw));
        assert_eq!(
            found,
            vec![
                ("paths.pets".to_string(), ValidationCode::InvalidPath),
                ("paths./pets/{petId}".to_string(), ValidationCode::DuplicatePath),
            ]
        );
    }

    #[test]
    fn test_path_parameters_must_be_declared() {
        let mut raw = minimal();
        raw["paths"] = json!({
            "/pets/{petId}": {
                "get": {"responses": {"200": {"description": "ok"}}},
                "delete": {
                    "parameters": [{"name": "petId", "in": "path", "required": true, "schema": {"type": "string"}}],
                    "responses": {"204": {"description": "gone"}}
                }
            }
        });

        let found = codes(&run(raw));
        assert_eq!(
            found,
            vec![("paths./pets/{petId}.get".to_string(), ValidationCode::UndeclaredPathParameter)]
        );
    }

    #[test]
    fn test_duplicate_parameters_through_reference() {
        let mut raw = minimal();
        raw["paths"] = json!({
            "/pets": {"get": {
                "parameters": [
                    {"$ref": "#/components/parameters/limit"},
                    {"name": "limit", "in": "query", "schema": {"type": "integer"}}
                ],
                "responses": {"200": {"description": "ok"}}
            }}
        });
        raw["components"] = json!({
            "parameters": {"limit": {"name": "limit", "in": "query", "schema": {"type": "integer"}}}
        });

        let found = codes(&run(raw));
        assert_eq!(
            found,
            vec![("paths./pets.get.parameters[1]".to_string(), ValidationCode::DuplicateParameter)]
        );
    }

    #[test]
    fn test_operation_rules() {
        let mut raw = minimal();
        raw["tags"] = json!([{"name": "pets"}]);
        raw["paths"] = json!({
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "tags": ["pets", "animals"],
                    "requestBody": {"content": {"application/json": {}}},
                    "responses": {"200": {"description": "ok"}}
                },
                "post": {
                    "operationId": "listPets",
                    "responses": {}
                }
            }
        });

        let found = codes(&run(raw.clone()));
        assert_eq!(
            found,
            vec![
                ("paths./pets.get.tags[1]".to_string(), ValidationCode::UndefinedTag),
                ("paths./pets.get.requestBody".to_string(), ValidationCode::RequestBodyNotAllowed),
                ("paths./pets.post.operationId".to_string(), ValidationCode::DuplicateOperationId),
                ("paths./pets.post.responses".to_string(), ValidationCode::MissingField),
            ]
        );

        let options = ValidationOptions {
            allow_undefined_tags_in_operation: true,
            allow_request_body_for_get_and_delete: true,
            ..Default::default()
        };
        let found = codes(&run_with(raw, options));
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_response_rules() {
        let mut raw = minimal();
        raw["paths"] = json!({
            "/pets": {"get": {"responses": {"200": {
                "headers": {"Content-Type": {"schema": {"type": "string"}}},
                "links": {
                    "both": {"operationRef": "#/paths/~1pets/get", "operationId": "listPets"},
                    "none": {},
                    "dangling": {"operationId": "nowhere"}
                }
            }}}}
        });

        let found = codes(&run(raw));
        let base = "paths./pets.get.responses.200";
        assert_eq!(
            found,
            vec![
                (format!("{}.description", base), ValidationCode::MissingField),
                (format!("{}.headers.Content-Type", base), ValidationCode::IgnoredField),
                (format!("{}.links.both", base), ValidationCode::MutuallyExclusive),
                (format!("{}.links.none", base), ValidationCode::MissingField),
                (format!("{}.links.dangling.operationId", base), ValidationCode::InvalidValue),
            ]
        );
    }

    #[test]
    fn test_callbacks_are_walked() {
        let mut raw = minimal();
        raw["paths"] = json!({
            "/subscribe": {"post": {
                "responses": {"201": {"description": "subscribed"}},
                "callbacks": {"onEvent": {
                    "{$request.body#/url}": {"post": {"responses": {"200": {}}}}
                }}
            }}
        });

        let found = codes(&run(raw));
        assert_eq!(
            found,
            vec![(
                "paths./subscribe.post.callbacks.onEvent.{$request.body#/url}.post.responses.200.description"
                    .to_string(),
                ValidationCode::MissingField
            )]
        );
    }
}
