//! Semantic validation
//!
//! The [`Validator`] walks a decoded document from the root, follows
//! references into the components registry and applies the per-object
//! rules. It never stops at the first problem: every finding is collected
//! into a [`ValidationErrors`] list tagged with the path it was found at,
//! e.g. `paths./pets.get.parameters[0].schema`.
//!
//! Reference handling:
//! - components are walked first and every entry is marked visited, so a
//!   definition is validated once, at its own path;
//! - a `$ref` to an identifier that was already visited produces nothing;
//! - any other `$ref` is resolved and the target validated at the
//!   referencing path, or reported once as [`ValidationCode::UnresolvedReference`].

mod document;
mod errors;
mod parameter;
mod paths;
mod schema;
mod security;

use std::collections::{HashMap, HashSet};

use jsonschema::{Draft, JSONSchema};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::codec;
use crate::components::{Component, Components};
use crate::error::{Error, Result};
use crate::extendable::{is_extension_name, Extendable, Extensions, EXTENSION_PREFIX};
use crate::reference::{ComponentRef, RefOrSpec};
use crate::spec::{Document, Schema};

pub use errors::{ValidationCode, ValidationError, ValidationErrors};

/// Nesting limit used when none is configured
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Switches for individual rule categories
///
/// None of these change how documents decode or encode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationOptions {
    /// Do not check `example`/`examples` values against their schema
    pub skip_examples: bool,
    /// Do not check schema `default` values against the schema
    pub skip_default_values: bool,
    /// Accept extension fields without the `x-` prefix
    pub allow_extension_name_without_prefix: bool,
    /// Accept operation tags missing from the top-level `tags` list
    pub allow_undefined_tags_in_operation: bool,
    /// Accept a request body on GET, DELETE and HEAD operations
    pub allow_request_body_for_get_and_delete: bool,
    /// Maximum nesting of validated objects
    pub max_depth: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            skip_examples: false,
            skip_default_values: false,
            allow_extension_name_without_prefix: false,
            allow_undefined_tags_in_operation: false,
            allow_request_body_for_get_and_delete: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Mutable state of one validation run
#[derive(Debug, Default)]
pub(crate) struct ValidationState {
    errors: ValidationErrors,
    /// `$ref` identifiers already followed or reported
    visited: HashSet<String>,
    /// operationId -> path of the first operation using it
    operation_ids: HashMap<String, String>,
    /// Names from the top-level `tags` list
    tags: HashSet<String>,
    /// Link path -> operationId it targets, checked once all operations are known
    link_targets: Vec<(String, String)>,
    depth: usize,
}

/// Validates one document
pub struct Validator<'a> {
    document: &'a Document,
    options: ValidationOptions,
    components: Option<&'a Extendable<Components>>,
    /// Encoded registry, attached to schemas when checking values
    components_json: Option<Value>,
    state: ValidationState,
}

/// Check signature for a value that may sit behind a reference
type Check<'a, T> = fn(&mut Validator<'a>, &'a T, &str);

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

static URL_BASE: Lazy<Url> = Lazy::new(|| Url::parse("http://localhost/").expect("base url"));

impl<'a> Validator<'a> {
    pub fn new(document: &'a Document, options: ValidationOptions) -> Self {
        let components = document.spec().and_then(|root| root.components.as_ref());
        let components_json = components.and_then(|c| codec::to_value(c).ok());

        Self {
            document,
            options,
            components,
            components_json,
            state: ValidationState::default(),
        }
    }

    pub fn options(&self) -> &ValidationOptions {
        &self.options
    }

    /// Run every rule and return all findings
    pub fn validate(mut self) -> ValidationErrors {
        self.check_document();
        self.check_link_targets();

        debug!(errors = self.state.errors.len(), "validation finished");
        self.state.errors
    }

    /// Check an arbitrary value against a component schema
    ///
    /// `reference` must name an entry of `#/components/schemas`. Resolution
    /// failures are returned as errors; mismatches as [`Error::Validation`].
    pub fn validate_data(&self, reference: &str, value: &Value) -> Result<()> {
        RefOrSpec::<Schema>::from_ref(reference).resolve(self.components)?;

        let schema = serde_json::json!({ "$ref": reference });
        let mut errors = ValidationErrors::new();
        for (at, message) in self.value_mismatches(&schema, value) {
            errors.error(at, ValidationCode::InvalidValue, message);
        }
        errors.into_result()
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    fn report(&mut self, path: &str, code: ValidationCode, message: impl Into<String>) {
        trace!(path, %code, "finding");
        self.state.errors.error(path, code, message);
    }

    fn check_extensions(&mut self, extensions: &Extensions, path: &str) {
        if self.options.allow_extension_name_without_prefix {
            return;
        }
        for name in extensions.keys() {
            if !is_extension_name(name) {
                self.report(
                    &join(path, name),
                    ValidationCode::ExtensionPrefix,
                    format!("unknown field '{}'; extensions must start with '{}'", name, EXTENSION_PREFIX),
                );
            }
        }
    }

    /// Check an envelope's extensions and hand out its payload
    fn open<T>(&mut self, envelope: &'a Extendable<T>, path: &str) -> Option<&'a T> {
        self.check_extensions(&envelope.extensions, path);
        envelope.spec()
    }

    fn require(&mut self, present: bool, path: &str, field: &str) {
        if !present {
            self.report(
                &join(path, field),
                ValidationCode::MissingField,
                format!("{} is required", field),
            );
        }
    }

    fn exclusive(&mut self, both: bool, path: &str, first: &str, second: &str) {
        if both {
            self.report(
                path,
                ValidationCode::MutuallyExclusive,
                format!("{} and {} are mutually exclusive", first, second),
            );
        }
    }

    fn check_url(&mut self, url: Option<&str>, path: &str) {
        if let Some(url) = url {
            if !is_url(url) {
                self.report(path, ValidationCode::InvalidUrl, format!("'{}' is not a valid URL", url));
            }
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Run `walk` one level deeper, unless the depth limit is reached
    fn nested(&mut self, path: &str, walk: impl FnOnce(&mut Self)) {
        if self.state.depth >= self.options.max_depth {
            let message = format!("nesting exceeds {} levels", self.options.max_depth);
            self.report(path, ValidationCode::MaxDepthExceeded, message);
            return;
        }
        self.state.depth += 1;
        walk(self);
        self.state.depth -= 1;
    }

    /// The value a cell stands for, if it still needs validating here
    fn follow<T: Component>(&mut self, cell: &'a RefOrSpec<T>, path: &str) -> Option<&'a T> {
        let reference = match cell.get_ref() {
            Some(reference) => reference.reference.as_str(),
            None => {
                if cell.is_empty() {
                    self.report(path, ValidationCode::UnresolvedReference, Error::SpecNotFound.to_string());
                }
                return cell.get_spec();
            }
        };

        // A wrong category is a property of this site, not of the identifier
        let key = match ComponentRef::parse(reference) {
            Ok(target) if target.category != T::CATEGORY => {
                let err = Error::UnexpectedComponentType {
                    reference: reference.to_string(),
                    expected: T::CATEGORY,
                    found: target.category,
                };
                self.report(path, ValidationCode::UnresolvedReference, err.to_string());
                return None;
            }
            // Aliases such as `#/components/paths/X` share the canonical key
            Ok(target) => target.to_string(),
            Err(_) => reference.to_string(),
        };

        if !self.state.visited.insert(key) {
            return None;
        }

        match cell.resolve(self.components) {
            Ok(value) => Some(value),
            Err(err) => {
                self.report(path, ValidationCode::UnresolvedReference, err.to_string());
                None
            }
        }
    }

    /// Follow a cell and run `check` on whatever it stands for
    fn walk_cell<T: Component>(&mut self, cell: &'a RefOrSpec<T>, path: &str, check: Check<'a, T>) {
        if let Some(value) = self.follow(cell, path) {
            self.nested(path, |v| check(v, value, path));
        }
    }

    /// Resolve without recording anything; for cross-field rules
    fn quiet<T: Component>(&self, cell: &'a RefOrSpec<T>) -> Option<&'a T> {
        cell.resolve(self.components).ok()
    }

    fn check_link_targets(&mut self) {
        let targets = std::mem::take(&mut self.state.link_targets);
        for (path, operation_id) in targets {
            if !self.state.operation_ids.contains_key(&operation_id) {
                self.report(
                    &join(&path, "operationId"),
                    ValidationCode::InvalidValue,
                    format!("no operation has operationId '{}'", operation_id),
                );
            }
        }
    }

    // =========================================================================
    // Values against schemas
    // =========================================================================

    /// Check `value` against `schema` (an encoded schema or `$ref`)
    ///
    /// Returns `(instance path, message)` per mismatch. Schemas whose
    /// references do not all resolve are skipped; those are reported by
    /// the reference rules.
    fn value_mismatches(&self, schema: &Value, value: &Value) -> Vec<(String, String)> {
        let mut root = match schema {
            Value::Object(fields) => fields.clone(),
            Value::Bool(true) => return Vec::new(),
            Value::Bool(false) => return vec![(String::new(), "no value is allowed".to_string())],
            _ => return Vec::new(),
        };
        if !self.references_are_sound(schema) {
            trace!("skipping value check, schema has unresolvable references");
            return Vec::new();
        }

        root.remove("$id");
        root.remove("$schema");
        if let Some(components) = &self.components_json {
            root.insert("components".to_string(), components.clone());
        }
        let root = Value::Object(root);

        let compiled = match JSONSchema::options()
            .with_draft(Draft::Draft202012)
            .compile(&root)
        {
            Ok(compiled) => compiled,
            Err(err) => {
                debug!(error = %err, "schema does not compile, skipping value check");
                return Vec::new();
            }
        };

        let mismatches: Vec<(String, String)> = match compiled.validate(value) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| (err.instance_path.to_string(), err.to_string()))
                .collect(),
        };
        mismatches
    }

    /// Whether every internal reference reachable from `schema` resolves
    fn references_are_sound(&self, schema: &Value) -> bool {
        let mut pending = vec![schema];
        let mut seen = HashSet::new();

        while let Some(node) = pending.pop() {
            let mut references = Vec::new();
            collect_references(node, &mut references);

            for reference in references {
                if !seen.insert(reference) {
                    continue;
                }
                if RefOrSpec::<Schema>::from_ref(reference)
                    .resolve(self.components)
                    .is_err()
                {
                    return false;
                }
                let target = reference
                    .strip_prefix("#/components")
                    .and_then(|pointer| self.components_json.as_ref()?.pointer(pointer));
                if let Some(target) = target {
                    pending.push(target);
                }
            }
        }

        true
    }

    /// Report mismatches of `value` against `schema` under `path`
    fn check_value(&mut self, schema: &Value, value: &Value, path: &str, code: ValidationCode) {
        for (at, message) in self.value_mismatches(schema, value) {
            let message = if at.is_empty() {
                message
            } else {
                format!("{} (at {})", message, at)
            };
            self.report(path, code, message);
        }
    }
}

fn collect_references<'v>(value: &'v Value, out: &mut Vec<&'v str>) {
    match value {
        Value::Object(fields) => {
            if let Some(Value::String(reference)) = fields.get("$ref") {
                out.push(reference);
            }
            for child in fields.values() {
                collect_references(child, out);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_references(child, out);
            }
        }
        _ => {}
    }
}

/// Append a field name to a path
pub(crate) fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

/// Append an array index to a path
pub(crate) fn index(path: &str, i: usize) -> String {
    format!("{}[{}]", path, i)
}

/// Absolute URL, or a relative reference that resolves against one
pub(crate) fn is_url(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    Url::parse(value).is_ok() || URL_BASE.join(value).is_ok()
}

pub(crate) fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}
