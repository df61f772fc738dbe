//! Root, info, server, tag and components rules

use once_cell::sync::Lazy;
use regex::Regex;

use crate::components::{is_valid_component_name, Category, Component, ComponentMap, Components};
use crate::extendable::Extendable;
use crate::reference::ComponentRef;
use crate::spec::{Contact, ExternalDocs, Info, License, Server, Tag};

use super::{index, is_email, join, Check, ValidationCode, Validator};

static SERVER_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("server variable pattern"));

impl<'a> Validator<'a> {
    pub(super) fn check_document(&mut self) {
        let document = self.document;
        let root = match self.open(document, "") {
            Some(root) => root,
            None => {
                self.report("", ValidationCode::MissingField, "document is empty");
                return;
            }
        };

        if root.openapi.is_empty() {
            self.report("openapi", ValidationCode::MissingField, "openapi is required");
        } else {
            match semver::Version::parse(&root.openapi) {
                Ok(version) if version.major == 3 => {}
                Ok(version) => self.report(
                    "openapi",
                    ValidationCode::InvalidVersion,
                    format!("unsupported version {}, expected 3.x.y", version),
                ),
                Err(err) => self.report(
                    "openapi",
                    ValidationCode::InvalidVersion,
                    format!("'{}' is not a semantic version: {}", root.openapi, err),
                ),
            }
        }

        match &root.info {
            Some(info) => self.check_info(info, "info"),
            None => self.report("info", ValidationCode::MissingField, "info is required"),
        }

        if let Some(dialect) = &root.json_schema_dialect {
            if url::Url::parse(dialect).is_err() {
                self.report(
                    "jsonSchemaDialect",
                    ValidationCode::InvalidUrl,
                    format!("'{}' is not an absolute URL", dialect),
                );
            }
        }

        if root.paths.is_none() && root.components.is_none() && root.webhooks.is_none() {
            self.report(
                "",
                ValidationCode::MissingField,
                "at least one of paths, components or webhooks is required",
            );
        }

        for (i, server) in root.servers.iter().flatten().enumerate() {
            self.check_server(server, &index("servers", i));
        }

        self.check_tags(root.tags.as_deref().unwrap_or_default());

        if let Some(components) = &root.components {
            self.check_components(components, "components");
        }

        if let Some(paths) = &root.paths {
            self.check_paths(paths, "paths");
        }

        for (name, item) in root.webhooks.iter().flatten() {
            self.walk_cell(item, &join("webhooks", name), Self::check_path_item);
        }

        for (i, requirement) in root.security.iter().flatten().enumerate() {
            self.check_security_requirement(requirement, &index("security", i));
        }

        if let Some(docs) = &root.external_docs {
            self.check_external_docs(docs, "externalDocs");
        }
    }

    fn check_info(&mut self, info: &'a Extendable<Info>, path: &str) {
        let Some(spec) = self.open(info, path) else { return };

        self.require(!spec.title.is_empty(), path, "title");
        self.require(!spec.version.is_empty(), path, "version");
        self.check_url(spec.terms_of_service.as_deref(), &join(path, "termsOfService"));

        if let Some(contact) = &spec.contact {
            self.check_contact(contact, &join(path, "contact"));
        }
        if let Some(license) = &spec.license {
            self.check_license(license, &join(path, "license"));
        }
    }

    fn check_contact(&mut self, contact: &'a Extendable<Contact>, path: &str) {
        let Some(spec) = self.open(contact, path) else { return };

        self.check_url(spec.url.as_deref(), &join(path, "url"));
        if let Some(email) = &spec.email {
            if !is_email(email) {
                self.report(
                    &join(path, "email"),
                    ValidationCode::InvalidEmail,
                    format!("'{}' is not a valid email address", email),
                );
            }
        }
    }

    fn check_license(&mut self, license: &'a Extendable<License>, path: &str) {
        let Some(spec) = self.open(license, path) else { return };

        self.require(!spec.name.is_empty(), path, "name");
        self.exclusive(
            spec.identifier.is_some() && spec.url.is_some(),
            path,
            "identifier",
            "url",
        );
        self.check_url(spec.url.as_deref(), &join(path, "url"));
    }

    pub(super) fn check_external_docs(&mut self, docs: &'a Extendable<ExternalDocs>, path: &str) {
        let Some(spec) = self.open(docs, path) else { return };

        if spec.url.is_empty() {
            self.require(false, path, "url");
        } else {
            self.check_url(Some(&spec.url), &join(path, "url"));
        }
    }

    pub(super) fn check_server(&mut self, server: &'a Extendable<Server>, path: &str) {
        let Some(spec) = self.open(server, path) else { return };

        self.require(!spec.url.is_empty(), path, "url");

        let variables_path = join(path, "variables");
        for (name, variable) in spec.variables.iter().flatten() {
            let variable_path = join(&variables_path, name);
            let Some(variable) = self.open(variable, &variable_path) else { continue };

            self.require(!variable.default.is_empty(), &variable_path, "default");
            match &variable.enum_values {
                Some(values) if values.is_empty() => self.report(
                    &join(&variable_path, "enum"),
                    ValidationCode::InvalidValue,
                    "enum must not be empty",
                ),
                Some(values) if !variable.default.is_empty() && !values.contains(&variable.default) => {
                    self.report(
                        &join(&variable_path, "default"),
                        ValidationCode::InvalidValue,
                        format!("default '{}' is not one of the enum values", variable.default),
                    )
                }
                _ => {}
            }
        }

        for captures in SERVER_VARIABLE.captures_iter(&spec.url) {
            let name = &captures[1];
            let defined = spec
                .variables
                .as_ref()
                .map_or(false, |variables| variables.contains_key(name));
            if !defined {
                self.report(
                    &join(path, "url"),
                    ValidationCode::InvalidValue,
                    format!("server variable '{}' is not defined", name),
                );
            }
        }
    }

    fn check_tags(&mut self, tags: &'a [Extendable<Tag>]) {
        for (i, tag) in tags.iter().enumerate() {
            let path = index("tags", i);
            let Some(spec) = self.open(tag, &path) else { continue };

            if spec.name.is_empty() {
                self.require(false, &path, "name");
            } else if !self.state.tags.insert(spec.name.clone()) {
                self.report(
                    &join(&path, "name"),
                    ValidationCode::DuplicateTag,
                    format!("tag '{}' is declared more than once", spec.name),
                );
            }

            if let Some(docs) = &spec.external_docs {
                self.check_external_docs(docs, &join(&path, "externalDocs"));
            }
        }
    }

    fn check_components(&mut self, components: &'a Extendable<Components>, path: &str) {
        let Some(spec) = self.open(components, path) else { return };

        // Every entry counts as visited before any is walked
        for category in Category::ALL {
            for name in spec.names(category) {
                let reference = ComponentRef::new(category, name).to_string();
                self.state.visited.insert(reference);
            }
        }

        self.walk_table(spec.schemas.as_ref(), path, Self::check_schema);
        self.walk_table(spec.responses.as_ref(), path, Self::check_response);
        self.walk_table(spec.parameters.as_ref(), path, Self::check_parameter);
        self.walk_table(spec.examples.as_ref(), path, Self::check_example);
        self.walk_table(spec.request_bodies.as_ref(), path, Self::check_request_body);
        self.walk_table(spec.headers.as_ref(), path, Self::check_header);
        self.walk_table(spec.security_schemes.as_ref(), path, Self::check_security_scheme);
        self.walk_table(spec.links.as_ref(), path, Self::check_link);
        self.walk_table(spec.callbacks.as_ref(), path, Self::check_callback);
        self.walk_table(spec.path_items.as_ref(), path, Self::check_path_item);
    }

    /// Validate one category table; reference entries only need to resolve
    fn walk_table<T: Component>(&mut self, table: Option<&'a ComponentMap<T>>, path: &str, check: Check<'a, T>) {
        let Some(table) = table else { return };
        let table_path = join(path, T::CATEGORY.as_str());

        for (name, cell) in table {
            let entry_path = join(&table_path, name);

            if !is_valid_component_name(name) {
                self.report(
                    &entry_path,
                    ValidationCode::InvalidComponentName,
                    format!("'{}' does not match ^[a-zA-Z0-9.\\-_]+$", name),
                );
            }

            if cell.is_ref() {
                if let Err(err) = cell.resolve(self.components) {
                    self.report(&entry_path, ValidationCode::UnresolvedReference, err.to_string());
                }
            } else if let Some(value) = cell.get_spec() {
                self.nested(&entry_path, |v| check(v, value, &entry_path));
            } else {
                self.report(
                    &entry_path,
                    ValidationCode::UnresolvedReference,
                    crate::Error::SpecNotFound.to_string(),
                );
            }
        }
    }
}
