//! Paths, path items and callbacks

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::extendable::{is_extension_name, Extendable, KnownFields};
use crate::reference::RefOrSpec;

use super::{Operation, Parameter, Server};

/// Relative endpoint paths -> path items
///
/// Every key that is not an extension is a path, so malformed paths stay in
/// the typed map where the validator can see them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Paths {
    pub paths: IndexMap<String, RefOrSpec<Extendable<PathItem>>>,
}

impl KnownFields for Paths {
    const FIELDS: &'static [&'static str] = &[];

    fn is_known_field(name: &str) -> bool {
        !is_extension_name(name)
    }
}

impl Paths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, path: impl Into<String>, item: impl Into<RefOrSpec<Extendable<PathItem>>>) {
        self.paths.insert(path.into(), item.into());
    }
}

/// Operations available on a single path
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Extendable<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Extendable<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Extendable<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Extendable<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Extendable<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Extendable<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<Extendable<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Extendable<Operation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servers: Option<Vec<Extendable<Server>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RefOrSpec<Extendable<Parameter>>>>,
}

impl KnownFields for PathItem {
    const FIELDS: &'static [&'static str] = &[
        "summary",
        "description",
        "get",
        "put",
        "post",
        "delete",
        "options",
        "head",
        "patch",
        "trace",
        "servers",
        "parameters",
    ];
}

impl PathItem {
    /// Defined operations keyed by lowercase HTTP method, in a fixed order
    pub fn operations(&self) -> impl Iterator<Item = (&'static str, &Extendable<Operation>)> {
        [
            ("get", &self.get),
            ("put", &self.put),
            ("post", &self.post),
            ("delete", &self.delete),
            ("options", &self.options),
            ("head", &self.head),
            ("patch", &self.patch),
            ("trace", &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

/// Runtime expression -> path item describing the out-of-band request
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Callback {
    pub paths: IndexMap<String, RefOrSpec<Extendable<PathItem>>>,
}

impl KnownFields for Callback {
    const FIELDS: &'static [&'static str] = &[];

    fn is_known_field(name: &str) -> bool {
        !is_extension_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths_split_extensions_by_prefix() {
        let paths: Extendable<Paths> = serde_json::from_value(json!({
            "/pets": {"get": {"responses": {"200": {"description": "ok"}}}},
            "pets": {},
            "x-internal": true
        }))
        .unwrap();

        let spec = paths.spec().unwrap();
        assert_eq!(spec.paths.len(), 2);
        assert!(spec.paths.contains_key("pets"));
        assert_eq!(paths.extensions.len(), 1);
    }

    #[test]
    fn test_operations_order() {
        let item: PathItem = serde_json::from_value(json!({
            "post": {},
            "get": {},
            "trace": {}
        }))
        .unwrap();
        let methods: Vec<_> = item.operations().map(|(m, _)| m).collect();
        assert_eq!(methods, vec!["get", "post", "trace"]);
    }
}
