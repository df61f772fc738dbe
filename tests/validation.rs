//! End-to-end validation of whole documents

use openapi_model::{
    Document, Error, Settings, ValidationCode, ValidationErrors, ValidationOptions, Validator,
};
use rstest::rstest;
use serde_json::{json, Value};

const PETSTORE_JSON: &str = include_str!("fixtures/petstore.json");
const PETSTORE_YAML: &str = include_str!("fixtures/petstore.yaml");

fn raw_petstore() -> Value {
    serde_json::from_str(PETSTORE_JSON).unwrap()
}

fn validate(raw: &Value, options: ValidationOptions) -> ValidationErrors {
    let document = Document::from_json(&raw.to_string()).unwrap();
    Validator::new(&document, options).validate()
}

fn findings(errors: &ValidationErrors) -> Vec<(&str, ValidationCode)> {
    errors.iter().map(|e| (e.path.as_str(), e.code)).collect()
}

#[test]
fn test_petstore_is_valid() {
    for document in [
        Document::from_json(PETSTORE_JSON).unwrap(),
        Document::from_yaml(PETSTORE_YAML).unwrap(),
    ] {
        let errors = Validator::new(&document, ValidationOptions::default()).validate();
        assert!(errors.is_empty(), "{}", errors.format_all());
    }
}

#[test]
fn test_every_defect_is_reported() {
    let mut raw = raw_petstore();
    let item = &mut raw["paths"]["/pets/{petId}"];
    item["get"]["tags"] = json!(["store"]);
    item["delete"]["operationId"] = json!("listPets");
    item["delete"]["responses"]["204"]["content"] = json!({
        "application/json": {"schema": {"$ref": "#/components/schemas/Missing"}}
    });

    let errors = validate(&raw, ValidationOptions::default());
    assert_eq!(
        findings(&errors),
        vec![
            ("paths./pets/{petId}.get.tags[0]", ValidationCode::UndefinedTag),
            ("paths./pets/{petId}.delete.operationId", ValidationCode::DuplicateOperationId),
            (
                "paths./pets/{petId}.delete.responses.204.content.application/json.schema",
                ValidationCode::UnresolvedReference
            ),
        ]
    );
    assert!(errors.format_all().ends_with("3 error(s)"));
}

#[test]
fn test_independent_defects_reported_together() {
    let mut raw = raw_petstore();
    raw["paths"]["/pets"]["get"]["responses"]["200"]
        .as_object_mut()
        .unwrap()
        .remove("description");
    raw["components"]["parameters"]["PetId"]["required"] = json!(false);
    raw["paths"]["/pets/{petId}"]["delete"]["operationId"] = json!("listPets");

    let errors = validate(&raw, ValidationOptions::default());
    assert_eq!(
        findings(&errors),
        vec![
            ("components.parameters.PetId.required", ValidationCode::InvalidValue),
            ("paths./pets.get.responses.200.description", ValidationCode::MissingField),
            ("paths./pets/{petId}.delete.operationId", ValidationCode::DuplicateOperationId),
        ]
    );
}

#[test]
fn test_validate_fails_with_all_findings() {
    let mut raw = raw_petstore();
    raw["info"]["contact"]["email"] = json!("not-an-email");
    raw["servers"][0]["variables"]["environment"]["default"] = json!("prod");

    let document = Document::from_json(&raw.to_string()).unwrap();
    match document.validate(ValidationOptions::default()) {
        Err(Error::Validation(errors)) => {
            assert_eq!(
                findings(&errors),
                vec![
                    ("info.contact.email", ValidationCode::InvalidEmail),
                    ("servers[0].variables.environment.default", ValidationCode::InvalidValue),
                ]
            );
        }
        other => panic!("Expected validation errors, got {:?}", other),
    }
}

// =============================================================================
// Options
// =============================================================================

fn undefined_tag(raw: &mut Value) {
    raw["paths"]["/pets"]["get"]["tags"] = json!(["store"]);
}

fn body_on_delete(raw: &mut Value) {
    raw["paths"]["/pets/{petId}"]["delete"]["requestBody"] = json!({"$ref": "#/components/requestBodies/NewPet"});
}

fn unprefixed_extension(raw: &mut Value) {
    raw["audience"] = json!("public");
}

fn bad_example(raw: &mut Value) {
    raw["paths"]["/pets/{petId}"]["get"]["responses"]["200"]["content"]["application/json"]["example"]["status"] =
        json!("lost");
}

fn bad_default(raw: &mut Value) {
    raw["components"]["schemas"]["Pet"]["properties"]["status"]["default"] = json!("unknown");
}

#[rstest]
#[case::undefined_tag(
    undefined_tag,
    |o: &mut ValidationOptions| o.allow_undefined_tags_in_operation = true,
    "paths./pets.get.tags[0]",
    ValidationCode::UndefinedTag
)]
#[case::request_body_on_delete(
    body_on_delete,
    |o: &mut ValidationOptions| o.allow_request_body_for_get_and_delete = true,
    "paths./pets/{petId}.delete.requestBody",
    ValidationCode::RequestBodyNotAllowed
)]
#[case::extension_prefix(
    unprefixed_extension,
    |o: &mut ValidationOptions| o.allow_extension_name_without_prefix = true,
    "audience",
    ValidationCode::ExtensionPrefix
)]
#[case::example_mismatch(
    bad_example,
    |o: &mut ValidationOptions| o.skip_examples = true,
    "paths./pets/{petId}.get.responses.200.content.application/json.example",
    ValidationCode::ExampleMismatch
)]
#[case::default_mismatch(
    bad_default,
    |o: &mut ValidationOptions| o.skip_default_values = true,
    "components.schemas.Pet.properties.status.default",
    ValidationCode::DefaultMismatch
)]
fn test_option_silences_rule(
    #[case] mutate: fn(&mut Value),
    #[case] allow: fn(&mut ValidationOptions),
    #[case] path: &str,
    #[case] code: ValidationCode,
) {
    let mut raw = raw_petstore();
    mutate(&mut raw);

    let strict = validate(&raw, ValidationOptions::default());
    assert_eq!(findings(&strict), vec![(path, code)], "{}", strict);

    let mut options = ValidationOptions::default();
    allow(&mut options);
    let relaxed = validate(&raw, options);
    assert!(relaxed.is_empty(), "{}", relaxed);
}

#[test]
fn test_max_depth_option() {
    let raw = raw_petstore();
    let options = ValidationOptions {
        max_depth: 2,
        ..Default::default()
    };
    let errors = validate(&raw, options);
    assert!(errors.has_code(ValidationCode::MaxDepthExceeded));
    assert!(errors.with_code(ValidationCode::MaxDepthExceeded).all(|e| e.message.contains("2 levels")));
}

#[test]
fn test_options_from_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("openapi.toml");
    std::fs::write(&path, "[validation]\nallow_undefined_tags_in_operation = true\n").unwrap();

    let settings = Settings::load_from(Some(&path)).unwrap();
    let mut raw = raw_petstore();
    undefined_tag(&mut raw);

    assert!(validate(&raw, settings.validation).is_empty());
}

// =============================================================================
// Data against component schemas
// =============================================================================

#[test]
fn test_validate_data_against_component() {
    let document = Document::from_json(PETSTORE_JSON).unwrap();
    let validator = Validator::new(&document, ValidationOptions::default());

    validator
        .validate_data("#/components/schemas/Pet", &json!({"id": 3, "name": "Tom", "tag": null}))
        .unwrap();

    match validator.validate_data("#/components/schemas/Pet", &json!({"id": "three"})) {
        Err(Error::Validation(errors)) => assert!(errors.len() >= 2, "{}", errors),
        other => panic!("Expected validation errors, got {:?}", other),
    }

    let missing = validator.validate_data("#/components/schemas/Owner", &json!({}));
    assert!(matches!(missing, Err(Error::NotFound { .. })));
}
