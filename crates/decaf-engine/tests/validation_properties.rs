//! Integration tests: validation behavior of the full pipeline, from
//! definition text through routing.

use std::path::PathBuf;

use decaf_core::ValidationReport;
use decaf_engine::{Engine, EngineError, RoutedOutcome, ValidationRequest};
use decaf_schema::ExceptionSet;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

const SIGNUP: &str = r#"
    @model()
    export class CategoryModel extends Model {
      @required()
      name!: string;

      @required()
      @minlength(5)
      description!: string;
    }

    @model()
    export class ForAngularModel extends Model {
      @required()
      @min(1)
      @max(100)
      id!: number;

      @required()
      name!: string;

      category?: CategoryModel;

      @required()
      @date('yyyy-MM-dd')
      birthdate!: Date;

      @required()
      @email()
      email!: string;

      @url()
      website?: string;
    }

    @model()
    export class Credentials extends Model {
      @required()
      @eq("passwordRepeat")
      password!: string;

      @required()
      passwordRepeat!: string;
    }

    @model()
    export class Handle extends Model {
      @minlength(5)
      @pattern("^[a-z]+$")
      slug!: string;
    }
"#;

fn engine() -> Engine {
    let mut engine = Engine::new();
    engine.compile(SIGNUP).unwrap();
    engine
}

fn validate(model: &str, exceptions: &str, data: Value) -> ValidationReport {
    engine()
        .validate(model, &ExceptionSet::parse(exceptions), &data)
        .unwrap()
}

fn kinds_at(report: &ValidationReport) -> Vec<(String, String)> {
    report
        .errors()
        .iter()
        .map(|e| (e.path.as_str().to_string(), e.constraint_kind.clone()))
        .collect()
}

fn pair(path: &str, kind: &str) -> (String, String) {
    (path.to_string(), kind.to_string())
}

fn valid_signup() -> Value {
    json!({
        "id": 42,
        "name": "Jane",
        "category": {"name": "Books", "description": "Paper things"},
        "birthdate": "1990-04-01",
        "email": "jane@example.com",
        "website": "https://example.com"
    })
}

#[test]
fn test_valid_data_passes() {
    let report = validate("ForAngularModel", "", valid_signup());
    assert!(report.is_valid(), "{report}");
    assert!(report.errors().is_empty());
}

#[test]
fn test_missing_required_reports_once() {
    let mut data = valid_signup();
    data.as_object_mut().unwrap().remove("email");
    let report = validate("ForAngularModel", "", data);
    assert_eq!(kinds_at(&report), vec![pair("email", "Required")]);
}

#[test]
fn test_excluded_fields_never_reported() {
    let mut data = valid_signup();
    data["website"] = json!("not a url");
    data["category"] = json!({"name": "Books", "description": "tiny"});
    let report = validate("ForAngularModel", "website, category.description", data.clone());
    assert!(report.is_valid(), "{report}");

    let report = validate("ForAngularModel", "category", data);
    assert_eq!(kinds_at(&report), vec![pair("website", "Pattern")]);
}

#[test]
fn test_all_failures_on_one_field_reported() {
    let report = validate("Handle", "", json!({"slug": "A!"}));
    assert_eq!(
        kinds_at(&report),
        vec![pair("slug", "MinLength"), pair("slug", "Pattern")]
    );
}

#[test]
fn test_cross_field_equality() {
    let report = validate(
        "Credentials",
        "",
        json!({"password": "abc123", "passwordRepeat": "abc124"}),
    );
    assert_eq!(kinds_at(&report), vec![pair("password", "EqualsPath")]);

    let report = validate(
        "Credentials",
        "",
        json!({"password": "abc123", "passwordRepeat": "abc123"}),
    );
    assert!(report.is_valid(), "{report}");
}

#[test]
fn test_nested_model_error_path() {
    let mut data = valid_signup();
    data["category"] = json!({"name": "Books"});
    let report = validate("ForAngularModel", "", data);
    assert_eq!(kinds_at(&report), vec![pair("category.description", "Required")]);
}

#[test]
fn test_end_to_end_four_errors() {
    let data = json!({
        "id": 0,
        "name": "",
        "birthdate": "2024-13-40",
        "email": "not-an-email"
    });
    let report = validate("ForAngularModel", "", data);
    assert_eq!(
        kinds_at(&report),
        vec![
            pair("id", "Min"),
            pair("name", "Required"),
            pair("birthdate", "Pattern"),
            pair("email", "Pattern"),
        ]
    );
}

#[test]
fn test_routing_policies() {
    let mut engine = engine();
    let data = json!({"password": "a", "passwordRepeat": "b"});
    let raised = engine
        .run(ValidationRequest {
            schema: None,
            model: "Credentials",
            exceptions: "",
            data: data.clone(),
            throw_on_fail: true,
        })
        .unwrap()
        .into_result()
        .unwrap_err();
    assert_eq!(raised.report().len(), 1);

    let annotated = engine
        .run(ValidationRequest {
            schema: None,
            model: "Credentials",
            exceptions: "",
            data: data.clone(),
            throw_on_fail: false,
        })
        .unwrap();
    match annotated {
        RoutedOutcome::Annotated { data: d, report } => {
            assert_eq!(d, data);
            assert_eq!(report.len(), 1);
        }
        other => panic!("expected annotated outcome, got {other:?}"),
    }
}

#[test]
fn test_shipped_model_definitions() {
    let text = std::fs::read_to_string(repo_root().join("models/for_angular.model.ts")).unwrap();
    let mut engine = Engine::new();
    engine.compile(&text).unwrap();

    let data = json!({
        "id": 7,
        "name": "Jane",
        "birthdate": "1990-04-01",
        "email": "jane@example.com",
        "password": "Str0ng!pass",
        "user": {"username": "jane", "passwordRepeat": "Str0ng!pass"}
    });
    let report = engine
        .validate("ForAngularModel", &ExceptionSet::new(), &data)
        .unwrap();
    assert!(report.is_valid(), "{report}");

    let mut mismatch = data;
    mismatch["user"]["passwordRepeat"] = json!("Other!pass1");
    let report = engine
        .validate("ForAngularModel", &ExceptionSet::new(), &mismatch)
        .unwrap();
    let kinds: Vec<_> = report.errors().iter().map(|e| e.constraint_kind.as_str()).collect();
    assert_eq!(kinds, vec!["EqualsPath"]);
}

#[test]
fn test_unknown_model_refused() {
    let err = engine()
        .validate("UserModel", &ExceptionSet::new(), &json!({}))
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownModel { .. }));
}

/// Field names of ForAngularModel with their visible required status.
const SIGNUP_FIELDS: [(&str, bool); 6] = [
    ("id", true),
    ("name", true),
    ("category", false),
    ("birthdate", true),
    ("email", true),
    ("website", false),
];

proptest! {
    /// Removing any subset of fields from valid data yields exactly one
    /// Required error per removed required field, and nothing else.
    #[test]
    fn removed_required_fields_reported_once(mask in prop::collection::vec(any::<bool>(), 6)) {
        let mut data = valid_signup();
        let mut expected = Vec::new();
        for ((name, required), remove) in SIGNUP_FIELDS.iter().zip(&mask) {
            if *remove {
                data.as_object_mut().unwrap().remove(*name);
                if *required {
                    expected.push(pair(name, "Required"));
                }
            }
        }
        let report = validate("ForAngularModel", "", data);
        prop_assert_eq!(kinds_at(&report), expected);
    }

    /// No reported path ever lies at or beneath an excluded path.
    #[test]
    fn excluded_paths_never_reported(
        excluded in prop::sample::subsequence(
            vec!["id", "name", "category", "category.name", "category.description", "birthdate", "email", "website"],
            0..=8,
        ),
        id in -10i64..200,
        name in "[a-z]{0,3}",
        description in "[a-z]{0,8}",
        email in "[a-z@.]{0,10}",
    ) {
        let data = json!({
            "id": id,
            "name": name,
            "category": {"name": "", "description": description},
            "birthdate": "2024-13-40",
            "email": email,
            "website": "nope"
        });
        let exceptions = excluded.join(",");
        let report = validate("ForAngularModel", &exceptions, data);
        for error in report.errors() {
            for path in &excluded {
                let excluded_path = decaf_core::FieldPath::new(*path);
                prop_assert!(
                    !error.path.starts_with(&excluded_path),
                    "{} reported although {} is excluded", error.path, path
                );
            }
        }
    }

    /// Validation never touches the input.
    #[test]
    fn data_is_never_modified(id in any::<i64>(), email in ".{0,12}") {
        let data = json!({"id": id, "email": email, "name": null});
        let before = data.clone();
        let _ = validate("ForAngularModel", "", data.clone());
        prop_assert_eq!(data, before);
    }
}
