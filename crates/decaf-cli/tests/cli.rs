//! CLI integration tests: drive the subcommand entry points against the
//! shipped model definitions and temporary data files.

use std::path::PathBuf;

use decaf_cli::compile::{run_compile, CompileArgs};
use decaf_cli::config::CliConfig;
use decaf_cli::validate::{run_validate, ValidateArgs};
use decaf_cli::{EXIT_INVALID, EXIT_OK};
use serde_json::{json, Value};

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn model_file() -> PathBuf {
    repo_root().join("models/for_angular.model.ts")
}

fn valid_item() -> Value {
    json!({
        "id": 7,
        "name": "Jane",
        "category": {"name": "Books", "description": "Paper things"},
        "birthdate": "1990-04-01",
        "email": "jane@example.com",
        "website": "https://example.com",
        "password": "Str0ng!pass",
        "user": {"username": "jane", "passwordRepeat": "Str0ng!pass"}
    })
}

fn validate(args: &ValidateArgs, config: &CliConfig) -> (u8, Value) {
    let mut out = Vec::new();
    let code = run_validate(args, config, "".as_bytes(), &mut out).unwrap();
    (code, serde_json::from_slice(&out).unwrap())
}

#[test]
fn test_compile_shipped_models() {
    let mut out = Vec::new();
    let args = CompileArgs {
        schema: Some(model_file()),
    };
    assert_eq!(run_compile(&args, &CliConfig::default(), &mut out).unwrap(), EXIT_OK);

    let json: Value = serde_json::from_slice(&out).unwrap();
    let names: Vec<&str> = json["models"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["CategoryModel", "ForAngularModel", "UserModel"]);
}

#[test]
fn test_validate_batch_with_continue_policy() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("items.json");
    let mut bad = valid_item();
    bad["category"]["description"] = json!("tiny");
    bad["website"] = json!("nope");
    std::fs::write(&data, serde_json::to_string(&json!([valid_item(), bad])).unwrap()).unwrap();

    let args = ValidateArgs {
        schema: Some(model_file()),
        model: Some("ForAngularModel".into()),
        data: Some(data),
        exceptions: None,
        continue_on_fail: true,
    };
    let (code, out) = validate(&args, &CliConfig::default());
    assert_eq!(code, EXIT_INVALID);

    let items = out.as_array().unwrap();
    assert_eq!(items[0], json!({"json": valid_item()}));
    let paths: Vec<&str> = items[1]["error"]["report"]["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["category.description", "website"]);
    assert_eq!(items[1]["pairedItem"], json!({"item": 1}));
}

#[test]
fn test_config_file_drives_validation() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("decaf.yaml"),
        format!(
            "schema: {}\nmodel: ForAngularModel\nexceptions: website, category.description\n",
            model_file().display()
        ),
    )
    .unwrap();
    let data = dir.path().join("item.json");
    let mut item = valid_item();
    item["category"]["description"] = json!("tiny");
    item["website"] = json!("nope");
    std::fs::write(&data, item.to_string()).unwrap();

    let config = CliConfig::load(None, dir.path()).unwrap();
    let args = ValidateArgs {
        data: Some(data),
        ..ValidateArgs::default()
    };
    let (code, out) = validate(&args, &config);
    assert_eq!(code, EXIT_OK);
    assert_eq!(out, json!([{"json": item}]));
}

#[test]
fn test_throw_policy_reports_item_index() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("items.json");
    let mut bad = valid_item();
    bad["user"]["passwordRepeat"] = json!("different");
    std::fs::write(&data, json!([valid_item(), valid_item(), bad]).to_string()).unwrap();

    let args = ValidateArgs {
        schema: Some(model_file()),
        model: Some("ForAngularModel".into()),
        data: Some(data),
        ..ValidateArgs::default()
    };
    let (code, out) = validate(&args, &CliConfig::default());
    assert_eq!(code, EXIT_INVALID);
    assert_eq!(out["error"]["context"]["itemIndex"], 2);
    assert_eq!(
        out["error"]["report"]["errors"][0]["constraintKind"],
        "EqualsPath"
    );
}
