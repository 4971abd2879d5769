//! Tests for schema generation functionality
#![allow(clippy::unwrap_used, clippy::expect_used)]

use demo_api::schema::procedure_schemas;
use serde_json::Value;

fn procedures() -> Vec<Value> {
    serde_json::to_value(procedure_schemas())
        .expect("schemas should serialize")
        .as_array()
        .cloned()
        .expect("schemas should serialize to an array")
}

fn find(name: &str) -> Value {
    procedures()
        .into_iter()
        .find(|p| p["name"] == name)
        .unwrap_or_else(|| panic!("{name} not found in schema"))
}

#[test]
fn test_schema_lists_every_procedure() {
    let names: Vec<String> = procedures()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        names,
        ["healthCheck", "privateData", "hello.greet", "hello.randomGreeting"]
    );

    for procedure in procedures() {
        let obj = procedure.as_object().unwrap();
        assert!(obj["description"].is_string(), "Procedure description should be a string");
        assert!(obj["protected"].is_boolean());
        assert!(obj["outputSchema"].is_object(), "outputSchema should be an object");
    }
}

#[test]
fn test_greet_schema_structure() {
    let greet = find("hello.greet");
    assert_eq!(greet["protected"], false);

    let input_schema = &greet["inputSchema"];
    assert_eq!(input_schema["type"], "object");
    let name = &input_schema["properties"]["name"];
    assert!(name["description"].is_string());

    let output_props = greet["outputSchema"]["properties"].as_object().unwrap();
    for field in ["message", "timestamp"] {
        assert!(output_props.contains_key(field), "Missing output field: {field}");
    }
    let required = greet["outputSchema"]["required"].as_array().unwrap();
    assert_eq!(required.len(), 2);
}

#[test]
fn test_procedures_without_input_have_no_input_schema() {
    for name in ["healthCheck", "privateData", "hello.randomGreeting"] {
        assert!(find(name).get("inputSchema").is_none(), "{name} takes no input");
    }
}

#[test]
fn test_health_check_and_private_data_schemas() {
    assert_eq!(find("healthCheck")["outputSchema"]["type"], "string");

    let private_data = find("privateData");
    assert_eq!(private_data["protected"], true);
    let props = private_data["outputSchema"]["properties"].as_object().unwrap();
    assert!(props.contains_key("message"));
    assert!(props.contains_key("user"));
}
