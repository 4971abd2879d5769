//! JSON schemas of the typed procedures.
//!
//! `generate-schema` writes these to `procedure_schema.json` so API clients
//! can validate calls without reading Rust types.

use schemars::{JsonSchema, schema_for};
use serde::Serialize;
use serde_json::Value;

use crate::models::{GreetInput, GreetOutput, PrivateDataOutput, RandomGreetingOutput};
use crate::routers::AppRouter;

/// A procedure with its metadata and schemas
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureSchema {
    pub name: String,
    pub description: String,
    pub protected: bool,
    /// `None` for procedures that take no input
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    pub output_schema: Value,
}

impl ProcedureSchema {
    fn new(
        name: &str,
        description: &str,
        input_schema: Option<Value>,
        output_schema: Value,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            protected: AppRouter::is_protected(name),
            input_schema,
            output_schema,
        }
    }
}

/// Generates a trimmed schema for `T`: no `$schema` or `title` keys.
#[must_use]
pub fn schema_value<T: JsonSchema>() -> Value {
    let mut schema = schema_for!(T).to_value();
    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
}

/// Schemas of every procedure owned by this crate. `todo.*` is described by its collaborator.
#[must_use]
pub fn procedure_schemas() -> Vec<ProcedureSchema> {
    vec![
        ProcedureSchema::new(
            "healthCheck",
            "Liveness probe. Always returns \"OK\".",
            None,
            schema_value::<String>(),
        ),
        ProcedureSchema::new(
            "privateData",
            "Returns a fixed message together with the user of the calling session. \
             Requires authentication.",
            None,
            schema_value::<PrivateDataOutput>(),
        ),
        ProcedureSchema::new(
            "hello.greet",
            "Greets the given name, or the World when the name is missing or empty, \
             and stamps the response time.",
            Some(schema_value::<GreetInput>()),
            schema_value::<GreetOutput>(),
        ),
        ProcedureSchema::new(
            "hello.randomGreeting",
            "Returns a randomly chosen greeting and a welcome message built from it.",
            None,
            schema_value::<RandomGreetingOutput>(),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greet_input_schema() {
        let schema = schema_value::<GreetInput>();
        assert_eq!(schema["type"], "object");
        assert!(schema.get("title").is_none());
        assert!(schema.get("$schema").is_none());
        assert!(schema["properties"]["name"].is_object());
        // name is optional
        let required = schema.get("required").and_then(Value::as_array);
        assert!(required.is_none_or(|r| !r.contains(&Value::from("name"))));
    }

    #[test]
    fn test_only_private_data_is_protected() {
        let protected: Vec<String> = procedure_schemas()
            .into_iter()
            .filter(|p| p.protected)
            .map(|p| p.name)
            .collect();
        assert_eq!(protected, vec!["privateData".to_string()]);
    }
}
