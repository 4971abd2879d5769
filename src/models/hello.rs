use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input of `hello.greet`
#[derive(Debug, Default, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GreetInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Name to greet; missing or empty greets the World")]
    pub name: Option<String>,
}

/// Output of `hello.greet`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GreetOutput {
    #[schemars(description = "Greeting message, e.g. \"Hello, Ann!\"")]
    pub message: String,
    #[schemars(description = "ISO-8601 instant at which the greeting was built")]
    pub timestamp: String,
}

/// Output of `hello.randomGreeting`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RandomGreetingOutput {
    #[schemars(description = "One of Hello, Hi, Hey, Greetings or Salutations")]
    pub greeting: String,
    #[schemars(description = "Welcome message built from the greeting")]
    pub message: String,
}
