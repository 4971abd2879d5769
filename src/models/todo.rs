use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A todo item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Todo {
    pub id: u64,
    pub text: String,
    pub completed: bool,
}

/// Input of `todo.create`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateTodoInput {
    #[schemars(description = "Todo text, must not be empty")]
    pub text: String,
}

/// Input of `todo.toggle`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ToggleTodoInput {
    pub id: u64,
    pub completed: bool,
}

/// Input of `todo.delete`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct DeleteTodoInput {
    pub id: u64,
}

/// Output of `todo.toggle` and `todo.delete`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TodoMutationOutput {
    pub success: bool,
}
