use async_trait::async_trait;
use lambda_runtime::tracing::{debug, info};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::models::{
    CallContext, CreateTodoInput, DeleteTodoInput, RpcError, Todo, TodoMutationOutput,
    ToggleTodoInput,
};

use super::{decode_input, encode_output};

/// Collaborator that owns every procedure under `todo.*`.
///
/// The root router forwards the procedure name (the part after `todo.`),
/// the raw input and the call context without interpreting them.
#[async_trait]
pub trait TodoService: Send + Sync {
    /// Handles one `todo.*` call.
    ///
    /// # Errors
    ///
    /// Implementations decide their own failures; they are returned to the
    /// caller unchanged.
    async fn call(&self, procedure: &str, input: Value, ctx: &CallContext)
    -> Result<Value, RpcError>;
}

/// Process-local todo list. Items are lost when the process exits.
#[derive(Debug, Default)]
pub struct InMemoryTodoService {
    state: RwLock<TodoState>,
}

#[derive(Debug, Default)]
struct TodoState {
    next_id: u64,
    items: Vec<Todo>,
}

impl InMemoryTodoService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_all(&self) -> Vec<Todo> {
        self.state.read().await.items.clone()
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if the text is empty.
    pub async fn create(&self, input: CreateTodoInput) -> Result<Todo, RpcError> {
        if input.text.is_empty() {
            return Err(RpcError::ValidationError(
                "text must not be empty".to_string(),
            ));
        }

        let mut state = self.state.write().await;
        state.next_id += 1;
        let todo = Todo {
            id: state.next_id,
            text: input.text,
            completed: false,
        };
        state.items.push(todo.clone());
        info!(todo_id = todo.id, "Created todo");
        Ok(todo)
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if no todo has the given id.
    pub async fn toggle(&self, input: ToggleTodoInput) -> Result<TodoMutationOutput, RpcError> {
        let mut state = self.state.write().await;
        let todo = state
            .items
            .iter_mut()
            .find(|todo| todo.id == input.id)
            .ok_or_else(|| not_found(input.id))?;
        todo.completed = input.completed;
        Ok(TodoMutationOutput { success: true })
    }

    /// # Errors
    ///
    /// Returns `ValidationError` if no todo has the given id.
    pub async fn delete(&self, input: DeleteTodoInput) -> Result<TodoMutationOutput, RpcError> {
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|todo| todo.id != input.id);
        if state.items.len() == before {
            return Err(not_found(input.id));
        }
        info!(todo_id = input.id, "Deleted todo");
        Ok(TodoMutationOutput { success: true })
    }
}

fn not_found(id: u64) -> RpcError {
    RpcError::ValidationError(format!("No todo with id {id}"))
}

#[async_trait]
impl TodoService for InMemoryTodoService {
    async fn call(
        &self,
        procedure: &str,
        input: Value,
        _ctx: &CallContext,
    ) -> Result<Value, RpcError> {
        debug!(procedure = %procedure, "Dispatching todo procedure");
        match procedure {
            "getAll" => encode_output(&self.get_all().await),
            "create" => encode_output(&self.create(decode_input(input)?).await?),
            "toggle" => encode_output(&self.toggle(decode_input(input)?).await?),
            "delete" => encode_output(&self.delete(decode_input(input)?).await?),
            _ => Err(RpcError::UnknownProcedure(format!("todo.{procedure}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn call(
        service: &InMemoryTodoService,
        procedure: &str,
        input: Value,
    ) -> Result<Value, RpcError> {
        service.call(procedure, input, &CallContext::anonymous()).await
    }

    #[tokio::test]
    async fn test_create_toggle_delete() {
        let service = InMemoryTodoService::new();

        let created = call(&service, "create", json!({"text": "write tests"})).await.unwrap();
        assert_eq!(created, json!({"id": 1, "text": "write tests", "completed": false}));

        let toggled = call(&service, "toggle", json!({"id": 1, "completed": true})).await.unwrap();
        assert_eq!(toggled, json!({"success": true}));
        assert!(service.get_all().await[0].completed);

        let deleted = call(&service, "delete", json!({"id": 1})).await.unwrap();
        assert_eq!(deleted, json!({"success": true}));
        assert_eq!(call(&service, "getAll", Value::Null).await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused() {
        let service = InMemoryTodoService::new();
        call(&service, "create", json!({"text": "a"})).await.unwrap();
        call(&service, "delete", json!({"id": 1})).await.unwrap();
        let created = call(&service, "create", json!({"text": "b"})).await.unwrap();
        assert_eq!(created["id"], 2);
    }

    #[tokio::test]
    async fn test_rejects_bad_input() {
        let service = InMemoryTodoService::new();

        let empty = call(&service, "create", json!({"text": ""})).await.unwrap_err();
        assert_eq!(empty.error_type(), "ValidationError");

        let missing = call(&service, "toggle", json!({"id": 9, "completed": true}))
            .await
            .unwrap_err();
        assert_eq!(missing, RpcError::ValidationError("No todo with id 9".to_string()));

        let malformed = call(&service, "delete", json!({"id": "one"})).await.unwrap_err();
        assert_eq!(malformed.error_type(), "ValidationError");
    }

    #[tokio::test]
    async fn test_unknown_procedure() {
        let service = InMemoryTodoService::new();
        let error = call(&service, "archive", Value::Null).await.unwrap_err();
        assert_eq!(error, RpcError::UnknownProcedure("todo.archive".to_string()));
    }
}
