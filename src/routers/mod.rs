//! Procedure routers.
//!
//! [`AppRouter`] is the root of the namespace tree:
//!
//! - `healthCheck`: liveness probe, always `"OK"`
//! - `privateData`: echoes the caller's session user (session required)
//! - `hello.*`: [`GreetingService`]
//! - `todo.*`: delegated to a [`TodoService`]

pub mod hello;
pub mod todo;

use std::sync::Arc;

use lambda_runtime::tracing::{debug, error};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::middleware::require_session;
use crate::models::{CallContext, PRIVATE_MESSAGE, PrivateDataOutput, RpcError, Session};
use crate::ports::{Clock, SystemClock, ThreadRandom};
use crate::utils::split_namespace;

pub use hello::GreetingService;
pub use todo::{InMemoryTodoService, TodoService};

/// Literal returned by `healthCheck`
pub const HEALTH_OK: &str = "OK";

/// Root procedures that run behind the session guard
pub const PROTECTED_PROCEDURES: [&str; 1] = ["privateData"];

/// Decodes procedure input into its typed form.
///
/// # Errors
///
/// Returns `ValidationError` if `input` does not match `T`.
pub fn decode_input<T: DeserializeOwned>(input: Value) -> Result<T, RpcError> {
    serde_json::from_value(input).map_err(|e| {
        error!(error = %e, "Failed to parse input");
        RpcError::ValidationError(e.to_string())
    })
}

/// Encodes a procedure output as JSON.
///
/// # Errors
///
/// Returns `SerializationError` if `output` cannot be represented as JSON.
pub fn encode_output<T: Serialize>(output: &T) -> Result<Value, RpcError> {
    serde_json::to_value(output).map_err(|e| {
        error!(error = %e, "Failed to serialize response");
        RpcError::SerializationError(e.to_string())
    })
}

/// Liveness probe.
#[must_use]
pub const fn health_check() -> &'static str {
    HEALTH_OK
}

/// Echoes the session user. The session guard must already have run.
#[must_use]
pub fn private_data(session: &Session) -> PrivateDataOutput {
    PrivateDataOutput {
        message: PRIVATE_MESSAGE.to_string(),
        user: session.user.clone(),
    }
}

/// Root router: dispatches dot-separated procedure paths.
#[derive(Clone)]
pub struct AppRouter {
    hello: GreetingService,
    todo: Arc<dyn TodoService>,
    clock: Arc<dyn Clock>,
}

impl Default for AppRouter {
    fn default() -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        Self::new(
            GreetingService::new(Arc::clone(&clock), Arc::new(ThreadRandom)),
            Arc::new(InMemoryTodoService::new()),
            clock,
        )
    }
}

impl AppRouter {
    /// `clock` is the one the session guard checks expiry against.
    #[must_use]
    pub fn new(hello: GreetingService, todo: Arc<dyn TodoService>, clock: Arc<dyn Clock>) -> Self {
        Self { hello, todo, clock }
    }

    /// Whether calls to `path` need a session.
    #[must_use]
    pub fn is_protected(path: &str) -> bool {
        PROTECTED_PROCEDURES.contains(&path)
    }

    /// Calls the procedure at `path`.
    ///
    /// Input is ignored by procedures that take none.
    ///
    /// # Errors
    ///
    /// - `UnknownProcedure`: nothing is registered at `path`
    /// - `ValidationError`: the input does not match the procedure's input shape
    /// - `AuthenticationError`: a protected procedure was called without a live session
    /// - anything the todo collaborator returns for `todo.*`
    pub async fn call(
        &self,
        path: &str,
        input: Value,
        ctx: &CallContext,
    ) -> Result<Value, RpcError> {
        debug!(path = %path, "Routing procedure");

        match split_namespace(path) {
            ("healthCheck", None) => encode_output(&health_check()),
            ("privateData", None) => {
                let session = require_session(ctx, self.clock.now())?;
                encode_output(&private_data(session))
            }
            ("hello", Some(procedure)) => self.hello.call(procedure, input),
            ("todo", Some(procedure)) => self.todo.call(procedure, input, ctx).await,
            _ => Err(RpcError::UnknownProcedure(path.to_string())),
        }
    }
}
