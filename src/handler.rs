use std::sync::Arc;

use lambda_runtime::tracing::{debug, error, info, warn};
use lambda_runtime::{Context, Diagnostic, LambdaEvent};
use serde_json::Value;

use crate::config::Config;
use crate::interceptor::{SESSION_KEY, SessionResolver, find_bearer_token};
use crate::models::{CallContext, RpcError, Session};
use crate::ports::{Clock, SystemClock};
use crate::routers::AppRouter;
use crate::utils::{envelope_procedure_path, normalize_procedure_path};

/// Client context key that may carry the procedure path
const PATH_CONTEXT_KEY: &str = "procedurePath";

/// Keys that mark an API Gateway or function URL proxy event
const HTTP_EVENT_KEYS: [&str; 6] = [
    "requestContext",
    "rawPath",
    "httpMethod",
    "headers",
    "body",
    "queryStringParameters",
];

/// Transport settings shared by every invocation of the router Lambda.
pub struct Ingress {
    path_prefix: String,
    /// Resolves bearer tokens on HTTP events. Only set when a JWT secret is
    /// configured, so HTTP sessions always come from a verified token.
    http_sessions: Option<SessionResolver>,
}

impl Ingress {
    #[must_use]
    pub fn new(config: Config, clock: Arc<dyn Clock>) -> Self {
        let Config { auth, path_prefix } = config;
        let http_sessions = auth
            .jwt_secret
            .is_some()
            .then(|| SessionResolver::new(auth, clock));

        Self {
            path_prefix,
            http_sessions,
        }
    }

    #[must_use]
    pub fn path_prefix(&self) -> &str {
        &self.path_prefix
    }

    /// Whether bearer tokens on HTTP events can be turned into sessions.
    #[must_use]
    pub const fn verifies_http_tokens(&self) -> bool {
        self.http_sessions.is_some()
    }

    /// Builds the call context for a raw Lambda payload.
    ///
    /// A direct invocation carries the session the interceptor injected. An
    /// HTTP event is written by the client, so its session comes only from
    /// the `Authorization` header and never from the body.
    #[must_use]
    pub fn call_context(&self, event_payload: &Value) -> CallContext {
        if !is_http_event(event_payload) {
            return extract_call_context(event_payload);
        }

        let Some(token) = http_bearer_token(event_payload) else {
            return CallContext::anonymous();
        };
        let Some(resolver) = &self.http_sessions else {
            debug!(message = "Ignoring bearer token on HTTP event, no JWT secret configured");
            return CallContext::anonymous();
        };

        CallContext {
            session: resolver.resolve(token),
        }
    }
}

impl Default for Ingress {
    fn default() -> Self {
        Self::new(Config::default(), Arc::new(SystemClock))
    }
}

fn is_http_event(event_payload: &Value) -> bool {
    HTTP_EVENT_KEYS
        .iter()
        .any(|key| event_payload.get(key).is_some())
}

fn http_bearer_token(event_payload: &Value) -> Option<&str> {
    let headers = event_payload.get("headers")?.as_object()?;
    find_bearer_token(
        headers
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.as_str()?))),
    )
}

/// Extracts the procedure path from the Lambda context or the call envelope.
///
/// Lookup order: `client_context.custom[procedurePath]`, the envelope `path`,
/// then an API Gateway `rawPath` under `path_prefix`.
pub fn extract_procedure_path(
    event_payload: &Value,
    context: &Context,
    path_prefix: &str,
) -> String {
    debug!(
        "Extracting procedure path from context: {:?}",
        context.client_context
    );

    if let Some(path) = context
        .client_context
        .as_ref()
        .and_then(|cc| cc.custom.get(PATH_CONTEXT_KEY))
        .map(String::as_str)
    {
        debug!("Found procedure path in context: {}", path);
        return normalize_procedure_path(path, path_prefix);
    }

    if let Some(path) = event_payload
        .as_object()
        .and_then(|envelope| envelope_procedure_path(envelope, path_prefix))
    {
        debug!("Found procedure path in envelope: {}", path);
        return path;
    }

    debug!("Procedure path not found, using unknown");
    "unknown".to_string()
}

/// Extracts the procedure input from the envelope.
///
/// Falls back to a JSON-encoded `queryStringParameters.input` (GET requests).
///
/// # Errors
///
/// Returns `ValidationError` if the query string input is not valid JSON.
pub fn extract_input(event_payload: &Value) -> Result<Value, RpcError> {
    if let Some(input) = event_payload.get("input") {
        return Ok(input.clone());
    }

    match event_payload
        .get("queryStringParameters")
        .and_then(|params| params.get("input"))
        .and_then(Value::as_str)
    {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| RpcError::ValidationError(format!("Failed to parse query input: {e}"))),
        None => Ok(Value::Null),
    }
}

/// Builds the call context from the envelope's `session`, if it has a valid one.
///
/// Only direct invocations are read this way; see [`Ingress::call_context`].
#[must_use]
pub fn extract_call_context(event_payload: &Value) -> CallContext {
    let session = event_payload
        .get(SESSION_KEY)
        .filter(|session| !session.is_null())
        .and_then(|session| {
            serde_json::from_value::<Session>(session.clone())
                .map_err(|e| warn!(error = %e, "Ignoring malformed session"))
                .ok()
        });

    CallContext { session }
}

/// Unwraps an API Gateway proxy event whose `body` is a JSON string.
///
/// A `session` in the body is dropped: the client wrote it.
///
/// # Errors
///
/// Returns `ValidationError` if the body is not valid JSON.
fn unwrap_gateway_body(event_payload: Value) -> Result<Value, RpcError> {
    let Some(body_str) = event_payload.get("body").and_then(Value::as_str) else {
        return Ok(event_payload);
    };

    let mut envelope: Value = serde_json::from_str(body_str).map_err(|e| {
        error!(error = %e, "Failed to parse request body");
        RpcError::ValidationError(format!("Failed to parse request body: {e}"))
    })?;

    if let Some(envelope) = envelope.as_object_mut() {
        if envelope.remove(SESSION_KEY).is_some() {
            warn!(message = "Dropping session from HTTP request body");
        }

        // the HTTP route still names the procedure when the body does not
        for key in ["path", "rawPath"] {
            if let Some(route) = event_payload.get(key) {
                envelope.entry(key).or_insert_with(|| route.clone());
            }
        }
    }
    Ok(envelope)
}

/// Routes a call to the procedure at `path`.
///
/// # Errors
///
/// Returns a `Diagnostic` whose `error_type` names the `RpcError` variant.
pub async fn route_procedure(
    router: &AppRouter,
    path: &str,
    input: Value,
    ctx: &CallContext,
) -> Result<Value, Diagnostic> {
    debug!(path = %path, "Entering route_procedure function");
    debug!("Routing procedure: {} with input: {:?}", path, input);

    router.call(path, input, ctx).await.map_err(|e| {
        error!(path = %path, error_type = e.error_type(), error = %e, "Procedure call failed");
        Diagnostic::from(e)
    })
}

/// Lambda event handler. Routes to procedures based on the call envelope or
/// `client_context.custom`. Logs the full event only at `RUST_LOG=debug/trace`.
///
/// # Errors
///
/// Returns a `Diagnostic` error with one of the following types:
///
/// - `ValidationError`: The body or the input could not be parsed into the expected shape
/// - `AuthenticationError`: A protected procedure was called without a session
/// - `UnknownProcedure`: The requested procedure path was not recognized
/// - `ProcedureError`: A delegated collaborator failed
/// - `SerializationError`: The procedure output could not be serialized
pub async fn function_handler(
    router: &AppRouter,
    ingress: &Ingress,
    event: LambdaEvent<Value>,
) -> Result<Value, Diagnostic> {
    let (event_payload, context) = event.into_parts();
    debug!(payload = ?event_payload, "Received event");

    let ctx = ingress.call_context(&event_payload);
    let event_payload = unwrap_gateway_body(event_payload)?;
    let path = extract_procedure_path(&event_payload, &context, ingress.path_prefix());
    let input = extract_input(&event_payload)?;

    info!(message = format!("Invoking procedure: {}", path));

    route_procedure(router, &path, input, &ctx).await
}
