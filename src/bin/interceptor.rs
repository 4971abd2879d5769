use std::sync::Arc;

use demo_api::config::Config;
use demo_api::interceptor::{SessionResolver, process_interceptor_event};
use demo_api::models::interceptor::{InterceptorEvent, InterceptorResponse};
use demo_api::ports::SystemClock;
use lambda_runtime::{
    Error, LambdaEvent, service_fn,
    tracing::{debug, info, warn},
};
use serde_json::Value;

/// Handles interceptor events from the API gateway.
///
/// This function:
/// 1. Parses incoming interceptor events
/// 2. Resolves the caller's session for protected procedures
/// 3. Forwards the transformed request to the router Lambda
async fn interceptor_handler(
    resolver: &SessionResolver,
    path_prefix: &str,
    event: LambdaEvent<Value>,
) -> Result<InterceptorResponse, Error> {
    info!(message = "Interceptor handler invoked");
    debug!(payload = ?event.payload, "Interceptor event");
    let interceptor_event: InterceptorEvent = serde_json::from_value(event.payload)?;
    Ok(process_interceptor_event(interceptor_event, resolver, path_prefix))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    lambda_runtime::tracing::init_default_subscriber();

    let config = Config::from_env()?;
    if config.auth.jwt_secret.is_none() {
        warn!(message = "AUTH_JWT_SECRET not set, token signatures are not verified");
    }

    let path_prefix: Arc<str> = Arc::from(config.path_prefix);
    let resolver = Arc::new(SessionResolver::new(config.auth, Arc::new(SystemClock)));
    lambda_runtime::run(service_fn(move |event| {
        let resolver = Arc::clone(&resolver);
        let path_prefix = Arc::clone(&path_prefix);
        async move { interceptor_handler(&resolver, &path_prefix, event).await }
    }))
    .await
}
