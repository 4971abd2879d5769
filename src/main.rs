use std::sync::Arc;

use demo_api::config::Config;
use demo_api::handler::{Ingress, function_handler};
use demo_api::ports::SystemClock;
use demo_api::routers::AppRouter;
use lambda_runtime::{Error, service_fn, tracing::warn};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Use Lambda runtime's built-in tracing subscriber for CloudWatch Logs
    lambda_runtime::tracing::init_default_subscriber();

    let config = Config::from_env()?;
    let router = Arc::new(AppRouter::default());
    let ingress = Arc::new(Ingress::new(config, Arc::new(SystemClock)));
    if !ingress.verifies_http_tokens() {
        warn!(message = "AUTH_JWT_SECRET not set, HTTP events run without a session");
    }

    lambda_runtime::run(service_fn(move |event| {
        let router = Arc::clone(&router);
        let ingress = Arc::clone(&ingress);
        async move { function_handler(&router, &ingress, event).await }
    }))
    .await
}
