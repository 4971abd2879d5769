//! Gateway request interception: resolves the caller's session.
//!
//! The interceptor sits between the API gateway and the router Lambda. It
//! strips any session a client tried to send itself and, for protected
//! procedures, replaces it with one resolved from the bearer token.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::DateTime;
use jsonwebtoken::dangerous::insecure_decode;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use lambda_runtime::tracing::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::config::AuthConfig;
use crate::models::interceptor::{InterceptorEvent, InterceptorResponse};
use crate::models::{Session, SessionUser};
use crate::ports::Clock;
use crate::routers::AppRouter;
use crate::utils::envelope_procedure_path;

/// Header carrying the bearer token (matched case-insensitively)
const AUTH_HEADER: &str = "authorization";

/// Envelope key the session is stored under
pub const SESSION_KEY: &str = "session";

/// Minimal JWT claims for building a session user.
#[derive(Debug, Clone, Deserialize)]
struct Claims {
    exp: Option<i64>,
    sub: Option<String>,
    name: Option<String>,
    email: Option<String>,
    preferred_username: Option<String>,
}

/// Find the bearer token among `(name, value)` header pairs (case-insensitive).
///
/// # Returns
/// The token without its `Bearer ` prefix, if an authorization header is present
#[must_use]
pub fn find_bearer_token<'a>(
    headers: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Option<&'a str> {
    headers
        .into_iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(AUTH_HEADER))
        .map(|(_, v)| v.strip_prefix("Bearer ").unwrap_or(v))
}

/// Extract the bearer token from gateway request headers.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn extract_auth_token(headers: &HashMap<String, String>) -> Option<&str> {
    find_bearer_token(headers.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

/// Turns bearer tokens into sessions.
pub struct SessionResolver {
    auth: AuthConfig,
    clock: Arc<dyn Clock>,
}

impl SessionResolver {
    #[must_use]
    pub fn new(auth: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self { auth, clock }
    }

    /// Resolves a session from a JWT.
    ///
    /// The signature is verified (HS256) only when a secret is configured.
    ///
    /// # Returns
    ///
    /// Returns `None` if:
    /// - Token cannot be decoded or fails verification
    /// - Token is expired
    /// - No user identifier claim is present
    #[must_use]
    pub fn resolve(&self, token: &str) -> Option<Session> {
        let claims = self.decode_claims(token)?;

        if let Some(exp) = claims.exp {
            let leeway = i64::try_from(self.auth.jwt_leeway_secs).unwrap_or(i64::MAX);
            if exp.saturating_add(leeway) < self.clock.now().timestamp() {
                warn!(message = "Token is expired");
                return None;
            }
        }

        let user_id = claims
            .sub
            .or_else(|| claims.preferred_username.clone())
            .or_else(|| claims.email.clone())?;

        let user_name = claims.name.unwrap_or_else(|| {
            claims
                .preferred_username
                .unwrap_or_else(|| user_id.split('@').next().unwrap_or(&user_id).to_string())
        });

        let mut user = SessionUser::new(user_id);
        user.name = Some(user_name);
        user.email = claims.email;

        Some(Session {
            user,
            expires_at: claims.exp.and_then(|exp| DateTime::from_timestamp(exp, 0)),
        })
    }

    fn decode_claims(&self, token: &str) -> Option<Claims> {
        let decoded = match self.auth.jwt_secret.as_deref() {
            Some(secret) => {
                let mut validation = Validation::new(Algorithm::HS256);
                // expiry is checked against the injected clock in `resolve`
                validation.validate_exp = false;
                validation.required_spec_claims.clear();
                match self.auth.jwt_audience.as_deref() {
                    Some(audience) => validation.set_audience(&[audience]),
                    None => validation.validate_aud = false,
                }
                decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
            }
            None => insecure_decode::<Claims>(token),
        };

        decoded
            .map(|data| data.claims)
            .map_err(|e| warn!(error = %e, "Failed to decode token"))
            .ok()
    }
}

/// Applies `f` to the call envelope in `body`, keeping the body's representation.
fn with_envelope(body: &mut Value, f: impl FnOnce(&mut Map<String, Value>)) {
    match body {
        Value::Object(envelope) => f(envelope),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(mut envelope)) => {
                f(&mut envelope);
                *raw = Value::Object(envelope).to_string();
            }
            Ok(_) => debug!(message = "Request body is not an object, passing through"),
            Err(e) => {
                warn!(
                    error = %e,
                    "Failed to parse request body as JSON. Body will be passed through unmodified."
                );
            }
        },
        _ => debug!(message = "Request body is not an object, passing through"),
    }
}

/// Process an interceptor event to transform the gateway request.
///
/// This function:
/// 1. Removes any client-supplied session from the call envelope
/// 2. Identifies calls to protected procedures, reading the path the same
///    way the router does (`path_prefix` and gateway prefixes removed)
/// 3. Resolves the bearer token into a session and injects it
#[must_use]
pub fn process_interceptor_event(
    event: InterceptorEvent,
    resolver: &SessionResolver,
    path_prefix: &str,
) -> InterceptorResponse {
    let mut gateway_request = event.gateway_request;
    let token = gateway_request
        .headers
        .as_ref()
        .and_then(extract_auth_token)
        .map(str::to_string);

    if let Some(body) = gateway_request.body.as_mut() {
        with_envelope(body, |envelope| {
            if envelope.remove(SESSION_KEY).is_some() {
                warn!(message = "Dropping client-supplied session");
            }

            let Some(path) = envelope_procedure_path(envelope, path_prefix) else {
                debug!(message = "Skipping request without procedure path");
                return;
            };
            if !AppRouter::is_protected(&path) {
                debug!(path = %path, "Skipping public procedure");
                return;
            }

            let Some(session) = token.as_deref().and_then(|t| resolver.resolve(t)) else {
                warn!(path = %path, "Could not resolve session for protected procedure");
                return;
            };

            match serde_json::to_value(&session) {
                Ok(session) => {
                    info!(path = %path, "Injecting session into call envelope");
                    envelope.insert(SESSION_KEY.to_string(), session);
                }
                Err(e) => warn!(error = %e, "Failed to serialize session"),
            }
        });
    }

    InterceptorResponse::new(gateway_request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PATH_PREFIX;
    use crate::models::interceptor::GatewayRequest;
    use crate::ports::FixedClock;
    use chrono::{TimeZone, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde_json::json;

    const NOW: i64 = 1_704_110_400; // 2024-01-01T12:00:00Z

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FixedClock::new(Utc.timestamp_opt(NOW, 0).unwrap()))
    }

    fn token(claims: &Value, secret: &str) -> String {
        encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
    }

    fn unverified() -> SessionResolver {
        SessionResolver::new(AuthConfig::default(), clock())
    }

    fn verified(secret: &str) -> SessionResolver {
        SessionResolver::new(
            AuthConfig {
                jwt_secret: Some(secret.to_string()),
                ..AuthConfig::default()
            },
            clock(),
        )
    }

    fn event(headers: Option<HashMap<String, String>>, body: Value) -> InterceptorEvent {
        InterceptorEvent {
            interceptor_input_version: "1.0".to_string(),
            gateway_request: GatewayRequest {
                headers,
                body: Some(body),
            },
        }
    }

    fn bearer(token: &str) -> Option<HashMap<String, String>> {
        Some(HashMap::from([(
            "Authorization".to_string(),
            format!("Bearer {token}"),
        )]))
    }

    #[test]
    fn test_extract_auth_token_case_insensitive() {
        let headers = HashMap::from([("AUTHORIZATION".to_string(), "Bearer abc".to_string())]);
        assert_eq!(extract_auth_token(&headers), Some("abc"));

        let headers = HashMap::from([("authorization".to_string(), "raw-token".to_string())]);
        assert_eq!(extract_auth_token(&headers), Some("raw-token"));

        assert_eq!(extract_auth_token(&HashMap::new()), None);
    }

    #[test]
    fn test_find_bearer_token_in_pairs() {
        let headers = [("Content-Type", "application/json"), ("Authorization", "Bearer xyz")];
        assert_eq!(find_bearer_token(headers), Some("xyz"));
        assert_eq!(find_bearer_token([("accept", "*/*")]), None);
    }

    fn intercept(event: InterceptorEvent, resolver: &SessionResolver) -> InterceptorResponse {
        process_interceptor_event(event, resolver, DEFAULT_PATH_PREFIX)
    }

    #[test]
    fn test_resolve_claims_fallbacks() {
        let resolver = unverified();

        let session = resolver
            .resolve(&token(&json!({"sub": "u1", "name": "Ann", "email": "ann@example.com"}), "k"))
            .unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.user.name.as_deref(), Some("Ann"));
        assert_eq!(session.user.email.as_deref(), Some("ann@example.com"));
        assert_eq!(session.expires_at, None);

        let session = resolver
            .resolve(&token(&json!({"email": "jane.doe@example.com"}), "k"))
            .unwrap();
        assert_eq!(session.user.id, "jane.doe@example.com");
        assert_eq!(session.user.name.as_deref(), Some("jane.doe"));

        assert!(resolver.resolve(&token(&json!({"name": "Nobody"}), "k")).is_none());
        assert!(resolver.resolve("not-a-jwt").is_none());
    }

    #[test]
    fn test_resolve_checks_expiry_with_leeway() {
        let resolver = unverified();

        let live = resolver.resolve(&token(&json!({"sub": "u1", "exp": NOW + 60}), "k"));
        assert_eq!(
            live.unwrap().expires_at,
            Some(Utc.timestamp_opt(NOW + 60, 0).unwrap())
        );

        // within the default 60s leeway
        assert!(resolver.resolve(&token(&json!({"sub": "u1", "exp": NOW - 30}), "k")).is_some());
        assert!(resolver.resolve(&token(&json!({"sub": "u1", "exp": NOW - 120}), "k")).is_none());
    }

    #[test]
    fn test_resolve_verifies_signature_when_configured() {
        let resolver = verified("right");
        assert!(resolver.resolve(&token(&json!({"sub": "u1"}), "right")).is_some());
        assert!(resolver.resolve(&token(&json!({"sub": "u1"}), "wrong")).is_none());
    }

    #[test]
    fn test_resolve_checks_audience_when_configured() {
        let resolver = SessionResolver::new(
            AuthConfig {
                jwt_secret: Some("k".to_string()),
                jwt_audience: Some("demo-api".to_string()),
                ..AuthConfig::default()
            },
            clock(),
        );
        assert!(resolver.resolve(&token(&json!({"sub": "u1", "aud": "demo-api"}), "k")).is_some());
        assert!(resolver.resolve(&token(&json!({"sub": "u1", "aud": "other"}), "k")).is_none());
    }

    #[test]
    fn test_injects_session_for_protected_procedure() {
        let jwt = token(&json!({"sub": "u1", "name": "Ann"}), "k");
        let response = intercept(
            event(bearer(&jwt), json!({"path": "privateData"})),
            &unverified(),
        );

        assert_eq!(response.interceptor_output_version, "1.0");
        let body = response.transformed_gateway_request.body.unwrap();
        assert_eq!(body["session"]["user"], json!({"id": "u1", "name": "Ann"}));
    }

    #[test]
    fn test_skips_public_procedure() {
        let jwt = token(&json!({"sub": "u1"}), "k");
        let response = intercept(
            event(bearer(&jwt), json!({"path": "hello.greet", "input": {"name": "Ann"}})),
            &unverified(),
        );

        let body = response.transformed_gateway_request.body.unwrap();
        assert_eq!(body, json!({"path": "hello.greet", "input": {"name": "Ann"}}));
    }

    #[test]
    fn test_injects_session_for_prefixed_paths() {
        let jwt = token(&json!({"sub": "u1"}), "k");

        for body in [
            json!({"path": "/trpc/privateData"}),
            json!({"path": "target-1___/trpc/privateData"}),
            json!({"rawPath": "/trpc/privateData"}),
        ] {
            let response = intercept(event(bearer(&jwt), body.clone()), &unverified());
            let body = response.transformed_gateway_request.body.unwrap();
            assert_eq!(body["session"]["user"]["id"], "u1", "no session for {body}");
        }
    }

    #[test]
    fn test_custom_path_prefix_is_honored() {
        let jwt = token(&json!({"sub": "u1"}), "k");
        let response = process_interceptor_event(
            event(bearer(&jwt), json!({"path": "/api/privateData"})),
            &unverified(),
            "/api/",
        );
        let body = response.transformed_gateway_request.body.unwrap();
        assert_eq!(body["session"]["user"]["id"], "u1");
    }

    #[test]
    fn test_drops_client_supplied_session() {
        let forged = json!({"path": "privateData", "session": {"user": {"id": "admin"}}});
        let response = intercept(event(None, forged), &unverified());

        let body = response.transformed_gateway_request.body.unwrap();
        assert_eq!(body, json!({"path": "privateData"}));
    }

    #[test]
    fn test_string_body_stays_a_string() {
        let jwt = token(&json!({"sub": "u1"}), "k");
        let body = json!({"path": "privateData"}).to_string();
        let response = intercept(event(bearer(&jwt), Value::String(body)), &unverified());

        let Some(Value::String(raw)) = response.transformed_gateway_request.body else {
            panic!("body should remain a string");
        };
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["session"]["user"]["id"], "u1");
    }

    #[test]
    fn test_invalid_json_body_passes_through() {
        let response = intercept(
            event(bearer("token"), Value::String("invalid json".to_string())),
            &unverified(),
        );
        assert_eq!(
            response.transformed_gateway_request.body,
            Some(Value::String("invalid json".to_string()))
        );
    }
}
