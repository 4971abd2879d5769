//! Utility functions shared across the application.
//!
//! This module contains common utility functions that are used by both the
//! router Lambda and the gateway interceptor.

use serde_json::{Map, Value};

/// Strips a gateway target prefix from a procedure path.
///
/// Format: `gateway-target-id___hello.greet` → `hello.greet`
///
/// # Arguments
///
/// * `path` - The procedure path that may contain a gateway prefix
///
/// # Returns
///
/// The procedure path with the gateway prefix removed, or the original path if no prefix exists.
#[must_use]
pub fn strip_gateway_prefix(path: &str) -> String {
    path.split_once("___").map_or_else(
        || path.to_string(),
        |(_, actual_path)| actual_path.to_string(),
    )
}

/// Normalizes a procedure path as both Lambdas see it.
///
/// Removes the HTTP `path_prefix` (`/trpc/privateData`) and any gateway
/// target prefix (`target___privateData`).
#[must_use]
pub fn normalize_procedure_path(path: &str, path_prefix: &str) -> String {
    let path = strip_gateway_prefix(path);
    path.strip_prefix(path_prefix)
        .map_or_else(|| path.clone(), strip_gateway_prefix)
}

/// Finds the procedure path in a call envelope: `path` first, then an API
/// Gateway `rawPath` under `path_prefix`.
#[must_use]
pub fn envelope_procedure_path(envelope: &Map<String, Value>, path_prefix: &str) -> Option<String> {
    if let Some(path) = envelope.get("path").and_then(Value::as_str) {
        return Some(normalize_procedure_path(path, path_prefix));
    }

    envelope
        .get("rawPath")
        .and_then(Value::as_str)
        .filter(|raw| raw.starts_with(path_prefix))
        .map(|raw| normalize_procedure_path(raw, path_prefix))
}

/// Splits a procedure path into its first namespace segment and the rest.
///
/// `hello.greet` → `("hello", Some("greet"))`, `healthCheck` → `("healthCheck", None)`
#[must_use]
pub fn split_namespace(path: &str) -> (&str, Option<&str>) {
    path.split_once('.')
        .map_or((path, None), |(namespace, rest)| (namespace, Some(rest)))
}
