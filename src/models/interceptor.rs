//! Interceptor request/response models for the API gateway.
//!
//! These types define the structure of events received and responses sent
//! by the gateway interceptor Lambda function.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Gateway interceptor event structure
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InterceptorEvent {
    pub interceptor_input_version: String,
    pub gateway_request: GatewayRequest,
}

/// Gateway request structure, forwarded (possibly transformed) to the router Lambda.
///
/// `body` is either the call envelope as a JSON object or the same envelope
/// encoded as a JSON string.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Interceptor response sent back to the gateway
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct InterceptorResponse {
    pub interceptor_output_version: String,
    pub transformed_gateway_request: GatewayRequest,
}

impl InterceptorResponse {
    #[must_use]
    pub fn new(transformed_gateway_request: GatewayRequest) -> Self {
        Self {
            interceptor_output_version: "1.0".to_string(),
            transformed_gateway_request,
        }
    }
}
