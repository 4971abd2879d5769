//! Error types for procedure dispatch.
//!
//! Leaf procedures never fail; every variant here is raised by the layers
//! around them (input decoding, the session guard, routing, delegated
//! collaborators and response encoding).

use lambda_runtime::Diagnostic;
use std::fmt;

/// Error returned by a procedure call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Input was rejected before the procedure ran
    ValidationError(String),
    /// The procedure requires a session and none (or an expired one) was supplied
    AuthenticationError(String),
    /// No procedure is registered at the requested path
    UnknownProcedure(String),
    /// A delegated collaborator failed while handling the call
    ProcedureError(String),
    /// The procedure output could not be encoded
    SerializationError(String),
}

impl RpcError {
    /// Stable name of the error kind, used as the Lambda `errorType`.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::ValidationError(_) => "ValidationError",
            Self::AuthenticationError(_) => "AuthenticationError",
            Self::UnknownProcedure(_) => "UnknownProcedure",
            Self::ProcedureError(_) => "ProcedureError",
            Self::SerializationError(_) => "SerializationError",
        }
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationError(msg) => write!(f, "Invalid input: {msg}"),
            Self::AuthenticationError(msg) => write!(f, "Not authenticated: {msg}"),
            Self::UnknownProcedure(path) => write!(f, "Unknown procedure: {path}"),
            Self::ProcedureError(msg) => write!(f, "{msg}"),
            Self::SerializationError(msg) => write!(f, "Failed to serialize response: {msg}"),
        }
    }
}

impl std::error::Error for RpcError {}

impl From<anyhow::Error> for RpcError {
    fn from(error: anyhow::Error) -> Self {
        // {:#} keeps the whole context chain
        Self::ProcedureError(format!("{error:#}"))
    }
}

impl From<RpcError> for Diagnostic {
    fn from(error: RpcError) -> Self {
        Self {
            error_type: error.error_type().to_string(),
            error_message: error.to_string(),
        }
    }
}
