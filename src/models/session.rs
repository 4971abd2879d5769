//! Session state attached to a call by the auth middleware.
//!
//! The routers only read these values; they are produced by the gateway
//! interceptor (or a test) and travel with the call envelope.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The authenticated user of a session.
///
/// Fields other than `id`, `name` and `email` are kept as-is so the user
/// can be echoed back verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SessionUser {
    #[schemars(description = "Stable user identifier")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Display name")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(description = "Email address")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SessionUser {
    /// Creates a user with only an identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            extra: Map::new(),
        }
    }
}

/// An authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user: SessionUser,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    #[must_use]
    pub const fn new(user: SessionUser) -> Self {
        Self {
            user,
            expires_at: None,
        }
    }

    /// Whether the session has expired at `now`. Sessions without an expiry never do.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Per-call state handed explicitly to every procedure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallContext {
    pub session: Option<Session>,
}

impl CallContext {
    /// Context of an anonymous call.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self { session: None }
    }

    #[must_use]
    pub const fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }
}
