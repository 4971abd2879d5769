//! Session guard run before protected procedures.

use chrono::{DateTime, Utc};
use lambda_runtime::tracing::debug;

use crate::models::{CallContext, RpcError, Session};

/// Returns the session of `ctx`, or rejects the call.
///
/// # Errors
///
/// Returns `AuthenticationError` if the context carries no session, or if
/// the session expired at or before `now`.
pub fn require_session(ctx: &CallContext, now: DateTime<Utc>) -> Result<&Session, RpcError> {
    let Some(session) = ctx.session.as_ref() else {
        debug!("Rejecting call without session");
        return Err(RpcError::AuthenticationError(
            "Authentication required".to_string(),
        ));
    };

    if session.is_expired_at(now) {
        debug!(user_id = %session.user.id, "Rejecting call with expired session");
        return Err(RpcError::AuthenticationError("Session expired".to_string()));
    }

    Ok(session)
}
