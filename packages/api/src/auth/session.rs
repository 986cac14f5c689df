//! Session keys and lookups shared by the auth and student endpoints.

use tower_sessions::Session;
use uuid::Uuid;

use crate::error::ApiError;

pub const SESSION_USER_ID_KEY: &str = "user_id";

/// The signed-in user's id, if any.
pub async fn current_user_id(session: &Session) -> Result<Option<Uuid>, ApiError> {
    let user_id: Option<String> = session.get(SESSION_USER_ID_KEY).await?;
    user_id
        .map(|id| Uuid::parse_str(&id))
        .transpose()
        .map_err(ApiError::from)
}

pub async fn require_user(session: &Session) -> Result<Uuid, ApiError> {
    current_user_id(session)
        .await?
        .ok_or(ApiError::NotAuthenticated)
}

/// Rotate the session id and bind it to `user_id`.
pub async fn sign_in_session(session: &Session, user_id: Uuid) -> Result<(), ApiError> {
    session.cycle_id().await?;
    session.insert(SESSION_USER_ID_KEY, user_id.to_string()).await?;
    Ok(())
}
