//! Logged-in user tracking on top of `tower-sessions`.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::errors::AppError;
use crate::game::session::MATCH_SESSION_KEY;
use crate::models::User;

/// Session key for the authenticated user.
pub const SESSION_USER_KEY: &str = "user";

/// The identity stored in the session after login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub username: String,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
        }
    }
}

/// The logged-in user, if any.
pub async fn current_user(session: &Session) -> Result<Option<SessionUser>, AppError> {
    Ok(session.get::<SessionUser>(SESSION_USER_KEY).await?)
}

/// The logged-in user, failing closed when the session has none.
pub async fn require_user(session: &Session) -> Result<SessionUser, AppError> {
    current_user(session)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))
}

/// Bind a user to the session under a fresh session id.
///
/// Match state left by a previous user of the same browser is dropped.
pub async fn log_in(session: &Session, user: &User) -> Result<SessionUser, AppError> {
    session.cycle_id().await?;
    session.remove_value(MATCH_SESSION_KEY).await?;
    let session_user = SessionUser::from(user);
    session.insert(SESSION_USER_KEY, &session_user).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(session_user)
}

/// Drop the session together with any unfinished match.
pub async fn log_out(session: &Session) -> Result<(), AppError> {
    if let Some(user) = current_user(session).await? {
        tracing::info!(user_id = %user.id, "User logged out");
    }
    session.flush().await?;
    Ok(())
}
