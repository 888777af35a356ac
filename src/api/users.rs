//! Registration and login session endpoints.

use axum::extract::State;
use tower_sessions::Session;

use super::{success, ApiJson, ApiResult};
use crate::auth;
use crate::errors::AppError;
use crate::models::{LoginRequest, RegisterRequest, User};
use crate::AppState;

/// POST /api/users - Register and log in a new player.
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<User> {
    let name = request.name.trim();
    let username = request.username.trim();

    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if username.is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    let hash = auth::hash_password(request.password).await?;
    let user = state.repo.create_user(name, username, &hash).await?;
    tracing::info!(user_id = %user.id, "Registered user");

    auth::log_in(&session, &user).await?;
    success(user)
}

/// POST /api/sessions - Log in with username and password.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<User> {
    let invalid = || AppError::Unauthorized("Incorrect username or password".to_string());

    let Some(credentials) = state.repo.find_credentials(request.username.trim()).await? else {
        return Err(invalid());
    };

    if !auth::verify_password(request.password, credentials.password_hash).await? {
        return Err(invalid());
    }

    auth::log_in(&session, &credentials.user).await?;
    success(credentials.user)
}

/// GET /api/sessions/current - The logged-in user with current points.
pub async fn current_session(State(state): State<AppState>, session: Session) -> ApiResult<User> {
    let session_user = auth::require_user(&session).await?;

    match state.repo.get_user(&session_user.id).await? {
        Some(user) => success(user),
        None => {
            // Account disappeared underneath a live session.
            session.flush().await?;
            Err(AppError::Unauthorized("Not authenticated".to_string()))
        }
    }
}

/// DELETE /api/sessions/current - Log out, discarding any unfinished match.
pub async fn logout(session: Session) -> ApiResult<()> {
    auth::log_out(&session).await?;
    success(())
}
