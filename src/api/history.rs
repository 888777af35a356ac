//! Match history endpoints.

use axum::extract::{Path, State};
use tower_sessions::Session;

use super::{success, ApiResult};
use crate::auth;
use crate::models::{MatchDetail, MatchSummary};
use crate::AppState;

/// GET /api/history - The caller's archived matches, newest first.
pub async fn list_history(
    State(state): State<AppState>,
    session: Session,
) -> ApiResult<Vec<MatchSummary>> {
    let user = auth::require_user(&session).await?;
    success(state.archive.list_for_user(&user.id).await?)
}

/// GET /api/history/:id - Every round of one of the caller's matches.
pub async fn get_history(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> ApiResult<MatchDetail> {
    let user = auth::require_user(&session).await?;
    success(state.archive.get_detail(&user.id, &id).await?)
}
