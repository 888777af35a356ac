//! Content administration endpoints (PSK-guarded).

use axum::extract::{Path, State};

use super::{success, ApiJson, ApiResult};
use crate::errors::AppError;
use crate::models::{
    Caption, CorrectCaption, CreateAssociationRequest, CreateCaptionRequest, CreateMemeRequest,
    Meme, MemeCaption, VALID_POINTS,
};
use crate::AppState;

/// GET /api/admin/memes - List all memes.
pub async fn list_memes(State(state): State<AppState>) -> ApiResult<Vec<Meme>> {
    success(state.repo.list_memes().await?)
}

/// POST /api/admin/memes - Create a new meme.
pub async fn create_meme(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateMemeRequest>,
) -> ApiResult<Meme> {
    if request.image_url.trim().is_empty() {
        return Err(AppError::Validation("Image URL is required".to_string()));
    }
    if request.title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let meme = state
        .repo
        .create_meme(request.image_url.trim(), request.title.trim())
        .await?;
    tracing::info!(meme_id = meme.id, "Created meme");
    success(meme)
}

/// GET /api/admin/captions - List all captions.
pub async fn list_captions(State(state): State<AppState>) -> ApiResult<Vec<Caption>> {
    success(state.repo.list_captions().await?)
}

/// POST /api/admin/captions - Create a new caption.
pub async fn create_caption(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateCaptionRequest>,
) -> ApiResult<Caption> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("Caption text is required".to_string()));
    }

    let caption = state.repo.create_caption(request.text.trim()).await?;
    tracing::info!(caption_id = caption.id, "Created caption");
    success(caption)
}

/// GET /api/admin/memes/:id/captions - Correct captions for a meme.
pub async fn list_associations(
    State(state): State<AppState>,
    Path(meme_id): Path<i64>,
) -> ApiResult<Vec<CorrectCaption>> {
    if state.repo.get_meme(meme_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Meme {} not found", meme_id)));
    }
    success(state.repo.correct_captions(meme_id).await?)
}

/// POST /api/admin/memes/:id/captions - Associate a caption with a meme.
pub async fn create_association(
    State(state): State<AppState>,
    Path(meme_id): Path<i64>,
    ApiJson(request): ApiJson<CreateAssociationRequest>,
) -> ApiResult<MemeCaption> {
    if !VALID_POINTS.contains(&request.points) {
        return Err(AppError::Validation(
            "Points must be 1, 2, or 3".to_string(),
        ));
    }
    if state.repo.get_meme(meme_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Meme {} not found", meme_id)));
    }
    if state.repo.get_caption(request.caption_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Caption {} not found",
            request.caption_id
        )));
    }

    // Fast-fail with a readable message; the table constraints still decide races.
    let existing = state.repo.correct_captions(meme_id).await?;
    if existing.iter().any(|c| c.id == request.caption_id) {
        return Err(AppError::Validation(format!(
            "Caption {} is already associated with meme {}",
            request.caption_id, meme_id
        )));
    }
    if existing.iter().any(|c| c.points == request.points) {
        return Err(AppError::Validation(format!(
            "A caption with {} points already exists for meme {}",
            request.points, meme_id
        )));
    }

    let association = state
        .repo
        .create_association(meme_id, request.caption_id, request.points)
        .await?;
    tracing::info!(
        meme_id,
        caption_id = request.caption_id,
        points = request.points,
        "Created association"
    );
    success(association)
}

/// DELETE /api/admin/memes/:id/captions/:caption_id - Remove an association.
pub async fn delete_association(
    State(state): State<AppState>,
    Path((meme_id, caption_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    state.repo.delete_association(meme_id, caption_id).await?;
    success(())
}
