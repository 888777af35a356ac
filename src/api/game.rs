//! Gameplay endpoints: rounds, answers and the match lifecycle.
//!
//! Guests and players without an active match get stateless rounds and scoring.
//! A logged-in player with an active match has memes excluded and points
//! accumulated in the server session.

use axum::extract::State;
use tower_sessions::Session;

use super::{success, ApiJson, ApiResult};
use crate::auth;
use crate::game::{self, MatchSession};
use crate::models::{CheckRequest, FinishMatchRequest, FinishedMatch, Round, ScoreOutcome};
use crate::AppState;

/// GET /api/round - Next meme with its caption options.
pub async fn get_round(State(state): State<AppState>, session: Session) -> ApiResult<Round> {
    if auth::current_user(&session).await?.is_none() {
        return success(game::next_round(&state.repo, &[]).await?);
    }

    let mut match_state = MatchSession::load(&session).await?;
    if !match_state.is_active() {
        return success(game::next_round(&state.repo, &[]).await?);
    }

    match_state.ensure_can_serve()?;
    let round = game::next_round(&state.repo, match_state.used_memes()).await?;
    match_state.record_meme(round.meme.id)?;
    match_state.save(&session).await?;

    success(round)
}

/// POST /api/check - Score a selection.
pub async fn check_round(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<CheckRequest>,
) -> ApiResult<ScoreOutcome> {
    let outcome = game::score(&state.repo, request.meme_id, request.selected_caption_id).await?;

    if auth::current_user(&session).await?.is_some() {
        let mut match_state = MatchSession::load(&session).await?;
        if match_state.is_active() {
            match_state.record_answer(request.meme_id, outcome.points)?;
            match_state.save(&session).await?;
        }
    }

    success(outcome)
}

/// GET /api/match/start - Begin (or restart) a match.
pub async fn start_match(session: Session) -> ApiResult<MatchSession> {
    let user = auth::require_user(&session).await?;

    let mut match_state = MatchSession::load(&session).await?;
    match_state.start();
    match_state.save(&session).await?;

    tracing::info!(user_id = %user.id, "Match started");
    success(match_state)
}

/// POST /api/match/finish - Archive the completed match.
pub async fn finish_match(
    State(state): State<AppState>,
    session: Session,
    ApiJson(request): ApiJson<FinishMatchRequest>,
) -> ApiResult<FinishedMatch> {
    let user = auth::require_user(&session).await?;

    let mut match_state = MatchSession::load(&session).await?;
    let (match_id, total_points) = match_state.finish()?;

    // The stored session stays in-match until the archive write succeeds.
    state
        .archive
        .archive(&match_id, &user.id, &request.rounds, total_points)
        .await?;

    match_state.mark_archived()?;
    match_state.save(&session).await?;

    success(FinishedMatch {
        match_id,
        total_points,
    })
}
