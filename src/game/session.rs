//! Per-browser-session match state.
//!
//! Stored in the server-side session under [`MATCH_SESSION_KEY`]. Logging out or
//! letting the session expire discards an unfinished match without archiving it.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::errors::AppError;

/// Number of rounds in an authenticated match.
pub const MATCH_ROUNDS: usize = 3;

/// Session key for the match state.
pub const MATCH_SESSION_KEY: &str = "match";

/// Match lifecycle: `NoMatch -> InMatch -> MatchComplete -> NoMatch`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum MatchSession {
    #[default]
    NoMatch,
    /// `id` becomes the archived match id, so a match is stored at most once.
    #[serde(rename_all = "camelCase")]
    InMatch {
        id: String,
        points: i64,
        used_memes: Vec<i64>,
        rounds_played: usize,
    },
    MatchComplete { id: String, total: i64 },
}

impl MatchSession {
    /// Begin a fresh match from any state.
    pub fn start(&mut self) {
        *self = MatchSession::InMatch {
            id: uuid::Uuid::new_v4().to_string(),
            points: 0,
            used_memes: Vec::new(),
            rounds_played: 0,
        };
    }

    pub fn is_active(&self) -> bool {
        matches!(self, MatchSession::InMatch { .. })
    }

    /// Memes already shown in the current match.
    pub fn used_memes(&self) -> &[i64] {
        match self {
            MatchSession::InMatch { used_memes, .. } => used_memes,
            _ => &[],
        }
    }

    /// Fails unless another meme may be served in this match.
    pub fn ensure_can_serve(&self) -> Result<(), AppError> {
        match self {
            MatchSession::InMatch { used_memes, .. } if used_memes.len() < MATCH_ROUNDS => Ok(()),
            MatchSession::InMatch { .. } => Err(AppError::InvalidState(format!(
                "All {} rounds of this match have been served",
                MATCH_ROUNDS
            ))),
            _ => Err(AppError::InvalidState("No match in progress".to_string())),
        }
    }

    /// Remember a meme served to the player.
    ///
    /// A previously served meme that was never answered counts as a zero-point round.
    pub fn record_meme(&mut self, meme_id: i64) -> Result<(), AppError> {
        self.ensure_can_serve()?;
        self.settle_unanswered();
        if let MatchSession::InMatch { used_memes, .. } = self {
            used_memes.push(meme_id);
        }
        Ok(())
    }

    /// Close out served rounds that never received an answer.
    fn settle_unanswered(&mut self) {
        if let MatchSession::InMatch {
            used_memes,
            rounds_played,
            ..
        } = self
        {
            if used_memes.len() > *rounds_played {
                tracing::debug!(
                    skipped = used_memes.len() - *rounds_played,
                    "Unanswered rounds scored as zero"
                );
                *rounds_played = used_memes.len();
            }
        }
    }

    /// Add the points earned in one round.
    pub fn record_round(&mut self, earned: i64) -> Result<(), AppError> {
        match self {
            MatchSession::InMatch {
                points,
                rounds_played,
                ..
            } if *rounds_played < MATCH_ROUNDS => {
                *points += earned;
                *rounds_played += 1;
                Ok(())
            }
            MatchSession::InMatch { .. } => Err(AppError::InvalidState(format!(
                "All {} rounds of this match have been played",
                MATCH_ROUNDS
            ))),
            _ => Err(AppError::InvalidState("No match in progress".to_string())),
        }
    }

    /// Record points for the served meme still awaiting an answer.
    pub fn record_answer(&mut self, meme_id: i64, earned: i64) -> Result<(), AppError> {
        let awaiting = match self {
            MatchSession::InMatch {
                used_memes,
                rounds_played,
                ..
            } => used_memes.get(*rounds_played).copied(),
            _ => return Err(AppError::InvalidState("No match in progress".to_string())),
        };

        if awaiting != Some(meme_id) {
            return Err(AppError::InvalidState(format!(
                "Meme {} is not awaiting an answer in this match",
                meme_id
            )));
        }

        self.record_round(earned)
    }

    /// Close the match after the final round and return its id and total.
    ///
    /// Once every round has been served, an unanswered final round scores zero.
    pub fn finish(&mut self) -> Result<(String, i64), AppError> {
        self.settle_unanswered();
        match self {
            MatchSession::InMatch {
                id,
                points,
                rounds_played,
                ..
            } if *rounds_played == MATCH_ROUNDS => {
                let (id, total) = (id.clone(), *points);
                *self = MatchSession::MatchComplete {
                    id: id.clone(),
                    total,
                };
                Ok((id, total))
            }
            MatchSession::InMatch { rounds_played, .. } => Err(AppError::InvalidState(format!(
                "Match has {} of {} rounds played",
                rounds_played, MATCH_ROUNDS
            ))),
            _ => Err(AppError::InvalidState("No match in progress".to_string())),
        }
    }

    /// Return to `NoMatch` once the completed match has been archived.
    pub fn mark_archived(&mut self) -> Result<(), AppError> {
        match self {
            MatchSession::MatchComplete { .. } => {
                *self = MatchSession::NoMatch;
                Ok(())
            }
            _ => Err(AppError::InvalidState("Match is not complete".to_string())),
        }
    }

    /// Read the match state from the server session.
    pub async fn load(session: &Session) -> Result<Self, AppError> {
        Ok(session
            .get::<MatchSession>(MATCH_SESSION_KEY)
            .await?
            .unwrap_or_default())
    }

    /// Write the match state back to the server session.
    pub async fn save(&self, session: &Session) -> Result<(), AppError> {
        session.insert(MATCH_SESSION_KEY, self).await?;
        Ok(())
    }
}
