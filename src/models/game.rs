//! Round, scoring and archived match shapes.

use serde::{Deserialize, Serialize};

use super::{Caption, Meme};

/// A meme with its shuffled caption options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub meme: Meme,
    pub captions: Vec<Caption>,
}

/// Request body for scoring a selection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    pub meme_id: i64,
    pub selected_caption_id: i64,
}

/// Points earned plus the full set of correct answers for feedback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    pub points: i64,
    pub correct_caption_ids: Vec<i64>,
    pub correct_captions: Vec<Caption>,
}

/// Request body for finishing a match: the client's round records, stored as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct FinishMatchRequest {
    #[serde(default)]
    pub rounds: Vec<serde_json::Value>,
}

/// Result of archiving a match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedMatch {
    pub match_id: String,
    pub total_points: i64,
}

/// One line of a player's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSummary {
    pub id: String,
    pub total_points: i64,
    pub round_count: usize,
    pub created_at: String,
}

/// A fully archived match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDetail {
    pub id: String,
    #[serde(skip)]
    pub user_id: String,
    pub total_points: i64,
    pub created_at: String,
    pub rounds: Vec<serde_json::Value>,
}
