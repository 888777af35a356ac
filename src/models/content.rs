//! Reference content: memes, captions and their scored associations.

use serde::{Deserialize, Serialize};

/// Point values a correct caption may carry.
pub const VALID_POINTS: [i64; 3] = [1, 2, 3];

/// An image shown to the player for a round.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meme {
    pub id: i64,
    pub image_url: String,
    pub title: String,
}

/// A text option a player may select.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Caption {
    pub id: i64,
    pub text: String,
}

/// A caption correctly associated with a meme, with its point value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CorrectCaption {
    pub id: i64,
    pub text: String,
    pub points: i64,
}

impl CorrectCaption {
    pub fn caption(&self) -> Caption {
        Caption {
            id: self.id,
            text: self.text.clone(),
        }
    }
}

/// A meme-caption association row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MemeCaption {
    pub meme_id: i64,
    pub caption_id: i64,
    pub points: i64,
}

/// Request body for creating a meme.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemeRequest {
    pub image_url: String,
    pub title: String,
}

/// Request body for creating a caption.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCaptionRequest {
    pub text: String,
}

/// Request body for associating a caption with a meme.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssociationRequest {
    pub caption_id: i64,
    pub points: i64,
}

/// Content document loaded at startup.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedContent {
    #[serde(default)]
    pub memes: Vec<Meme>,
    #[serde(default)]
    pub captions: Vec<Caption>,
    #[serde(default)]
    pub associations: Vec<MemeCaption>,
}
