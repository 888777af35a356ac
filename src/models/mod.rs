//! Data models for the meme game.
//!
//! Field names serialize as camelCase to match the browser client.

mod content;
mod game;
mod user;

pub use content::*;
pub use game::*;
pub use user::*;
