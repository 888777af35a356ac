//! Gameplay core: round generation, scoring, match state and the match archive.

pub mod archive;
pub mod round;
pub mod scorer;
pub mod session;

pub use archive::MatchArchive;
pub use round::next_round;
pub use scorer::score;
pub use session::MatchSession;
