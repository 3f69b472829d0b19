//! Error types for setup and parsing failures.
//!
//! Gameplay legality problems are never surfaced as errors: an illegal action
//! is rewritten into [`Action::Invalid`](crate::Action::Invalid) and logged to
//! the round history instead. The types here cover the loud-failure class,
//! where bad input indicates a programming or integration defect.

use thiserror::Error;

/// Errors raised while parsing card notation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CardParseError {
    /// The notation string was empty.
    #[error("empty card notation")]
    Empty,
    /// No suit could be recognized in the token.
    #[error("unrecognized suit in `{0}`")]
    UnknownSuit(String),
    /// The rank portion was not a valid rank.
    #[error("unrecognized rank in `{0}`")]
    UnknownRank(String),
}
