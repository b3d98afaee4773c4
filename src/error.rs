//! Error types surfaced by the recommender engine.

use thiserror::Error;

/// Errors that can occur while generating feeds or applying feedback.
///
/// Every failure is reported as a distinct structured variant; a feed
/// request either yields a fully valid list or fails outright, never a
/// partial result.
#[derive(Debug, Error)]
pub enum RecommenderError {
    #[error("Track not found: {0}")]
    TrackNotFound(String),

    #[error("Unknown vibe id: {0}")]
    InvalidVibe(i64),

    #[error("Vibe '{0}' has no tracks")]
    EmptyVibe(&'static str),

    #[error("No feedback to undo")]
    NoHistory,

    #[error("Invalid feedback action: {0}")]
    InvalidAction(String),

    #[error("Feed limit out of range (1-50): {0}")]
    InvalidLimit(usize),

    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}
