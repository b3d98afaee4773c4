//! Data models for user preference and feedback storage.

use crate::error::RecommenderError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A user's reaction to a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Like,
    Dislike,
    MoreLikeThis,
    /// Reverses the most recent non-undone record; never stored itself.
    Undo,
}

impl FeedbackAction {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedbackAction::Like => "like",
            FeedbackAction::Dislike => "dislike",
            FeedbackAction::MoreLikeThis => "more_like_this",
            FeedbackAction::Undo => "undo",
        }
    }
}

impl FromStr for FeedbackAction {
    type Err = RecommenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(FeedbackAction::Like),
            "dislike" => Ok(FeedbackAction::Dislike),
            "more_like_this" => Ok(FeedbackAction::MoreLikeThis),
            "undo" => Ok(FeedbackAction::Undo),
            other => Err(RecommenderError::InvalidAction(other.to_string())),
        }
    }
}

/// One entry in the append-only feedback log.
///
/// Carrying the exact applied delta makes every record invertible: undo is
/// "negate the delta of the most recent record with `undone = false`". Records
/// are never deleted, only flagged.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRecord {
    /// Monotonic per-user ordering.
    pub feedback_id: i64,
    pub user_id: String,
    pub track_id: String,
    pub action: FeedbackAction,
    /// The exact vector delta added to the preference vector, before
    /// renormalization.
    pub delta_applied: Vec<f64>,
    pub undone: bool,
    pub created_at: i64,
}
