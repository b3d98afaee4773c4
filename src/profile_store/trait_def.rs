//! PreferenceStore and FeedbackStore trait definitions.

use super::models::{FeedbackAction, FeedbackRecord};
use anyhow::Result;

/// Trait for preference-vector storage backends.
pub trait PreferenceStore: Send + Sync {
    /// Current preference vector for a user, materializing the configured
    /// initial vector on first access.
    fn get(&self, user_id: &str) -> Result<Vec<f64>>;

    /// Add `delta` to the user's vector, then L2-normalize and persist.
    /// Returns the stored vector. A delta that exactly cancels the prior
    /// vector leaves the zero vector in place (normalization is a no-op on
    /// the zero vector).
    ///
    /// Callers must serialize invocations per user; the engine holds a
    /// per-user lock across every feedback application.
    fn apply_delta(&self, user_id: &str, delta: &[f64]) -> Result<Vec<f64>>;
}

/// Trait for the append-only feedback log.
pub trait FeedbackStore: Send + Sync {
    /// Append one record; returns it with its assigned id and timestamp.
    fn append_feedback(
        &self,
        user_id: &str,
        track_id: &str,
        action: FeedbackAction,
        delta: &[f64],
    ) -> Result<FeedbackRecord>;

    /// The most recent record with `undone = false` for this user.
    fn last_active_feedback(&self, user_id: &str) -> Result<Option<FeedbackRecord>>;

    /// Flip a record's `undone` flag to true. The record stays in the log.
    fn mark_undone(&self, feedback_id: i64) -> Result<()>;

    /// Distinct track IDs with a non-undone like or more_like_this record.
    fn liked_track_ids(&self, user_id: &str) -> Result<Vec<String>>;

    /// Most recent records first, including undone ones.
    fn feedback_history(&self, user_id: &str, limit: usize) -> Result<Vec<FeedbackRecord>>;
}
