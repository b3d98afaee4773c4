//! CatalogStore trait definition.

use super::models::{CandidateFilter, NewTrack, TrackEmbedding};
use crate::vibes::{Vibe, VibeTag};
use anyhow::Result;

/// Trait for catalog storage backends.
///
/// The recommender core reads track embeddings, vibe membership and the
/// per-user seen set through this seam; the only write paths are track
/// ingestion and marking tracks seen.
pub trait CatalogStore: Send + Sync {
    /// Get a track by ID.
    /// Returns Ok(None) if the track does not exist.
    fn get_track(&self, track_id: &str) -> Result<Option<TrackEmbedding>>;

    /// List candidate tracks matching the filter, in catalog insertion
    /// order (the deterministic tie-break order for ranking).
    fn list_candidates(&self, filter: &CandidateFilter) -> Result<Vec<TrackEmbedding>>;

    /// Number of tracks in the catalog.
    fn tracks_count(&self) -> Result<usize>;

    /// Insert a track, or atomically replace it and its vibe membership
    /// if the track ID already exists.
    fn upsert_track(&self, track: &NewTrack, vibes: &[Vibe]) -> Result<()>;

    /// Vibes currently assigned to a track.
    fn track_vibes(&self, track_id: &str) -> Result<Vec<Vibe>>;

    /// Normalized mean of all track embeddings; the zero vector on an
    /// empty catalog. Used by the `mean` initial-preference policy.
    fn mean_vector(&self, dim: usize) -> Result<Vec<f64>>;

    /// Record that a user has been shown a track. Idempotent; the seen set
    /// only ever grows (undo does not un-see a track).
    fn mark_seen(&self, user_id: &str, track_id: &str) -> Result<()>;

    /// Whether a user has been shown a track.
    fn is_seen(&self, user_id: &str, track_id: &str) -> Result<bool>;

    /// The vibe taxonomy, ordered by name.
    fn list_vibe_tags(&self) -> Result<Vec<VibeTag>>;
}
