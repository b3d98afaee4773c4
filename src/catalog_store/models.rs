//! Data models for the track catalog.

use crate::embedding::RawFeatures;
use crate::vibes::Vibe;
use serde::Serialize;

/// A catalog track with its immutable embedding.
///
/// The vector is produced once at ingestion and never mutated; re-ingestion
/// replaces the whole row atomically.
#[derive(Debug, Clone, Serialize)]
pub struct TrackEmbedding {
    pub track_id: String,
    /// Used by the explore-mode diversity penalty.
    pub artist_id: String,
    /// L2-normalized, exactly `embedding_dim` components.
    pub vector: Vec<f64>,
    pub raw_features: RawFeatures,
    /// Catalog insertion ordinal; the deterministic tie-break order for
    /// equal ranking scores.
    pub position: i64,
}

/// A track as submitted for ingestion, before the store assigns a position.
#[derive(Debug, Clone)]
pub struct NewTrack {
    pub track_id: String,
    pub artist_id: String,
    pub vector: Vec<f64>,
    pub raw_features: RawFeatures,
}

/// Which slice of the catalog a candidate listing should return.
#[derive(Debug, Clone, Default)]
pub struct CandidateFilter {
    /// Restrict to tracks carrying this vibe.
    pub vibe: Option<Vibe>,
    /// Exclude tracks this user has already been shown.
    pub unseen_by: Option<String>,
}

impl CandidateFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn unseen_by(user_id: &str) -> Self {
        Self {
            vibe: None,
            unseen_by: Some(user_id.to_string()),
        }
    }

    pub fn vibe(vibe: Vibe) -> Self {
        Self {
            vibe: Some(vibe),
            unseen_by: None,
        }
    }

    pub fn unseen_vibe(user_id: &str, vibe: Vibe) -> Self {
        Self {
            vibe: Some(vibe),
            unseen_by: Some(user_id.to_string()),
        }
    }
}
