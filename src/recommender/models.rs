//! Request and response models for the recommender engine.

use serde::Serialize;

/// Which feed algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Only tracks the user has never been shown.
    Explore,
    /// Tracks carrying the given vibe id, mixing liked and unseen.
    Vibe(i64),
}

/// Parameters of a feed request.
#[derive(Debug, Clone)]
pub struct FeedRequest {
    pub mode: FeedMode,
    /// Number of tracks to return, 1 to 50. None falls back to the
    /// configured default feed size.
    pub limit: Option<usize>,
    /// Fixed RNG seed for reproducible feeds; None draws OS entropy.
    pub seed: Option<u64>,
}

impl FeedRequest {
    pub fn explore(limit: usize) -> Self {
        Self {
            mode: FeedMode::Explore,
            limit: Some(limit),
            seed: None,
        }
    }

    pub fn explore_default() -> Self {
        Self {
            mode: FeedMode::Explore,
            limit: None,
            seed: None,
        }
    }

    pub fn vibe(vibe_id: i64, limit: usize) -> Self {
        Self {
            mode: FeedMode::Vibe(vibe_id),
            limit: Some(limit),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// One ranked track in a generated feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedEntry {
    pub track_id: String,
    /// In explore mode this is the diversity-adjusted ranking score; in
    /// vibe mode the plain preference similarity (the final vibe order is
    /// shuffled, not score-ranked).
    pub score: f64,
}
