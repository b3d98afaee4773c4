//! Recommender configuration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Smallest feed size a caller may request.
pub const MIN_FEED_SIZE: usize = 1;
/// Largest feed size a caller may request.
pub const MAX_FEED_SIZE: usize = 50;

/// Policy for a user's preference vector before any feedback exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialPreference {
    /// All-zero vector ("no preference yet").
    #[default]
    Zero,
    /// Random unit vector.
    Random,
    /// Mean of all catalog track embeddings, normalized.
    Mean,
}

/// Tunable parameters of the recommender engine.
#[derive(Debug, Clone)]
pub struct RecommenderSettings {
    /// Dimensionality of track embeddings and preference vectors.
    pub embedding_dim: usize,
    /// Learning rate for likes.
    pub alpha_like: f64,
    /// Learning rate for dislikes.
    pub beta_dislike: f64,
    /// Learning rate for more_like_this (a stronger signal than a like).
    pub gamma_more_like: f64,
    /// Number of tracks per feed when the caller doesn't specify a limit.
    pub default_feed_size: usize,
    /// Explore mode samples `limit * multiplier` candidates before ranking.
    pub explore_candidate_multiplier: usize,
    /// Share of a vibe feed drawn from unseen tracks (the rest comes from
    /// previously liked tracks).
    pub vibe_unseen_ratio: f64,
    /// Score reduction per repeated artist during explore selection.
    pub diversity_artist_penalty: f64,
    /// How a user's preference vector is initialized.
    pub initial_preference: InitialPreference,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            embedding_dim: 128,
            alpha_like: 0.3,
            beta_dislike: 0.5,
            gamma_more_like: 0.6,
            default_feed_size: 10,
            explore_candidate_multiplier: 5,
            vibe_unseen_ratio: 0.4,
            diversity_artist_penalty: 0.3,
            initial_preference: InitialPreference::Zero,
        }
    }
}

impl RecommenderSettings {
    /// Load settings from a TOML file, falling back to defaults for any
    /// field the file does not set.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file_config = FileConfig::load(path)?;
        Ok(Self::default().merged_with(file_config))
    }

    fn merged_with(mut self, file: FileConfig) -> Self {
        if let Some(v) = file.embedding_dim {
            self.embedding_dim = v;
        }
        if let Some(v) = file.alpha_like {
            self.alpha_like = v;
        }
        if let Some(v) = file.beta_dislike {
            self.beta_dislike = v;
        }
        if let Some(v) = file.gamma_more_like {
            self.gamma_more_like = v;
        }
        if let Some(v) = file.default_feed_size {
            self.default_feed_size = v;
        }
        if let Some(v) = file.explore_candidate_multiplier {
            self.explore_candidate_multiplier = v;
        }
        if let Some(v) = file.vibe_unseen_ratio {
            self.vibe_unseen_ratio = v;
        }
        if let Some(v) = file.diversity_artist_penalty {
            self.diversity_artist_penalty = v;
        }
        if let Some(v) = file.initial_preference {
            self.initial_preference = v;
        }
        self
    }
}

/// Settings overrides as read from a TOML config file.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub embedding_dim: Option<usize>,
    pub alpha_like: Option<f64>,
    pub beta_dislike: Option<f64>,
    pub gamma_more_like: Option<f64>,
    pub default_feed_size: Option<usize>,
    pub explore_candidate_multiplier: Option<usize>,
    pub vibe_unseen_ratio: Option<f64>,
    pub diversity_artist_penalty: Option<f64>,
    pub initial_preference: Option<InitialPreference>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
