//! Track embedding model.
//!
//! Maps a track's audio-feature attributes to a fixed-dimension unit vector.
//! `embed` is a pure function: the same features always produce the same
//! vector, so re-ingesting a track is idempotent.

use super::vector::l2_normalize;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

/// Named audio attributes of a track, as delivered by the ingestion side.
///
/// All values are expected in [0, 1] except `loudness` (dB, typically
/// [-60, 0]) and `tempo` (BPM). Missing attributes default to the neutral
/// midpoint the original Spotify feature scale uses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFeatures {
    pub acousticness: f64,
    pub danceability: f64,
    pub energy: f64,
    pub instrumentalness: f64,
    pub liveness: f64,
    pub loudness: f64,
    pub speechiness: f64,
    pub valence: f64,
    pub tempo: f64,
}

impl Default for RawFeatures {
    fn default() -> Self {
        Self {
            acousticness: 0.5,
            danceability: 0.5,
            energy: 0.5,
            instrumentalness: 0.5,
            liveness: 0.5,
            loudness: -30.0,
            speechiness: 0.5,
            valence: 0.5,
            tempo: 120.0,
        }
    }
}

impl RawFeatures {
    /// The 9-component base vector with loudness mapped from [-60, 0] dB
    /// and tempo capped at 200 BPM, both clamped to [0, 1].
    pub(crate) fn normalized(&self) -> [f64; 9] {
        [
            self.acousticness,
            self.danceability,
            self.energy,
            self.instrumentalness,
            self.liveness,
            ((self.loudness + 60.0) / 60.0).clamp(0.0, 1.0),
            self.speechiness,
            self.valence,
            (self.tempo / 200.0).clamp(0.0, 1.0),
        ]
    }
}

/// Derives fixed-dimension track embeddings from raw audio features.
#[derive(Debug, Clone)]
pub struct EmbeddingModel {
    dim: usize,
}

impl EmbeddingModel {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Embed raw features into a `dim`-component unit vector.
    ///
    /// For `dim == 9` the normalized feature vector is used directly; for
    /// smaller dimensions it is truncated. Larger dimensions expand the
    /// base vector through a Gaussian random projection whose RNG seed is
    /// derived from the feature sum, which keeps the function pure: equal
    /// features always map to an identical projection and therefore to an
    /// identical embedding.
    pub fn embed(&self, features: &RawFeatures) -> Vec<f64> {
        let base = features.normalized();
        let mut vector = match self.dim {
            9 => base.to_vec(),
            d if d < 9 => base[..d].to_vec(),
            d => {
                let seed = (base.iter().sum::<f64>() * 1000.0) as u64;
                let mut rng = StdRng::seed_from_u64(seed);
                let mut expanded = vec![0.0f64; d];
                for value in base {
                    for slot in expanded.iter_mut() {
                        let weight: f64 = rng.sample(StandardNormal);
                        *slot += value * weight;
                    }
                }
                expanded
            }
        };
        l2_normalize(&mut vector);
        vector
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::vector::l2_norm;

    fn energetic_features() -> RawFeatures {
        RawFeatures {
            energy: 0.9,
            danceability: 0.8,
            valence: 0.7,
            tempo: 140.0,
            loudness: -5.0,
            ..RawFeatures::default()
        }
    }

    #[test]
    fn test_embed_dimension_and_unit_norm() {
        for dim in [4, 9, 32, 128] {
            let model = EmbeddingModel::new(dim);
            let vector = model.embed(&energetic_features());
            assert_eq!(vector.len(), dim);
            assert!((l2_norm(&vector) - 1.0).abs() < 1e-9, "dim {}", dim);
        }
    }

    #[test]
    fn test_embed_is_deterministic() {
        let model = EmbeddingModel::new(128);
        let a = model.embed(&energetic_features());
        let b = model.embed(&energetic_features());
        assert_eq!(a, b);
    }

    #[test]
    fn test_different_features_differ() {
        let model = EmbeddingModel::new(128);
        let quiet = RawFeatures {
            energy: 0.1,
            acousticness: 0.9,
            ..RawFeatures::default()
        };
        assert_ne!(model.embed(&energetic_features()), model.embed(&quiet));
    }

    #[test]
    fn test_nonzero_features_never_embed_to_zero() {
        // The zero vector is reserved for "no preference yet".
        let model = EmbeddingModel::new(128);
        let vector = model.embed(&energetic_features());
        assert!(l2_norm(&vector) > 0.0);
    }

    #[test]
    fn test_loudness_and_tempo_normalization_clamped() {
        let features = RawFeatures {
            loudness: -90.0,
            tempo: 400.0,
            ..RawFeatures::default()
        };
        let base = features.normalized();
        assert_eq!(base[5], 0.0);
        assert_eq!(base[8], 1.0);
    }
}
