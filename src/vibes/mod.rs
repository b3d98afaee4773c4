//! Vibe taxonomy and threshold-based track classification.
//!
//! The taxonomy is a small fixed set of six mood categories. Membership is
//! recomputed from a track's raw features whenever those change; a track
//! may carry several vibes, or none at all (still valid, just unclassified
//! for vibe-mode browsing).

use crate::embedding::RawFeatures;
use serde::Serialize;

/// One of the six canonical vibes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vibe {
    Energetic,
    Chill,
    Melancholic,
    Upbeat,
    Focus,
    Party,
}

impl Vibe {
    pub const ALL: [Vibe; 6] = [
        Vibe::Energetic,
        Vibe::Chill,
        Vibe::Melancholic,
        Vibe::Upbeat,
        Vibe::Focus,
        Vibe::Party,
    ];

    pub fn id(self) -> i64 {
        match self {
            Vibe::Energetic => 1,
            Vibe::Chill => 2,
            Vibe::Melancholic => 3,
            Vibe::Upbeat => 4,
            Vibe::Focus => 5,
            Vibe::Party => 6,
        }
    }

    pub fn from_id(id: i64) -> Option<Vibe> {
        match id {
            1 => Some(Vibe::Energetic),
            2 => Some(Vibe::Chill),
            3 => Some(Vibe::Melancholic),
            4 => Some(Vibe::Upbeat),
            5 => Some(Vibe::Focus),
            6 => Some(Vibe::Party),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Vibe::Energetic => "energetic",
            Vibe::Chill => "chill",
            Vibe::Melancholic => "melancholic",
            Vibe::Upbeat => "upbeat",
            Vibe::Focus => "focus",
            Vibe::Party => "party",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Vibe::Energetic => "High energy, intense and powerful",
            Vibe::Chill => "Relaxed, calm and mellow",
            Vibe::Melancholic => "Sad, emotional and introspective",
            Vibe::Upbeat => "Happy, positive and cheerful",
            Vibe::Focus => "Concentration and productivity",
            Vibe::Party => "Dance, celebration and excitement",
        }
    }

    /// Presentation color, passed through to clients untouched.
    pub fn color(self) -> &'static str {
        match self {
            Vibe::Energetic => "#FF6B6B",
            Vibe::Chill => "#4ECDC4",
            Vibe::Melancholic => "#95A5A6",
            Vibe::Upbeat => "#FFD93D",
            Vibe::Focus => "#6C5CE7",
            Vibe::Party => "#FD79A8",
        }
    }
}

/// Full vibe record as exposed to API consumers.
#[derive(Debug, Clone, Serialize)]
pub struct VibeTag {
    pub vibe_id: i64,
    pub name: String,
    pub description: String,
    pub color: String,
}

impl From<Vibe> for VibeTag {
    fn from(vibe: Vibe) -> Self {
        VibeTag {
            vibe_id: vibe.id(),
            name: vibe.name().to_string(),
            description: vibe.description().to_string(),
            color: vibe.color().to_string(),
        }
    }
}

/// Assign vibes to a track from its raw features.
///
/// Pure threshold rules; the returned list follows the taxonomy order of
/// `Vibe::ALL` but carries no semantic ordering.
pub fn classify(features: &RawFeatures) -> Vec<Vibe> {
    let f = features;
    let mut vibes = Vec::new();
    if f.energy >= 0.7 && f.danceability >= 0.6 {
        vibes.push(Vibe::Energetic);
    }
    if f.energy <= 0.4 && f.acousticness >= 0.5 {
        vibes.push(Vibe::Chill);
    }
    if f.valence <= 0.35 && f.energy <= 0.45 {
        vibes.push(Vibe::Melancholic);
    }
    if f.valence >= 0.6 && (0.4..=0.8).contains(&f.energy) {
        vibes.push(Vibe::Upbeat);
    }
    if f.instrumentalness >= 0.5 && (0.3..=0.6).contains(&f.energy) {
        vibes.push(Vibe::Focus);
    }
    if f.danceability >= 0.7 && f.energy >= 0.6 && f.valence >= 0.6 {
        vibes.push(Vibe::Party);
    }
    vibes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vibe_id_round_trip() {
        for vibe in Vibe::ALL {
            assert_eq!(Vibe::from_id(vibe.id()), Some(vibe));
        }
        assert_eq!(Vibe::from_id(0), None);
        assert_eq!(Vibe::from_id(7), None);
    }

    #[test]
    fn test_classify_energetic_and_party_overlap() {
        let features = RawFeatures {
            energy: 0.9,
            danceability: 0.8,
            valence: 0.7,
            ..RawFeatures::default()
        };
        let vibes = classify(&features);
        assert!(vibes.contains(&Vibe::Energetic));
        assert!(vibes.contains(&Vibe::Party));
        assert!(!vibes.contains(&Vibe::Chill));
    }

    #[test]
    fn test_classify_chill_and_melancholic() {
        let features = RawFeatures {
            energy: 0.3,
            acousticness: 0.8,
            valence: 0.2,
            ..RawFeatures::default()
        };
        let vibes = classify(&features);
        assert!(vibes.contains(&Vibe::Chill));
        assert!(vibes.contains(&Vibe::Melancholic));
    }

    #[test]
    fn test_classify_focus_energy_band() {
        let base = RawFeatures {
            instrumentalness: 0.9,
            valence: 0.5,
            ..RawFeatures::default()
        };
        for (energy, expected) in [(0.29, false), (0.3, true), (0.6, true), (0.61, false)] {
            let features = RawFeatures { energy, ..base.clone() };
            assert_eq!(
                classify(&features).contains(&Vibe::Focus),
                expected,
                "energy {}",
                energy
            );
        }
    }

    #[test]
    fn test_classify_none_is_valid() {
        // Middle-of-the-road track matching no rule
        let features = RawFeatures {
            energy: 0.5,
            danceability: 0.5,
            valence: 0.5,
            acousticness: 0.3,
            instrumentalness: 0.1,
            ..RawFeatures::default()
        };
        assert!(classify(&features).is_empty());
    }

    #[test]
    fn test_upbeat_boundary_inclusive() {
        let features = RawFeatures {
            valence: 0.6,
            energy: 0.8,
            danceability: 0.2,
            ..RawFeatures::default()
        };
        assert!(classify(&features).contains(&Vibe::Upbeat));
    }
}
