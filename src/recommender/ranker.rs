//! Feed generation: candidate pooling, scoring, diversity penalty and
//! deterministic sampling.
//!
//! Both feed modes take a caller-seeded RNG, so the same seed against the
//! same catalog and seen-state reproduces the exact same feed. Candidate
//! listings arrive in catalog insertion order, which doubles as the
//! tie-break order for equal scores.

use super::models::FeedEntry;
use crate::catalog_store::{CandidateFilter, CatalogStore, TrackEmbedding};
use crate::embedding::dot;
use crate::error::RecommenderError;
use crate::profile_store::FeedbackStore;
use crate::vibes::Vibe;
use rand::prelude::*;
use rand::seq::index;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

/// Explore mode: rank a random sample of the user's unseen tracks.
pub(super) fn explore_feed(
    catalog: &dyn CatalogStore,
    preference: &[f64],
    user_id: &str,
    limit: usize,
    candidate_multiplier: usize,
    diversity_penalty: f64,
    rng: &mut StdRng,
) -> Result<Vec<FeedEntry>, RecommenderError> {
    let pool = catalog.list_candidates(&CandidateFilter::unseen_by(user_id))?;

    // A short pool is returned whole; fewer than `limit` results is valid.
    let candidates = if pool.len() <= limit {
        pool
    } else {
        let sample_size = (limit * candidate_multiplier).min(pool.len());
        let picked: HashSet<usize> = index::sample(rng, pool.len(), sample_size).into_iter().collect();
        pool.into_iter()
            .enumerate()
            .filter(|(i, _)| picked.contains(i))
            .map(|(_, track)| track)
            .collect()
    };

    Ok(select_with_diversity(
        candidates,
        preference,
        limit,
        diversity_penalty,
    ))
}

/// Greedy top-N selection with an incremental artist diversity penalty.
///
/// Each pick reduces the adjusted score of the picked artist's remaining
/// tracks by `penalty * occurrences_selected`, so a strong artist keeps its
/// best track near the top while its catalog-mates are progressively
/// demoted. Greedy, not globally optimal, by contract.
fn select_with_diversity(
    candidates: Vec<TrackEmbedding>,
    preference: &[f64],
    limit: usize,
    penalty: f64,
) -> Vec<FeedEntry> {
    struct Scored {
        track: TrackEmbedding,
        base: f64,
    }

    // Candidates stay in catalog insertion order; the strict `>` below then
    // resolves score ties toward the earlier-ingested track.
    let mut remaining: Vec<Scored> = candidates
        .into_iter()
        .map(|track| Scored {
            base: dot(preference, &track.vector),
            track,
        })
        .collect();

    let mut artist_counts: HashMap<String, usize> = HashMap::new();
    let mut selected = Vec::new();

    while selected.len() < limit && !remaining.is_empty() {
        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, candidate) in remaining.iter().enumerate() {
            let occurrences = artist_counts
                .get(&candidate.track.artist_id)
                .copied()
                .unwrap_or(0);
            let adjusted = candidate.base - penalty * occurrences as f64;
            if adjusted > best_score {
                best_score = adjusted;
                best_index = i;
            }
        }
        let chosen = remaining.remove(best_index);
        *artist_counts.entry(chosen.track.artist_id).or_insert(0) += 1;
        selected.push(FeedEntry {
            track_id: chosen.track.track_id,
            score: best_score,
        });
    }
    selected
}

/// Vibe mode: mix top-scoring unseen tracks with a random sample of
/// previously liked ones, then shuffle.
pub(super) fn vibe_feed(
    catalog: &dyn CatalogStore,
    feedback: &dyn FeedbackStore,
    preference: &[f64],
    user_id: &str,
    vibe: Vibe,
    limit: usize,
    unseen_ratio: f64,
    rng: &mut StdRng,
) -> Result<Vec<FeedEntry>, RecommenderError> {
    let vibe_pool = catalog.list_candidates(&CandidateFilter::vibe(vibe))?;
    if vibe_pool.is_empty() {
        return Err(RecommenderError::EmptyVibe(vibe.name()));
    }

    let unseen = catalog.list_candidates(&CandidateFilter::unseen_vibe(user_id, vibe))?;
    let liked_ids: HashSet<String> = feedback.liked_track_ids(user_id)?.into_iter().collect();
    // Liked tracks resolved through the vibe pool, keeping insertion order
    // so sampling is deterministic under a fixed seed.
    let liked: Vec<&TrackEmbedding> = vibe_pool
        .iter()
        .filter(|t| liked_ids.contains(&t.track_id))
        .collect();

    let unseen_target = ((limit as f64) * unseen_ratio).round() as usize;
    let unseen_target = unseen_target.min(limit);
    let mut unseen_take = unseen_target.min(unseen.len());
    let mut liked_take = (limit - unseen_target).min(liked.len());
    // A subset smaller than its share is backfilled from the other; an
    // imbalanced vibe never fails, it just shifts the composition.
    if unseen_take + liked_take < limit {
        unseen_take = (limit - liked_take).min(unseen.len());
        liked_take = (limit - unseen_take).min(liked.len());
    }

    // Unseen subset: top-scoring first, no diversity penalty in vibe mode.
    let mut scored_unseen: Vec<(f64, &TrackEmbedding)> = unseen
        .iter()
        .map(|track| (dot(preference, &track.vector), track))
        .collect();
    scored_unseen.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let mut entries: Vec<FeedEntry> = scored_unseen
        .iter()
        .take(unseen_take)
        .map(|(score, track)| FeedEntry {
            track_id: track.track_id.clone(),
            score: *score,
        })
        .collect();

    // Liked subset: uniform random sample.
    entries.extend(liked.choose_multiple(rng, liked_take).map(|track| FeedEntry {
        track_id: track.track_id.clone(),
        score: dot(preference, &track.vector),
    }));

    // The final vibe feed is shuffled, not score-ranked.
    entries.shuffle(rng);
    Ok(entries)
}
