//! Seed handling for shareable puzzles.
//!
//! A puzzle seed is a short string. It is hashed into a `u64` which seeds a
//! `ChaCha8Rng`; every random decision of one generation call is drawn from
//! that stream, so the same seed over the same dataset rebuilds the same grid.
//!
//! FxHasher is used instead of `DefaultHasher`, which is not stable across
//! Rust versions and would break previously shared seeds.

use fxhash::FxHasher;
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::hash::{Hash, Hasher};

/// Characters allowed in a seed; keeps seeds URL- and share-code-safe.
const SEED_ALPHABET: &[u8] = b"abcdefghijkmnpqrstuvwxyz23456789";
const FRESH_SEED_LEN: usize = 10;
pub const MAX_SEED_LEN: usize = 64;

#[inline]
pub fn seed_hash(seed: &str) -> u64 {
    let mut hasher = FxHasher::default();
    seed.hash(&mut hasher);
    hasher.finish()
}

#[inline]
pub fn hash_u64(value: u64) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Tie-break key for two players with identical popularity: depends on the
/// puzzle, so no player is systematically favoured across puzzles.
#[inline]
pub fn tiebreak_key(player_id: u32, puzzle_hash: u64) -> u64 {
    hash_u64(u64::from(player_id)) ^ puzzle_hash
}

pub fn rng_for_seed(seed: &str) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed_hash(seed))
}

/// New seed string drawn from OS entropy.
pub fn fresh_seed() -> String {
    let mut rng = ChaCha8Rng::from_entropy();
    (0..FRESH_SEED_LEN)
        .map(|_| SEED_ALPHABET[rng.gen_range(0..SEED_ALPHABET.len())] as char)
        .collect()
}

/// Accepts caller seeds made of `[A-Za-z0-9_-]`, 1..=64 chars.
pub fn is_valid_seed(seed: &str) -> bool {
    !seed.is_empty()
        && seed.len() <= MAX_SEED_LEN
        && seed.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Index drawn proportionally to `weights`. Falls back to a uniform pick when
/// every weight is zero; `None` on an empty slice.
pub fn weighted_choice(rng: &mut ChaCha8Rng, weights: &[f64]) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    match WeightedIndex::new(weights) {
        Ok(dist) => Some(dist.sample(rng)),
        Err(_) => Some(rng.gen_range(0..weights.len())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let draw = |seed: &str| {
            let mut rng = rng_for_seed(seed);
            (0..8).map(|_| rng.gen::<u32>()).collect::<Vec<_>>()
        };
        let (a, b, c) = (draw("abc"), draw("abc"), draw("abd"));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_fresh_seed_is_valid() {
        for _ in 0..20 {
            let seed = fresh_seed();
            assert_eq!(seed.len(), FRESH_SEED_LEN);
            assert!(is_valid_seed(&seed), "{seed}");
        }
    }

    #[test]
    fn test_seed_validation() {
        assert!(is_valid_seed("daily-2024_01"));
        assert!(!is_valid_seed(""));
        assert!(!is_valid_seed("has space"));
        assert!(!is_valid_seed("dot.ted"));
        assert!(!is_valid_seed(&"x".repeat(MAX_SEED_LEN + 1)));
    }

    #[test]
    fn test_weighted_choice_respects_zero_weights() {
        let mut rng = rng_for_seed("weights");
        for _ in 0..100 {
            assert_eq!(weighted_choice(&mut rng, &[0.0, 1.0, 0.0]), Some(1));
        }
        assert!(weighted_choice(&mut rng, &[0.0, 0.0]).is_some());
        assert_eq!(weighted_choice(&mut rng, &[]), None);
    }

    #[test]
    fn test_tiebreak_depends_on_puzzle() {
        assert_ne!(tiebreak_key(5, seed_hash("a")), tiebreak_key(5, seed_hash("b")));
        assert_eq!(tiebreak_key(5, seed_hash("a")), tiebreak_key(5, seed_hash("a")));
    }
}
