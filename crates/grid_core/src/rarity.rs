//! Rarity scoring for correct guesses.
//!
//! A guess is graded against every other correct answer for the same cell.
//! The least popular answer earns the most points; small pools add a bonus so
//! that a cell with three answers is worth more than one with three hundred.
//!
//! ```text
//! c     = (rank - 1) / (N - 1)           rank 1 = least popular, c = 0 when N = 1
//! base  = 10 + (1 - c) * 90
//! bonus = 30 * d(N) * (1 - c)^0.7
//! score = clamp(round(base + bonus), 10, 100)
//! ```

use std::cmp::Ordering;

use crate::models::{AwardKind, Player, PlayerId, StatField};
use crate::seed::{seed_hash, tiebreak_key};

pub const MIN_SCORE: u8 = 10;
pub const MAX_SCORE: u8 = 100;

const BONUS_MAX: f64 = 30.0;
const BONUS_EXPONENT: f64 = 0.7;
/// Pools up to this size get the full bonus.
const FULL_BONUS_POOL: f64 = 3.0;
/// Pools of this size or larger get none.
const NO_BONUS_POOL: f64 = 100.0;

fn award_weight(kind: AwardKind) -> f64 {
    match kind {
        AwardKind::HallOfFame => 40.0,
        AwardKind::Mvp => 18.0,
        AwardKind::FinalsMvp => 10.0,
        AwardKind::AllLeague => 5.0,
        AwardKind::AllStar => 3.0,
        AwardKind::Champion => 1.5,
        AwardKind::RookieOfTheYear | AwardKind::DefensivePlayer => 0.0,
    }
}

/// How well known a player is: honors dominate, career volume separates the rest.
pub fn popularity(player: &Player) -> f64 {
    let honors: f64 = player.awards.iter().map(|award| award_weight(award.kind)).sum();
    let minutes = player.career_total(StatField::Minutes).max(0.0);
    let points = player.career_total(StatField::Points).max(0.0);
    let games = f64::from(player.career_games());
    honors + minutes.ln_1p() + 1.5 * points.ln_1p() + 2.0 * games.ln_1p()
}

/// Small-pool multiplier in `[0, 1]`.
pub fn pool_decay(pool_size: usize) -> f64 {
    let n = pool_size as f64;
    if n <= FULL_BONUS_POOL {
        1.0
    } else if n >= NO_BONUS_POOL {
        0.0
    } else {
        1.0 - (n / FULL_BONUS_POOL).ln() / (NO_BONUS_POOL / FULL_BONUS_POOL).ln()
    }
}

/// Score for a 1-based `rank` (1 = least popular) in a pool of `pool_size`.
pub fn score_for_rank(rank: usize, pool_size: usize) -> u8 {
    let c = if pool_size <= 1 { 0.0 } else { (rank.saturating_sub(1)) as f64 / (pool_size - 1) as f64 };
    let rarity = (1.0 - c).clamp(0.0, 1.0);
    let base = f64::from(MIN_SCORE) + rarity * 90.0;
    let bonus = BONUS_MAX * pool_decay(pool_size) * rarity.powf(BONUS_EXPONENT);
    (base + bonus).round().clamp(f64::from(MIN_SCORE), f64::from(MAX_SCORE)) as u8
}

/// Pool ordered from least to most popular. Exact ties are broken by a
/// per-puzzle hash so no player is favoured across puzzles.
pub fn rank_pool<'p>(pool: &[&'p Player], puzzle_seed: &str) -> Vec<&'p Player> {
    let puzzle = seed_hash(puzzle_seed);
    let mut keyed: Vec<(f64, u64, &Player)> =
        pool.iter().map(|player| (popularity(player), tiebreak_key(player.id, puzzle), *player)).collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal).then(a.1.cmp(&b.1)));
    keyed.into_iter().map(|(_, _, player)| player).collect()
}

/// Rarity score of `guess` within `pool`, or `None` if the guess is not in the pool.
pub fn score(guess: PlayerId, pool: &[&Player], puzzle_seed: &str) -> Option<u8> {
    let ranked = rank_pool(pool, puzzle_seed);
    let position = ranked.iter().position(|player| player.id == guess)?;
    Some(score_for_rank(position + 1, ranked.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Award, SeasonLine};

    fn player(id: PlayerId, games: u16, points: f64, awards: Vec<AwardKind>) -> Player {
        Player::new(id, format!("P{id}"), vec![SeasonLine::regular(2010, 1, games).with_stat(StatField::Points, points)])
            .with_awards(awards.into_iter().map(|kind| Award { kind, season: 2010, team_id: Some(1) }).collect())
    }

    #[test]
    fn test_single_player_pool_scores_max() {
        let only = player(1, 10, 50.0, vec![AwardKind::Mvp]);
        assert_eq!(score(1, &[&only], "seed"), Some(100));
    }

    #[test]
    fn test_star_scores_below_journeyman() {
        let star = player(1, 82, 2500.0, vec![AwardKind::HallOfFame, AwardKind::Mvp]);
        let role = player(2, 40, 200.0, vec![]);
        let bench = player(3, 3, 4.0, vec![]);
        let pool = [&star, &role, &bench];

        let bench_score = score(3, &pool, "s").unwrap();
        let role_score = score(2, &pool, "s").unwrap();
        let star_score = score(1, &pool, "s").unwrap();
        assert!(bench_score > role_score && role_score > star_score);
        assert_eq!(bench_score, 100);
        assert_eq!(star_score, MIN_SCORE);
    }

    #[test]
    fn test_guess_outside_pool() {
        let a = player(1, 10, 10.0, vec![]);
        assert_eq!(score(2, &[&a], "s"), None);
    }

    #[test]
    fn test_ties_are_stable_per_puzzle() {
        let players: Vec<Player> = (1..=6).map(|id| player(id, 10, 10.0, vec![])).collect();
        let pool: Vec<&Player> = players.iter().collect();
        let first: Vec<PlayerId> = rank_pool(&pool, "daily").iter().map(|p| p.id).collect();
        let again: Vec<PlayerId> = rank_pool(&pool, "daily").iter().map(|p| p.id).collect();
        assert_eq!(first, again);

        let reversed: Vec<&Player> = players.iter().rev().collect();
        let from_reversed: Vec<PlayerId> = rank_pool(&reversed, "daily").iter().map(|p| p.id).collect();
        assert_eq!(first, from_reversed);
    }

    #[test]
    fn test_pool_decay_edges() {
        assert_eq!(pool_decay(1), 1.0);
        assert_eq!(pool_decay(3), 1.0);
        assert_eq!(pool_decay(100), 0.0);
        assert_eq!(pool_decay(5000), 0.0);
        assert!(pool_decay(10) > pool_decay(50));
    }

    #[test]
    fn test_large_pool_has_no_bonus() {
        assert_eq!(score_for_rank(1, 200), 100);
        assert_eq!(score_for_rank(200, 200), 10);
        assert_eq!(score_for_rank(1, 2), 100);
        // c = 0.5 in a pool of 3: 55 + 30 * 0.5^0.7 = 73.47
        assert_eq!(score_for_rank(2, 3), 73);
    }
}
