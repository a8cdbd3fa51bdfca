use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::config::GeneratorConfig;
use super::layout::{Layout, SlotKind};
use crate::achievements::ExclusionGroup;
use crate::analysis::OverlapSummary;
use crate::constraint::Constraint;
use crate::context::LeagueContext;
use crate::eligibility::EligibilityIndex;

#[derive(Debug, Clone)]
pub(crate) struct Candidate {
    pub constraint: Constraint,
    pub group: Option<ExclusionGroup>,
    pub weight: f64,
}

/// Headers that can appear in a grid for one dataset, sorted by identity so
/// that the seeded draws do not depend on catalog or hash-map order.
#[derive(Debug, Clone, Default)]
pub(crate) struct CandidatePools {
    pub teams: Vec<Candidate>,
    pub achievements: Vec<Candidate>,
}

impl CandidatePools {
    pub(crate) fn build(ctx: &LeagueContext<'_>, index: &EligibilityIndex, config: &GeneratorConfig) -> Self {
        let mut teams: Vec<Candidate> = ctx
            .dataset
            .enabled_teams()
            .map(|team| Constraint::team(team.id))
            .filter(|header| index.has_at_least(ctx, header, 1))
            .map(|constraint| Candidate { constraint, group: None, weight: 1.0 })
            .collect();
        teams.sort_by(|a, b| a.constraint.cmp(&b.constraint));

        let reference_year = ctx.dataset.current_season.unwrap_or(config.decade.reference_year);
        let mut achievements: Vec<Candidate> = ctx
            .achievements()
            .iter()
            .filter_map(|achievement| {
                let constraint = LeagueContext::constraint_for(achievement);
                let min = if config.enforce_min_players { achievement.min_players.max(1) } else { 1 };
                if !index.has_at_least(ctx, &constraint, min) {
                    return None;
                }
                let weight = achievement
                    .decade()
                    .map_or(1.0, |decade| config.decade.weight(decade, reference_year));
                Some(Candidate { constraint, group: achievement.group, weight })
            })
            .collect();
        achievements.sort_by(|a, b| a.constraint.cmp(&b.constraint));

        tracing::debug!(
            teams = teams.len(),
            achievements = achievements.len(),
            "built header candidate pools"
        );
        Self { teams, achievements }
    }

    pub(crate) fn of_kind(&self, kind: SlotKind) -> &[Candidate] {
        match kind {
            SlotKind::Team => &self.teams,
            SlotKind::Achievement => &self.achievements,
        }
    }

    pub(crate) fn season_aligned(&self) -> Vec<&Candidate> {
        self.achievements.iter().filter(|c| c.constraint.is_season_specific()).collect()
    }

    pub(crate) fn supports(&self, layout: Layout) -> bool {
        self.teams.len() >= layout.teams_needed() && self.achievements.len() >= layout.achievements_needed()
    }
}

/// Weighted shuffle without replacement: positions into `weights`, most
/// likely first, truncated to `limit`.
///
/// Each item gets the key `u^(1/w)` and items are sorted by descending key,
/// which draws proportionally to weight one item at a time. Zero weights sort
/// last.
pub(crate) fn draw_order(rng: &mut ChaCha8Rng, weights: &[f64], limit: usize) -> Vec<usize> {
    let mut keyed: Vec<(f64, usize)> = weights
        .iter()
        .enumerate()
        .map(|(i, &w)| {
            let u: f64 = rng.gen();
            let key = if w > 0.0 { u.powf(1.0 / w) } else { u - 1.0 };
            (key, i)
        })
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
    keyed.into_iter().take(limit).map(|(_, i)| i).collect()
}

/// Cheap necessary condition from the overlap summary. `false` means the pair
/// is known to share no player; `true` still needs index verification.
pub(crate) fn may_intersect(overlap: Option<&OverlapSummary>, a: &Constraint, b: &Constraint) -> bool {
    let Some(overlap) = overlap else {
        return true;
    };
    match (a, b) {
        (Constraint::Team { team_id: x }, Constraint::Team { team_id: y }) => overlap.shared_players(*x, *y) > 0,
        (Constraint::Team { team_id }, Constraint::Achievement { id, .. })
        | (Constraint::Achievement { id, .. }, Constraint::Team { team_id }) => overlap.may_overlap(*team_id, id),
        (Constraint::Achievement { id: x, .. }, Constraint::Achievement { id: y, .. }) => {
            match (overlap.teams_for(x), overlap.teams_for(y)) {
                (Some(xs), Some(ys)) => xs.iter().any(|team| ys.contains(team)),
                _ => true,
            }
        }
    }
}
