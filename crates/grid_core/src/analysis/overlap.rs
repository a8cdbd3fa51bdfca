use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::achievements::AchievementCatalog;
use crate::models::{AchievementId, LeagueDataset, TeamId};

/// Pre-analyzed overlap between teams and achievements.
///
/// Only ever a hint for ordering and pruning candidates: the eligibility index
/// still verifies every cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlapSummary {
    /// `low team id -> high team id -> players who played for both`
    team_pairs: FxHashMap<TeamId, FxHashMap<TeamId, u32>>,
    /// Teams with at least one qualifying player per achievement.
    achievement_teams: FxHashMap<AchievementId, FxHashSet<TeamId>>,
}

impl OverlapSummary {
    pub fn analyze(dataset: &LeagueDataset, catalog: &dyn AchievementCatalog) -> Self {
        let mut summary = Self::default();

        for player in &dataset.players {
            let teams: Vec<TeamId> = player.teams_played.iter().copied().collect();
            for (i, &a) in teams.iter().enumerate() {
                for &b in &teams[i + 1..] {
                    *summary.team_pairs.entry(a.min(b)).or_default().entry(a.max(b)).or_default() += 1;
                }
            }
        }

        let index = dataset.season_index.as_ref();
        for achievement in catalog.list_achievements(dataset.sport, index) {
            let teams = if achievement.is_season_specific() {
                index.map(|index| index.teams_with(&achievement.id)).unwrap_or_default()
            } else {
                let mut teams = FxHashSet::default();
                for player in &dataset.players {
                    if catalog.meets_achievement(player, &achievement.id, None, None, None, None) {
                        teams.extend(player.teams_played.iter().copied());
                    }
                }
                teams
            };
            summary.achievement_teams.insert(achievement.id, teams);
        }

        tracing::debug!(
            team_pairs = summary.team_pairs.values().map(|m| m.len()).sum::<usize>(),
            achievements = summary.achievement_teams.len(),
            "analyzed team/achievement overlap"
        );
        summary
    }

    pub fn shared_players(&self, a: TeamId, b: TeamId) -> u32 {
        self.team_pairs.get(&a.min(b)).and_then(|m| m.get(&a.max(b))).copied().unwrap_or(0)
    }

    /// `None` when the achievement was not analyzed, so callers can fall back
    /// to verifying every team.
    pub fn teams_for(&self, id: &AchievementId) -> Option<&FxHashSet<TeamId>> {
        self.achievement_teams.get(id)
    }

    pub fn may_overlap(&self, team: TeamId, id: &AchievementId) -> bool {
        self.teams_for(id).map_or(true, |teams| teams.contains(&team))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::StandardCatalog;
    use crate::models::{Award, AwardKind, Player, SeasonLine, Sport, Team};

    #[test]
    fn test_pairs_and_achievement_teams() {
        let players = vec![
            Player::new(1, "A", vec![SeasonLine::regular(2000, 1, 10), SeasonLine::regular(2001, 2, 10)])
                .with_awards(vec![Award { kind: AwardKind::AllStar, season: 2001, team_id: Some(2) }]),
            Player::new(2, "B", vec![SeasonLine::regular(2000, 2, 10), SeasonLine::regular(2001, 1, 10)]),
            Player::new(3, "C", vec![SeasonLine::regular(2000, 3, 10)]),
        ];
        let teams = (1..=3).map(|id| Team::new(id, "R", format!("T{id}"), format!("T{id}"))).collect();
        let dataset = LeagueDataset::new(Sport::Basketball, players, teams);
        let catalog = StandardCatalog::new(Sport::Basketball);

        let summary = OverlapSummary::analyze(&dataset, &catalog);
        assert_eq!(summary.shared_players(1, 2), 2);
        assert_eq!(summary.shared_players(2, 1), 2);
        assert_eq!(summary.shared_players(1, 3), 0);

        let all_star = AchievementId::new("all_star");
        assert!(summary.may_overlap(1, &all_star));
        assert!(!summary.may_overlap(3, &all_star));
        assert!(summary.may_overlap(3, &AchievementId::new("not_analyzed")));
    }
}
