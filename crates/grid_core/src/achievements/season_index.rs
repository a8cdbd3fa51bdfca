use fxhash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Achievement;
use crate::models::{AchievementId, Player, PlayerId, Season, TeamId};

type TeamAchievements = FxHashMap<TeamId, FxHashMap<AchievementId, FxHashSet<PlayerId>>>;

/// `season -> team -> achievement -> players` for season-aligned achievements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeasonIndex {
    seasons: BTreeMap<Season, TeamAchievements>,
}

impl SeasonIndex {
    /// Evaluates every season-aligned achievement against every regular-season
    /// line. Career achievements in `achievements` are skipped.
    pub fn build(players: &[Player], achievements: &[Achievement]) -> Self {
        let aligned: Vec<&Achievement> = achievements.iter().filter(|a| a.is_season_specific()).collect();
        let mut index = Self::default();
        for player in players {
            for line in player.regular_lines() {
                for achievement in &aligned {
                    if achievement.evaluate_line(player, line, None) {
                        index.insert(line.season, line.team_id, achievement.id.clone(), player.id);
                    }
                }
            }
        }
        index
    }

    pub fn insert(&mut self, season: Season, team_id: TeamId, id: AchievementId, player_id: PlayerId) {
        self.seasons
            .entry(season)
            .or_default()
            .entry(team_id)
            .or_default()
            .entry(id)
            .or_default()
            .insert(player_id);
    }

    pub fn players(&self, season: Season, team_id: TeamId, id: &AchievementId) -> Option<&FxHashSet<PlayerId>> {
        self.seasons.get(&season)?.get(&team_id)?.get(id)
    }

    pub fn contains(&self, season: Season, team_id: TeamId, id: &AchievementId, player_id: PlayerId) -> bool {
        self.players(season, team_id, id).is_some_and(|set| set.contains(&player_id))
    }

    /// Whether the player achieved `id` on any of their own lines, optionally
    /// restricted to a team and/or season.
    pub fn player_has(
        &self,
        player: &Player,
        id: &AchievementId,
        team_id: Option<TeamId>,
        season: Option<Season>,
    ) -> bool {
        player
            .regular_lines()
            .filter(|line| team_id.map_or(true, |team| team == line.team_id))
            .filter(|line| season.map_or(true, |s| s == line.season))
            .any(|line| self.contains(line.season, line.team_id, id, player.id))
    }

    /// Teams with at least one player achieving `id` while on that team.
    pub fn teams_with(&self, id: &AchievementId) -> FxHashSet<TeamId> {
        let mut teams = FxHashSet::default();
        for by_team in self.seasons.values() {
            for (team_id, by_achievement) in by_team {
                if by_achievement.get(id).is_some_and(|set| !set.is_empty()) {
                    teams.insert(*team_id);
                }
            }
        }
        teams
    }

    /// Whether any season lists `id` at all.
    pub fn covers(&self, id: &AchievementId) -> bool {
        self.seasons
            .values()
            .any(|by_team| by_team.values().any(|by_achievement| by_achievement.contains_key(id)))
    }

    pub fn season_count(&self) -> usize {
        self.seasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seasons.is_empty()
    }
}
