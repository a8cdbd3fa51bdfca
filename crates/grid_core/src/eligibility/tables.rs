use fxhash::FxHashMap;

use super::PlayerSet;
use crate::context::LeagueContext;
use crate::models::{AchievementId, TeamId};

/// Flat lookups built once per dataset version.
///
/// Season-specific achievements are deliberately absent: they need per-season
/// alignment and are answered through the season index instead.
#[derive(Debug, Default)]
pub(crate) struct LookupTables {
    players_by_team: FxHashMap<TeamId, PlayerSet>,
    players_by_achievement: FxHashMap<AchievementId, PlayerSet>,
}

impl LookupTables {
    pub(crate) fn build(ctx: &LeagueContext<'_>) -> Self {
        let mut tables = Self::default();
        let flat: Vec<_> = ctx.achievements().iter().filter(|a| !a.is_season_specific()).collect();

        for achievement in &flat {
            tables.players_by_achievement.entry(achievement.id.clone()).or_default();
        }

        for player in &ctx.dataset.players {
            for team_id in &player.teams_played {
                tables.players_by_team.entry(*team_id).or_default().insert(player.id);
            }
            for achievement in &flat {
                let met = player.flag(&achievement.id).unwrap_or_else(|| {
                    ctx.catalog.meets_achievement(player, &achievement.id, None, None, None, None)
                });
                if met {
                    if let Some(set) = tables.players_by_achievement.get_mut(&achievement.id) {
                        set.insert(player.id);
                    }
                }
            }
        }

        tracing::debug!(
            version = %ctx.version(),
            teams = tables.players_by_team.len(),
            achievements = tables.players_by_achievement.len(),
            "built eligibility lookup tables"
        );
        tables
    }

    pub(crate) fn team(&self, team_id: TeamId) -> Option<&PlayerSet> {
        self.players_by_team.get(&team_id)
    }

    pub(crate) fn achievement(&self, id: &AchievementId) -> Option<&PlayerSet> {
        self.players_by_achievement.get(id)
    }
}
