use serde::{Deserialize, Serialize};
use std::fmt;

use crate::achievements::AchievementCatalog;
use crate::models::{AchievementId, LeagueDataset, Player, TeamId};

/// A row or column header.
///
/// Ordering puts teams before achievements; the eligibility memo relies on it
/// to store `(A, B)` and `(B, A)` under one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    Team { team_id: TeamId },
    Achievement { id: AchievementId, season_specific: bool },
}

impl Constraint {
    pub fn team(team_id: TeamId) -> Self {
        Constraint::Team { team_id }
    }

    pub fn achievement(id: impl Into<AchievementId>, season_specific: bool) -> Self {
        Constraint::Achievement { id: id.into(), season_specific }
    }

    pub fn is_team(&self) -> bool {
        matches!(self, Constraint::Team { .. })
    }

    pub fn is_season_specific(&self) -> bool {
        matches!(self, Constraint::Achievement { season_specific: true, .. })
    }

    pub fn team_id(&self) -> Option<TeamId> {
        match self {
            Constraint::Team { team_id } => Some(*team_id),
            Constraint::Achievement { .. } => None,
        }
    }

    pub fn achievement_id(&self) -> Option<&AchievementId> {
        match self {
            Constraint::Team { .. } => None,
            Constraint::Achievement { id, .. } => Some(id),
        }
    }

    /// The header predicate on its own.
    ///
    /// Season-specific achievements consult the dataset's season index and are
    /// false without one.
    pub fn test(&self, player: &Player, dataset: &LeagueDataset, catalog: &dyn AchievementCatalog) -> bool {
        match self {
            Constraint::Team { team_id } => player.played_for(*team_id),
            Constraint::Achievement { id, .. } => {
                catalog.meets_achievement(player, id, dataset.season_index.as_ref(), None, None, None)
            }
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Team { team_id } => write!(f, "team:{team_id}"),
            Constraint::Achievement { id, season_specific: true } => write!(f, "season:{id}"),
            Constraint::Achievement { id, season_specific: false } => write!(f, "achievement:{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_teams_sort_before_achievements() {
        let mut headers = vec![Constraint::achievement("mvp", false), Constraint::team(9), Constraint::team(2)];
        headers.sort();
        assert_eq!(headers[0], Constraint::team(2));
        assert_eq!(headers[2], Constraint::achievement("mvp", false));
    }

    #[test]
    fn test_display() {
        assert_eq!(Constraint::team(4).to_string(), "team:4");
        assert_eq!(Constraint::achievement("season_mvp", true).to_string(), "season:season_mvp");
    }
}
