//! Achievement descriptors and the catalog seam.
//!
//! An achievement is a typed predicate over a [`Player`]. The grid core never
//! interprets achievement ids itself; it asks an [`AchievementCatalog`] for the
//! list of descriptors and for verdicts on individual players.
//!
//! ## Kinds
//!
//! | Kind | Evaluated over | Example |
//! |------|----------------|---------|
//! | `Career` | whole record | Hall of Fame, undrafted, 10+ seasons |
//! | `Threshold` | career totals | 20,000+ career points |
//! | `SeasonAligned` | one (season, team) line | 25+ PPG season, season MVP |
//!
//! Season-aligned achievements are served through a [`SeasonIndex`] so that
//! "with this team" can be answered per season.

pub mod catalog;
pub mod season_index;

use serde::{Deserialize, Serialize};

use crate::models::{AchievementId, AwardKind, Player, Season, SeasonLine, StatField, TeamId};

pub use catalog::StandardCatalog;
pub use season_index::SeasonIndex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    AtLeast,
    AtMost,
}

impl Comparison {
    #[inline]
    pub fn holds(&self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::AtLeast => lhs >= rhs,
            Comparison::AtMost => lhs <= rhs,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparison::AtLeast => "+",
            Comparison::AtMost => " or fewer",
        }
    }
}

/// Groups whose members may not share one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionGroup {
    Draft,
    CareerLength,
    /// Decade bucket, keyed by the decade's first year.
    Decade(Season),
}

impl ExclusionGroup {
    /// Any two decades conflict, not just the same decade twice.
    pub fn conflicts_with(&self, other: &ExclusionGroup) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CareerTest {
    Award(AwardKind),
    FirstRoundPick,
    FirstOverallPick,
    Undrafted,
    SeasonsPlayed { op: Comparison, value: u16 },
    PlayedInDecade(Season),
    TeamsPlayedFor { op: Comparison, value: u16 },
    OneFranchise { min_seasons: u16 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonTest {
    Award(AwardKind),
    Average { stat: StatField, op: Comparison, value: f64, min_games: u16 },
    Total { stat: StatField, op: Comparison, value: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementKind {
    Career(CareerTest),
    Threshold { stat: StatField, op: Comparison, value: f64 },
    SeasonAligned(SeasonTest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub label: String,
    /// Fewer qualifying players than this and the achievement never becomes a header.
    pub min_players: usize,
    pub kind: AchievementKind,
    #[serde(default)]
    pub group: Option<ExclusionGroup>,
}

impl Achievement {
    pub fn new(id: impl Into<String>, label: impl Into<String>, kind: AchievementKind) -> Self {
        Self { id: AchievementId::new(id), label: label.into(), min_players: 5, kind, group: None }
    }

    pub fn with_min_players(mut self, min_players: usize) -> Self {
        self.min_players = min_players;
        self
    }

    pub fn in_group(mut self, group: ExclusionGroup) -> Self {
        self.group = Some(group);
        self
    }

    pub fn is_season_specific(&self) -> bool {
        matches!(self.kind, AchievementKind::SeasonAligned(_))
    }

    /// First year of the decade this achievement is bound to, if any.
    pub fn decade(&self) -> Option<Season> {
        match self.group {
            Some(ExclusionGroup::Decade(start)) => Some(start),
            _ => None,
        }
    }

    pub fn evaluate(&self, player: &Player) -> bool {
        self.evaluate_with(player, None)
    }

    /// Single dispatch point for every kind. `op` replaces the comparison of
    /// parameterized achievements; other kinds ignore it.
    ///
    /// A season-aligned achievement holds if any regular-season line satisfies it.
    pub fn evaluate_with(&self, player: &Player, op: Option<Comparison>) -> bool {
        match &self.kind {
            AchievementKind::Career(test) => career_test(test, player, op),
            AchievementKind::Threshold { stat, op: default_op, value } => {
                op.unwrap_or(*default_op).holds(player.career_total(*stat), *value)
            }
            AchievementKind::SeasonAligned(_) => {
                player.regular_lines().any(|line| self.evaluate_line(player, line, op))
            }
        }
    }

    /// Evaluates a season-aligned achievement on one line; career kinds fall
    /// back to the whole-record verdict.
    pub fn evaluate_line(&self, player: &Player, line: &SeasonLine, op: Option<Comparison>) -> bool {
        let AchievementKind::SeasonAligned(test) = &self.kind else {
            return self.evaluate_with(player, op);
        };
        if !line.is_regular_with_games() {
            return false;
        }
        match test {
            SeasonTest::Award(kind) => player.awards.iter().any(|award| {
                award.kind == *kind
                    && award.season == line.season
                    && award.team_id.map_or(true, |team| team == line.team_id)
            }),
            SeasonTest::Average { stat, op: default_op, value, min_games } => {
                line.games_played >= *min_games
                    && op.unwrap_or(*default_op).holds(line.per_game(*stat), *value)
            }
            SeasonTest::Total { stat, op: default_op, value } => {
                op.unwrap_or(*default_op).holds(line.stat(*stat), *value)
            }
        }
    }
}

fn career_test(test: &CareerTest, player: &Player, op: Option<Comparison>) -> bool {
    match test {
        CareerTest::Award(kind) => player.has_award(*kind),
        CareerTest::FirstRoundPick => player.draft.is_some_and(|d| d.round == 1),
        CareerTest::FirstOverallPick => player.draft.is_some_and(|d| d.round == 1 && d.pick == 1),
        CareerTest::Undrafted => player.draft.is_none(),
        CareerTest::SeasonsPlayed { op: default_op, value } => {
            op.unwrap_or(*default_op).holds(player.seasons_played() as f64, f64::from(*value))
        }
        CareerTest::PlayedInDecade(start) => {
            player.regular_lines().any(|line| line.season >= *start && line.season < start + 10)
        }
        CareerTest::TeamsPlayedFor { op: default_op, value } => {
            op.unwrap_or(*default_op).holds(player.teams_played.len() as f64, f64::from(*value))
        }
        CareerTest::OneFranchise { min_seasons } => {
            player.teams_played.len() == 1 && player.seasons_played() >= usize::from(*min_seasons)
        }
    }
}

/// Source of achievement descriptors and verdicts for one or more sports.
///
/// Implementations must be pure: the same arguments always produce the same
/// verdict, since the eligibility index caches results per dataset version.
pub trait AchievementCatalog: Send + Sync {
    /// Achievements usable as headers. Season-aligned achievements are only
    /// listed when a season index is available to serve them.
    fn list_achievements(&self, sport: crate::models::Sport, season_index: Option<&SeasonIndex>) -> Vec<Achievement>;

    /// Every season-aligned achievement, used to build the season index.
    fn season_aligned_achievements(&self, sport: crate::models::Sport) -> Vec<Achievement> {
        self.list_achievements(sport, Some(&SeasonIndex::default()))
            .into_iter()
            .filter(Achievement::is_season_specific)
            .collect()
    }

    /// Verdict for one player.
    ///
    /// `team_id`/`season` restrict season-aligned achievements to matching
    /// lines; without a season index those always fail.
    fn meets_achievement(
        &self,
        player: &Player,
        id: &AchievementId,
        season_index: Option<&SeasonIndex>,
        op: Option<Comparison>,
        team_id: Option<TeamId>,
        season: Option<Season>,
    ) -> bool;
}
