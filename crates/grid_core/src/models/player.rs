use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{AchievementId, PlayerId, Season, TeamId};

/// Statistical categories carried on a season line.
///
/// One enum covers every supported sport; a line simply omits the fields its
/// sport does not track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    Minutes,
    Points,
    Rebounds,
    Assists,
    Steals,
    Blocks,
    ThreePointers,
    Goals,
    PassingYards,
    RushingYards,
    ReceivingYards,
    Touchdowns,
    Hits,
    HomeRuns,
    Strikeouts,
    Wins,
}

impl StatField {
    pub fn label(&self) -> &'static str {
        match self {
            StatField::Minutes => "Minutes",
            StatField::Points => "Points",
            StatField::Rebounds => "Rebounds",
            StatField::Assists => "Assists",
            StatField::Steals => "Steals",
            StatField::Blocks => "Blocks",
            StatField::ThreePointers => "3PM",
            StatField::Goals => "Goals",
            StatField::PassingYards => "Passing Yards",
            StatField::RushingYards => "Rushing Yards",
            StatField::ReceivingYards => "Receiving Yards",
            StatField::Touchdowns => "Touchdowns",
            StatField::Hits => "Hits",
            StatField::HomeRuns => "Home Runs",
            StatField::Strikeouts => "Strikeouts",
            StatField::Wins => "Wins",
        }
    }

    /// Short lowercase token used inside achievement ids.
    pub fn token(&self) -> &'static str {
        match self {
            StatField::Minutes => "min",
            StatField::Points => "pts",
            StatField::Rebounds => "reb",
            StatField::Assists => "ast",
            StatField::Steals => "stl",
            StatField::Blocks => "blk",
            StatField::ThreePointers => "tpm",
            StatField::Goals => "g",
            StatField::PassingYards => "pass_yd",
            StatField::RushingYards => "rush_yd",
            StatField::ReceivingYards => "rec_yd",
            StatField::Touchdowns => "td",
            StatField::Hits => "h",
            StatField::HomeRuns => "hr",
            StatField::Strikeouts => "so",
            StatField::Wins => "w",
        }
    }
}

/// One player's line for one (season, team, phase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonLine {
    pub season: Season,
    pub team_id: TeamId,
    pub games_played: u16,
    #[serde(default)]
    pub is_playoffs: bool,
    #[serde(default)]
    pub stats: BTreeMap<StatField, f64>,
}

impl SeasonLine {
    pub fn regular(season: Season, team_id: TeamId, games_played: u16) -> Self {
        Self { season, team_id, games_played, is_playoffs: false, stats: BTreeMap::new() }
    }

    pub fn with_stat(mut self, field: StatField, value: f64) -> Self {
        self.stats.insert(field, value);
        self
    }

    /// Raw total for a stat; missing fields count as zero.
    pub fn stat(&self, field: StatField) -> f64 {
        self.stats.get(&field).copied().unwrap_or(0.0)
    }

    /// Per-game average, zero when no games were played.
    pub fn per_game(&self, field: StatField) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.stat(field) / f64::from(self.games_played)
        }
    }

    /// Counts toward team membership and career totals.
    pub fn is_regular_with_games(&self) -> bool {
        !self.is_playoffs && self.games_played > 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AwardKind {
    HallOfFame,
    Mvp,
    FinalsMvp,
    AllLeague,
    AllStar,
    Champion,
    RookieOfTheYear,
    DefensivePlayer,
}

impl AwardKind {
    pub fn all() -> &'static [AwardKind] {
        &[
            AwardKind::HallOfFame,
            AwardKind::Mvp,
            AwardKind::FinalsMvp,
            AwardKind::AllLeague,
            AwardKind::AllStar,
            AwardKind::Champion,
            AwardKind::RookieOfTheYear,
            AwardKind::DefensivePlayer,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            AwardKind::HallOfFame => "Hall of Fame",
            AwardKind::Mvp => "MVP",
            AwardKind::FinalsMvp => "Finals MVP",
            AwardKind::AllLeague => "All-League",
            AwardKind::AllStar => "All-Star",
            AwardKind::Champion => "Champion",
            AwardKind::RookieOfTheYear => "Rookie of the Year",
            AwardKind::DefensivePlayer => "Defensive Player of the Year",
        }
    }

    pub fn token(&self) -> &'static str {
        match self {
            AwardKind::HallOfFame => "hof",
            AwardKind::Mvp => "mvp",
            AwardKind::FinalsMvp => "finals_mvp",
            AwardKind::AllLeague => "all_league",
            AwardKind::AllStar => "all_star",
            AwardKind::Champion => "champion",
            AwardKind::RookieOfTheYear => "roy",
            AwardKind::DefensivePlayer => "dpoy",
        }
    }

    /// Hall of fame induction is a career honor, not tied to a season's team.
    pub fn is_career_honor(&self) -> bool {
        matches!(self, AwardKind::HallOfFame)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Award {
    pub kind: AwardKind,
    pub season: Season,
    #[serde(default)]
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftInfo {
    pub year: Season,
    pub round: u8,
    pub pick: u16,
}

/// Canonical player record consumed by the grid core.
///
/// `teams_played` is derived from `season_lines` (regular season, at least one
/// game) and is never edited independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    #[serde(default)]
    pub teams_played: BTreeSet<TeamId>,
    #[serde(default)]
    pub season_lines: Vec<SeasonLine>,
    #[serde(default)]
    pub awards: Vec<Award>,
    #[serde(default)]
    pub draft: Option<DraftInfo>,
    #[serde(default)]
    pub achievement_flags: FxHashMap<AchievementId, bool>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, season_lines: Vec<SeasonLine>) -> Self {
        let mut player = Self {
            id,
            name: name.into(),
            teams_played: BTreeSet::new(),
            season_lines,
            awards: Vec::new(),
            draft: None,
            achievement_flags: FxHashMap::default(),
        };
        player.normalize();
        player
    }

    pub fn with_awards(mut self, awards: Vec<Award>) -> Self {
        self.awards = awards;
        self
    }

    pub fn with_draft(mut self, draft: Option<DraftInfo>) -> Self {
        self.draft = draft;
        self
    }

    /// Sorts lines by (season, phase) and re-derives `teams_played`.
    pub fn normalize(&mut self) {
        self.season_lines.sort_by_key(|line| (line.season, line.is_playoffs, line.team_id));
        self.teams_played = self
            .season_lines
            .iter()
            .filter(|line| line.is_regular_with_games())
            .map(|line| line.team_id)
            .collect();
    }

    pub fn regular_lines(&self) -> impl Iterator<Item = &SeasonLine> {
        self.season_lines.iter().filter(|line| line.is_regular_with_games())
    }

    pub fn played_for(&self, team_id: TeamId) -> bool {
        self.teams_played.contains(&team_id)
    }

    pub fn career_total(&self, field: StatField) -> f64 {
        self.regular_lines().map(|line| line.stat(field)).sum()
    }

    pub fn career_games(&self) -> u32 {
        self.regular_lines().map(|line| u32::from(line.games_played)).sum()
    }

    /// Number of distinct regular seasons with at least one game.
    pub fn seasons_played(&self) -> usize {
        self.regular_lines().map(|line| line.season).collect::<BTreeSet<_>>().len()
    }

    pub fn first_season(&self) -> Option<Season> {
        self.regular_lines().map(|line| line.season).min()
    }

    pub fn last_season(&self) -> Option<Season> {
        self.regular_lines().map(|line| line.season).max()
    }

    pub fn award_count(&self, kind: AwardKind) -> usize {
        self.awards.iter().filter(|award| award.kind == kind).count()
    }

    pub fn has_award(&self, kind: AwardKind) -> bool {
        self.awards.iter().any(|award| award.kind == kind)
    }

    /// Precomputed flag, if the dataset builder stored one for this achievement.
    pub fn flag(&self, id: &AchievementId) -> Option<bool> {
        self.achievement_flags.get(id).copied()
    }
}
