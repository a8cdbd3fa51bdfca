use fxhash::{FxHashMap, FxHasher};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

use super::{Player, PlayerId, Season, Team, TeamId};
use crate::achievements::{AchievementCatalog, SeasonIndex};
use crate::analysis::OverlapSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sport {
    #[default]
    Basketball,
    Football,
    Hockey,
    Baseball,
}

impl Sport {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "basketball" | "bbgm" => Some(Sport::Basketball),
            "football" | "fbgm" => Some(Sport::Football),
            "hockey" | "zgmh" => Some(Sport::Hockey),
            "baseball" | "zgmb" => Some(Sport::Baseball),
            _ => None,
        }
    }
}

/// Opaque identity of one immutable dataset.
///
/// Every cache in the eligibility index is keyed by this token, so loading a
/// different league must come with a different version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct DatasetVersion(pub u64);

impl DatasetVersion {
    /// Content fingerprint over everything eligibility is derived from:
    /// every season line (stats included), award and draft record, plus the
    /// team table. Players must already be normalized and sorted by id.
    ///
    /// FxHasher keeps the value stable across toolchains, unlike `DefaultHasher`.
    pub fn fingerprint(sport: Sport, players: &[Player], teams: &[Team]) -> Self {
        let mut hasher = FxHasher::default();
        sport.hash(&mut hasher);
        players.len().hash(&mut hasher);
        for player in players {
            player.id.hash(&mut hasher);
            player.season_lines.len().hash(&mut hasher);
            for line in &player.season_lines {
                line.season.hash(&mut hasher);
                line.team_id.hash(&mut hasher);
                line.games_played.hash(&mut hasher);
                line.is_playoffs.hash(&mut hasher);
                line.stats.len().hash(&mut hasher);
                for (field, value) in &line.stats {
                    field.hash(&mut hasher);
                    value.to_bits().hash(&mut hasher);
                }
            }
            player.awards.len().hash(&mut hasher);
            for award in &player.awards {
                award.kind.hash(&mut hasher);
                award.season.hash(&mut hasher);
                award.team_id.hash(&mut hasher);
            }
            player.draft.map(|d| (d.year, d.round, d.pick)).hash(&mut hasher);
        }
        teams.len().hash(&mut hasher);
        for team in teams {
            team.id.hash(&mut hasher);
            team.disabled.hash(&mut hasher);
            team.region.hash(&mut hasher);
            team.name.hash(&mut hasher);
            team.abbrev.hash(&mut hasher);
        }
        // 0 is reserved for "not yet assigned"
        Self(hasher.finish().max(1))
    }

    pub fn is_assigned(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for DatasetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Immutable, normalized league snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueDataset {
    #[serde(default)]
    pub version: DatasetVersion,
    #[serde(default)]
    pub sport: Sport,
    /// Latest season in the league; anchors decade weighting.
    #[serde(default)]
    pub current_season: Option<Season>,
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
    #[serde(default)]
    pub season_index: Option<SeasonIndex>,
    #[serde(default)]
    pub overlap: Option<OverlapSummary>,
    #[serde(skip)]
    player_slots: FxHashMap<PlayerId, usize>,
}

impl LeagueDataset {
    pub fn new(sport: Sport, players: Vec<Player>, teams: Vec<Team>) -> Self {
        let mut dataset = Self {
            version: DatasetVersion::default(),
            sport,
            current_season: None,
            players,
            teams,
            season_index: None,
            overlap: None,
            player_slots: FxHashMap::default(),
        };
        dataset.finalize();
        dataset
    }

    /// Overrides the fingerprint with a caller-issued token.
    pub fn with_version(mut self, version: DatasetVersion) -> Self {
        self.version = version;
        self
    }

    /// Re-derives everything that is not a source of truth: player ordering,
    /// `teams_played`, the id lookup, the current season and (if unassigned)
    /// the version token. Loaders call this after deserializing.
    pub fn finalize(&mut self) {
        for player in &mut self.players {
            player.normalize();
        }
        self.players.sort_by_key(|player| player.id);
        self.player_slots =
            self.players.iter().enumerate().map(|(slot, player)| (player.id, slot)).collect();
        if self.current_season.is_none() {
            self.current_season = self.players.iter().filter_map(Player::last_season).max();
        }
        if !self.version.is_assigned() {
            self.version = DatasetVersion::fingerprint(self.sport, &self.players, &self.teams);
        }
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.player_slots.get(&id).map(|&slot| &self.players[slot])
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|team| team.id == id)
    }

    pub fn enabled_teams(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter().filter(|team| !team.disabled)
    }

    /// Stores the catalog's verdict for every non-season achievement on every
    /// player, so later lookups never re-run the predicate.
    pub fn precompute_flags(&mut self, catalog: &dyn AchievementCatalog) {
        let achievements = catalog.list_achievements(self.sport, None);
        for player in &mut self.players {
            player.achievement_flags.clear();
            for achievement in achievements.iter().filter(|a| !a.is_season_specific()) {
                let met = catalog.meets_achievement(player, &achievement.id, None, None, None, None);
                player.achievement_flags.insert(achievement.id.clone(), met);
            }
        }
        tracing::debug!(
            players = self.players.len(),
            achievements = achievements.len(),
            "precomputed achievement flags"
        );
    }

    /// Builds and attaches the season index for season-aligned achievements.
    pub fn build_season_index(&mut self, catalog: &dyn AchievementCatalog) {
        let aligned = catalog.season_aligned_achievements(self.sport);
        let index = SeasonIndex::build(&self.players, &aligned);
        tracing::debug!(
            seasons = index.season_count(),
            achievements = aligned.len(),
            "built season index"
        );
        self.season_index = Some(index);
    }

    /// Builds and attaches the team/achievement overlap hint.
    pub fn analyze_overlap(&mut self, catalog: &dyn AchievementCatalog) {
        let summary = OverlapSummary::analyze(self, catalog);
        self.overlap = Some(summary);
    }

    /// Full preparation pipeline used by loaders and tools.
    pub fn prepare(&mut self, catalog: &dyn AchievementCatalog) {
        self.finalize();
        self.precompute_flags(catalog);
        self.build_season_index(catalog);
        self.analyze_overlap(catalog);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Award, AwardKind, SeasonLine, StatField};

    fn players() -> Vec<Player> {
        vec![
            Player::new(2, "B", vec![SeasonLine::regular(2001, 1, 10)]),
            Player::new(1, "A", vec![SeasonLine::regular(1999, 1, 10)]),
        ]
    }

    fn version_of(players: Vec<Player>) -> DatasetVersion {
        LeagueDataset::new(Sport::Basketball, players, vec![Team::new(1, "X", "Y", "XY")]).version
    }

    #[test]
    fn test_fingerprint_is_stable_and_sensitive() {
        let a = version_of(players());
        assert_eq!(a, version_of(players()));

        let mut more = players();
        more.push(Player::new(3, "C", vec![]));
        assert_ne!(a, version_of(more));
    }

    #[test]
    fn test_fingerprint_tracks_line_and_award_content() {
        let line = |team, pts| SeasonLine::regular(2020, team, 60).with_stat(StatField::Points, pts);
        let base = version_of(vec![Player::new(1, "A", vec![line(1, 100.0)])]);

        assert_ne!(base, version_of(vec![Player::new(1, "A", vec![line(2, 100.0)])]));
        assert_ne!(base, version_of(vec![Player::new(1, "A", vec![line(1, 25_000.0)])]));

        let awarded = Player::new(1, "A", vec![line(1, 100.0)])
            .with_awards(vec![Award { kind: AwardKind::AllStar, season: 2020, team_id: Some(1) }]);
        let moved = Player::new(1, "A", vec![line(1, 100.0)])
            .with_awards(vec![Award { kind: AwardKind::AllStar, season: 2021, team_id: Some(1) }]);
        assert_ne!(version_of(vec![awarded]), version_of(vec![moved]));

        let renamed_team =
            LeagueDataset::new(Sport::Basketball, vec![Player::new(1, "A", vec![line(1, 100.0)])], vec![Team::new(1, "X", "Z", "XZ")]);
        assert_ne!(base, renamed_team.version);
    }

    #[test]
    fn test_finalize_sorts_and_indexes() {
        let dataset = LeagueDataset::new(Sport::Basketball, players(), vec![Team::new(1, "X", "Y", "XY")]);
        assert_eq!(dataset.players[0].id, 1);
        assert_eq!(dataset.player(2).map(|p| p.name.as_str()), Some("B"));
        assert_eq!(dataset.current_season, Some(2001));
        assert!(dataset.version.is_assigned());
    }

    #[test]
    fn test_explicit_version_survives() {
        let dataset = LeagueDataset::new(Sport::Hockey, players(), vec![])
            .with_version(DatasetVersion(42));
        assert_eq!(dataset.version, DatasetVersion(42));
    }

    #[test]
    fn test_sport_parsing() {
        assert_eq!(Sport::from_str("Hockey"), Some(Sport::Hockey));
        assert_eq!(Sport::from_str("cricket"), None);
    }
}
