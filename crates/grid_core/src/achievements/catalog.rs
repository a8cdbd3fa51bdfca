//! Bundled achievement catalog for the supported sports.
//!
//! Thresholds follow the usual "immaculate grid" conventions per sport. Decade
//! achievements are generated for the seasons a league actually covers.

use fxhash::FxHashMap;

use super::{
    Achievement, AchievementCatalog, AchievementKind, CareerTest, Comparison, ExclusionGroup, SeasonIndex,
    SeasonTest,
};
use crate::models::{AchievementId, AwardKind, Player, Season, Sport, StatField, TeamId};

const DEFAULT_FIRST_DECADE: Season = 1970;
const DEFAULT_LAST_DECADE: Season = 2020;

#[derive(Debug, Clone)]
pub struct StandardCatalog {
    sport: Sport,
    achievements: Vec<Achievement>,
    by_id: FxHashMap<AchievementId, usize>,
}

impl StandardCatalog {
    pub fn new(sport: Sport) -> Self {
        Self::with_decades(sport, DEFAULT_FIRST_DECADE, DEFAULT_LAST_DECADE)
    }

    /// Catalog whose decade achievements span `first_season..=last_season`.
    pub fn for_seasons(sport: Sport, first_season: Season, last_season: Season) -> Self {
        Self::with_decades(sport, decade_of(first_season), decade_of(last_season))
    }

    /// Catalog sized to a dataset's season range.
    pub fn for_dataset(dataset: &crate::models::LeagueDataset) -> Self {
        let first = dataset.players.iter().filter_map(Player::first_season).min();
        let last = dataset.players.iter().filter_map(Player::last_season).max();
        match (first, last) {
            (Some(first), Some(last)) => Self::for_seasons(dataset.sport, first, last),
            _ => Self::new(dataset.sport),
        }
    }

    fn with_decades(sport: Sport, first_decade: Season, last_decade: Season) -> Self {
        let achievements = standard_achievements(sport, first_decade, last_decade);
        let by_id = achievements.iter().enumerate().map(|(slot, a)| (a.id.clone(), slot)).collect();
        Self { sport, achievements, by_id }
    }

    pub fn sport(&self) -> Sport {
        self.sport
    }

    pub fn get(&self, id: &AchievementId) -> Option<&Achievement> {
        self.by_id.get(id).map(|&slot| &self.achievements[slot])
    }

    pub fn all(&self) -> &[Achievement] {
        &self.achievements
    }
}

impl AchievementCatalog for StandardCatalog {
    fn list_achievements(&self, sport: Sport, season_index: Option<&SeasonIndex>) -> Vec<Achievement> {
        if sport != self.sport {
            return StandardCatalog::new(sport).list_achievements(sport, season_index);
        }
        self.achievements
            .iter()
            .filter(|a| season_index.is_some() || !a.is_season_specific())
            .cloned()
            .collect()
    }

    fn season_aligned_achievements(&self, sport: Sport) -> Vec<Achievement> {
        if sport != self.sport {
            return StandardCatalog::new(sport).season_aligned_achievements(sport);
        }
        self.achievements.iter().filter(|a| a.is_season_specific()).cloned().collect()
    }

    fn meets_achievement(
        &self,
        player: &Player,
        id: &AchievementId,
        season_index: Option<&SeasonIndex>,
        op: Option<Comparison>,
        team_id: Option<TeamId>,
        season: Option<Season>,
    ) -> bool {
        let Some(achievement) = self.get(id) else {
            return false;
        };
        if achievement.is_season_specific() {
            // The index is the only source of truth for season alignment.
            return match (season_index, op) {
                (Some(index), None) => index.player_has(player, id, team_id, season),
                (Some(_), Some(_)) => player
                    .regular_lines()
                    .filter(|line| team_id.map_or(true, |team| team == line.team_id))
                    .filter(|line| season.map_or(true, |s| s == line.season))
                    .any(|line| achievement.evaluate_line(player, line, op)),
                (None, _) => false,
            };
        }
        if let Some(team) = team_id {
            if !player.played_for(team) {
                return false;
            }
        }
        if op.is_none() {
            if let Some(flag) = player.flag(id) {
                return flag;
            }
        }
        achievement.evaluate_with(player, op)
    }
}

fn decade_of(season: Season) -> Season {
    season - season % 10
}

/// `20000` → `"20,000"`
pub(crate) fn group_thousands(value: f64) -> String {
    let digits = format!("{}", value.round() as i64);
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn career_threshold(stat: StatField, value: f64) -> Achievement {
    Achievement::new(
        format!("career_{}_{}", stat.token(), value as u64),
        format!("{}+ Career {}", group_thousands(value), stat.label()),
        AchievementKind::Threshold { stat, op: Comparison::AtLeast, value },
    )
}

fn season_average(stat: StatField, value: f64, abbrev: &str) -> Achievement {
    Achievement::new(
        format!("season_{}_avg_{}", stat.token(), value as u64),
        format!("{}+ {} Season", value, abbrev),
        AchievementKind::SeasonAligned(SeasonTest::Average { stat, op: Comparison::AtLeast, value, min_games: 20 }),
    )
}

fn season_total(stat: StatField, value: f64) -> Achievement {
    Achievement::new(
        format!("season_{}_{}", stat.token(), value as u64),
        format!("{}+ {} Season", group_thousands(value), stat.label()),
        AchievementKind::SeasonAligned(SeasonTest::Total { stat, op: Comparison::AtLeast, value }),
    )
}

fn standard_achievements(sport: Sport, first_decade: Season, last_decade: Season) -> Vec<Achievement> {
    let mut list = Vec::new();

    for kind in AwardKind::all() {
        let achievement = Achievement::new(kind.token(), kind.label(), AchievementKind::Career(CareerTest::Award(*kind)));
        let achievement = match kind {
            AwardKind::HallOfFame | AwardKind::FinalsMvp => achievement.with_min_players(3),
            _ => achievement,
        };
        list.push(achievement);
    }

    list.push(
        Achievement::new("draft_first_round", "First Round Pick", AchievementKind::Career(CareerTest::FirstRoundPick))
            .in_group(ExclusionGroup::Draft),
    );
    list.push(
        Achievement::new("draft_first_overall", "#1 Overall Pick", AchievementKind::Career(CareerTest::FirstOverallPick))
            .with_min_players(3)
            .in_group(ExclusionGroup::Draft),
    );
    list.push(
        Achievement::new("undrafted", "Went Undrafted", AchievementKind::Career(CareerTest::Undrafted))
            .in_group(ExclusionGroup::Draft),
    );

    for (value, op, label) in [
        (10, Comparison::AtLeast, "Played 10+ Seasons"),
        (15, Comparison::AtLeast, "Played 15+ Seasons"),
        (3, Comparison::AtMost, "Played 3 or Fewer Seasons"),
    ] {
        let token = if op == Comparison::AtLeast { "min" } else { "max" };
        list.push(
            Achievement::new(
                format!("seasons_{token}_{value}"),
                label,
                AchievementKind::Career(CareerTest::SeasonsPlayed { op, value }),
            )
            .in_group(ExclusionGroup::CareerLength),
        );
    }

    list.push(Achievement::new(
        "teams_min_5",
        "Played for 5+ Teams",
        AchievementKind::Career(CareerTest::TeamsPlayedFor { op: Comparison::AtLeast, value: 5 }),
    ));
    list.push(
        Achievement::new(
            "one_franchise",
            "One-Franchise Player (8+ Seasons)",
            AchievementKind::Career(CareerTest::OneFranchise { min_seasons: 8 }),
        )
        .in_group(ExclusionGroup::CareerLength),
    );

    let mut decade = first_decade;
    while decade <= last_decade {
        list.push(
            Achievement::new(
                format!("decade_{decade}"),
                format!("Played in the {decade}s"),
                AchievementKind::Career(CareerTest::PlayedInDecade(decade)),
            )
            .in_group(ExclusionGroup::Decade(decade)),
        );
        decade += 10;
    }

    for kind in [AwardKind::Mvp, AwardKind::AllStar, AwardKind::AllLeague, AwardKind::Champion] {
        list.push(Achievement::new(
            format!("season_{}", kind.token()),
            format!("{} (with team)", kind.label()),
            AchievementKind::SeasonAligned(SeasonTest::Award(kind)),
        ));
    }

    match sport {
        Sport::Basketball => {
            list.push(career_threshold(StatField::Points, 20000.0));
            list.push(career_threshold(StatField::Rebounds, 10000.0));
            list.push(career_threshold(StatField::Assists, 5000.0));
            list.push(career_threshold(StatField::Steals, 1500.0));
            list.push(career_threshold(StatField::Blocks, 1500.0));
            list.push(career_threshold(StatField::ThreePointers, 2000.0));
            list.push(season_average(StatField::Points, 25.0, "PPG"));
            list.push(season_average(StatField::Rebounds, 10.0, "RPG"));
            list.push(season_average(StatField::Assists, 8.0, "APG"));
            list.push(season_average(StatField::Steals, 2.0, "SPG"));
            list.push(season_average(StatField::Blocks, 2.0, "BPG"));
        }
        Sport::Hockey => {
            list.push(career_threshold(StatField::Goals, 300.0));
            list.push(career_threshold(StatField::Assists, 500.0));
            list.push(career_threshold(StatField::Points, 700.0));
            list.push(season_total(StatField::Goals, 40.0));
            list.push(season_total(StatField::Points, 80.0));
        }
        Sport::Football => {
            list.push(career_threshold(StatField::PassingYards, 30000.0));
            list.push(career_threshold(StatField::RushingYards, 8000.0));
            list.push(career_threshold(StatField::ReceivingYards, 8000.0));
            list.push(career_threshold(StatField::Touchdowns, 100.0));
            list.push(season_total(StatField::PassingYards, 4000.0));
            list.push(season_total(StatField::RushingYards, 1000.0));
            list.push(season_total(StatField::ReceivingYards, 1000.0));
        }
        Sport::Baseball => {
            list.push(career_threshold(StatField::Hits, 2000.0));
            list.push(career_threshold(StatField::HomeRuns, 300.0));
            list.push(career_threshold(StatField::Strikeouts, 2000.0));
            list.push(career_threshold(StatField::Wins, 150.0));
            list.push(season_total(StatField::HomeRuns, 30.0));
            list.push(season_total(StatField::Hits, 200.0));
            list.push(season_total(StatField::Strikeouts, 200.0));
            list.push(season_total(StatField::Wins, 20.0));
        }
    }

    list
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SeasonLine;
    use fxhash::FxHashSet;

    #[test]
    fn test_ids_are_unique_for_every_sport() {
        for sport in [Sport::Basketball, Sport::Football, Sport::Hockey, Sport::Baseball] {
            let catalog = StandardCatalog::new(sport);
            let ids: FxHashSet<_> = catalog.all().iter().map(|a| a.id.clone()).collect();
            assert_eq!(ids.len(), catalog.all().len(), "duplicate id in {sport:?}");
        }
    }

    #[test]
    fn test_season_achievements_need_index_to_be_listed() {
        let catalog = StandardCatalog::new(Sport::Basketball);
        let without = catalog.list_achievements(Sport::Basketball, None);
        let with = catalog.list_achievements(Sport::Basketball, Some(&SeasonIndex::default()));
        assert!(without.iter().all(|a| !a.is_season_specific()));
        assert!(with.len() > without.len());
    }

    #[test]
    fn test_decades_follow_season_range() {
        let catalog = StandardCatalog::for_seasons(Sport::Hockey, 1995, 2012);
        let decades: Vec<_> = catalog.all().iter().filter_map(Achievement::decade).collect();
        assert_eq!(decades, vec![1990, 2000, 2010]);
    }

    #[test]
    fn test_meets_achievement_without_index_rejects_season_ids() {
        let catalog = StandardCatalog::new(Sport::Basketball);
        let player = Player::new(1, "P", vec![SeasonLine::regular(2001, 1, 70).with_stat(StatField::Points, 2100.0)]);
        let id = AchievementId::new("season_pts_avg_25");
        assert!(!catalog.meets_achievement(&player, &id, None, None, None, None));

        let achievements = catalog.season_aligned_achievements(Sport::Basketball);
        let index = SeasonIndex::build(std::slice::from_ref(&player), &achievements);
        assert!(catalog.meets_achievement(&player, &id, Some(&index), None, Some(1), None));
        assert!(!catalog.meets_achievement(&player, &id, Some(&index), None, Some(2), None));
    }

    #[test]
    fn test_flags_short_circuit_evaluation() {
        let catalog = StandardCatalog::new(Sport::Basketball);
        let mut player = Player::new(1, "P", vec![SeasonLine::regular(2001, 1, 70)]);
        let id = AchievementId::new("mvp");
        assert!(!catalog.meets_achievement(&player, &id, None, None, None, None));
        player.achievement_flags.insert(id.clone(), true);
        assert!(catalog.meets_achievement(&player, &id, None, None, None, None));
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(20000.0), "20,000");
        assert_eq!(group_thousands(150.0), "150");
        assert_eq!(group_thousands(1500.0), "1,500");
    }
}
