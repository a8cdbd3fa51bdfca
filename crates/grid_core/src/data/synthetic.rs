//! Deterministic synthetic leagues.
//!
//! Used by tests, benchmarks and `grid_tool synth`. The same builder settings
//! always produce the same dataset, down to the version fingerprint.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::models::{
    Award, AwardKind, DraftInfo, LeagueDataset, Player, PlayerId, Season, SeasonLine, Sport, StatField, Team, TeamId,
};

const TEAM_NAMES: &[(&str, &str, &str)] = &[
    ("Harbor City", "Gulls", "HCG"),
    ("Red Mesa", "Coyotes", "RMC"),
    ("Lakeshore", "Pilots", "LSP"),
    ("Iron Valley", "Forge", "IVF"),
    ("Northgate", "Wolves", "NGW"),
    ("Capital", "Senators", "CAP"),
    ("Bayview", "Mariners", "BAY"),
    ("Summit", "Peaks", "SUM"),
    ("Riverbend", "Otters", "RIV"),
    ("Prairie", "Storm", "PRS"),
    ("Coastline", "Breakers", "CST"),
    ("Old Town", "Lanterns", "OTL"),
    ("Sun Basin", "Scorpions", "SBS"),
    ("Granite", "Rams", "GRR"),
    ("Tidewater", "Herons", "TDH"),
    ("Frontier", "Rangers", "FRR"),
];

const FIRST_NAMES: &[&str] = &[
    "Avery", "Blake", "Carter", "Dana", "Elliot", "Finley", "Gray", "Harper", "Jordan", "Kendall", "Logan",
    "Morgan", "Nico", "Parker", "Quinn", "Reese", "Sasha", "Taylor", "Val", "Wren",
];

const LAST_NAMES: &[&str] = &[
    "Abbott", "Brooks", "Castillo", "Dorsey", "Ellison", "Fuller", "Garrett", "Holloway", "Ingram", "Jennings",
    "Kessler", "Lowry", "Marsh", "Nolan", "Okafor", "Pruitt", "Ramsey", "Sutton", "Tate", "Vance", "Whitaker",
    "Yates",
];

#[derive(Debug, Clone)]
pub struct SyntheticLeague {
    seed: u64,
    sport: Sport,
    teams: usize,
    players: usize,
    first_season: Season,
    last_season: Season,
}

/// Per-player state while simulating a career.
struct Prospect {
    id: PlayerId,
    talent: f64,
    start: Season,
    end: Season,
}

impl SyntheticLeague {
    pub fn new(seed: u64) -> Self {
        Self { seed, sport: Sport::Basketball, teams: 10, players: 600, first_season: 1985, last_season: 2024 }
    }

    pub fn with_sport(mut self, sport: Sport) -> Self {
        self.sport = sport;
        self
    }

    /// Capped at the number of bundled team names.
    pub fn with_teams(mut self, teams: usize) -> Self {
        self.teams = teams.clamp(1, TEAM_NAMES.len());
        self
    }

    pub fn with_players(mut self, players: usize) -> Self {
        self.players = players;
        self
    }

    pub fn with_seasons(mut self, first: Season, last: Season) -> Self {
        self.first_season = first.min(last);
        self.last_season = first.max(last);
        self
    }

    pub fn build(&self) -> LeagueDataset {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let teams: Vec<Team> = TEAM_NAMES
            .iter()
            .take(self.teams)
            .enumerate()
            .map(|(i, (region, name, abbrev))| Team::new(i as TeamId + 1, *region, *name, *abbrev))
            .collect();
        let team_ids: Vec<TeamId> = teams.iter().map(|team| team.id).collect();

        let prospects: Vec<Prospect> = (0..self.players).map(|i| self.prospect(&mut rng, i as PlayerId + 1)).collect();

        let mut players: Vec<Player> = Vec::with_capacity(prospects.len());
        for prospect in &prospects {
            players.push(self.career(&mut rng, prospect, &team_ids));
        }

        self.hand_out_league_awards(&mut rng, &prospects, &mut players, &team_ids);

        LeagueDataset::new(self.sport, players, teams)
    }

    fn prospect(&self, rng: &mut ChaCha8Rng, id: PlayerId) -> Prospect {
        let talent = rng.gen::<f64>().powi(3);
        let span = self.last_season - self.first_season;
        let start = self.first_season + rng.gen_range(0..=span);
        let length = 1 + (rng.gen::<f64>() * (4.0 + 14.0 * talent)).round() as u16;
        let end = (start + length - 1).min(self.last_season);
        Prospect { id, talent, start, end }
    }

    fn career(&self, rng: &mut ChaCha8Rng, prospect: &Prospect, team_ids: &[TeamId]) -> Player {
        let mut team = *team_ids.choose(rng).unwrap_or(&1);
        let mut lines = Vec::new();
        for season in prospect.start..=prospect.end {
            if season > prospect.start && team_ids.len() > 1 && rng.gen_bool(0.18) {
                let others: Vec<TeamId> = team_ids.iter().copied().filter(|id| *id != team).collect();
                team = *others.choose(rng).unwrap_or(&team);
            }
            lines.push(self.season_line(rng, prospect.talent, season, team));
        }

        let name = format!(
            "{} {}",
            FIRST_NAMES[rng.gen_range(0..FIRST_NAMES.len())],
            LAST_NAMES[rng.gen_range(0..LAST_NAMES.len())]
        );
        let draft = if rng.gen_bool(0.3 * (1.0 - prospect.talent)) {
            None
        } else {
            let round = if prospect.talent > 0.4 || rng.gen_bool(0.4) { 1 } else { 2 };
            let pick = if round == 1 && prospect.talent > 0.9 && rng.gen_bool(0.3) { 1 } else { rng.gen_range(2..=30) };
            Some(DraftInfo { year: prospect.start.saturating_sub(1), round, pick })
        };

        Player::new(prospect.id, name, lines).with_draft(draft)
    }

    fn season_line(&self, rng: &mut ChaCha8Rng, talent: f64, season: Season, team: TeamId) -> SeasonLine {
        let form = talent * rng.gen_range(0.75..1.25);
        let (max_games, stats): (u16, &[(StatField, f64)]) = match self.sport {
            Sport::Basketball => (
                82,
                &[
                    (StatField::Minutes, 36.0),
                    (StatField::Points, 32.0),
                    (StatField::Rebounds, 13.0),
                    (StatField::Assists, 10.0),
                    (StatField::Steals, 2.4),
                    (StatField::Blocks, 2.6),
                    (StatField::ThreePointers, 3.5),
                ],
            ),
            Sport::Hockey => (
                82,
                &[(StatField::Minutes, 22.0), (StatField::Goals, 0.65), (StatField::Assists, 0.9), (StatField::Points, 1.5)],
            ),
            Sport::Football => (
                17,
                &[
                    (StatField::PassingYards, 310.0),
                    (StatField::RushingYards, 95.0),
                    (StatField::ReceivingYards, 100.0),
                    (StatField::Touchdowns, 2.6),
                ],
            ),
            Sport::Baseball => (
                162,
                &[(StatField::Hits, 1.35), (StatField::HomeRuns, 0.3), (StatField::Strikeouts, 1.4), (StatField::Wins, 0.15)],
            ),
        };
        let games = rng.gen_range(max_games / 5..=max_games);
        let mut line = SeasonLine::regular(season, team, games);
        for (field, per_game_ceiling) in stats {
            let per_game = per_game_ceiling * (0.15 + 0.85 * form.min(1.0)) * rng.gen_range(0.6..1.0);
            line = line.with_stat(*field, (per_game * f64::from(games)).round());
        }
        line
    }

    /// Champions, MVPs, all-stars and hall of fame inductions, handed out
    /// season by season so that every award lines up with a real season line.
    fn hand_out_league_awards(
        &self,
        rng: &mut ChaCha8Rng,
        prospects: &[Prospect],
        players: &mut [Player],
        team_ids: &[TeamId],
    ) {
        let mut awards: Vec<Vec<Award>> = vec![Vec::new(); players.len()];

        for season in self.first_season..=self.last_season {
            let mut active: Vec<(usize, TeamId, f64)> = players
                .iter()
                .enumerate()
                .filter_map(|(slot, player)| {
                    let line = player.regular_lines().find(|line| line.season == season)?;
                    Some((slot, line.team_id, prospects[slot].talent * rng.gen_range(0.8..1.2)))
                })
                .collect();
            if active.is_empty() {
                continue;
            }
            active.sort_by(|a, b| b.2.total_cmp(&a.2).then(a.0.cmp(&b.0)));

            let award = |kind: AwardKind, team: TeamId| Award { kind, season, team_id: Some(team) };
            let (mvp_slot, mvp_team, _) = active[0];
            awards[mvp_slot].push(award(AwardKind::Mvp, mvp_team));
            for &(slot, team, _) in active.iter().take(10) {
                awards[slot].push(award(AwardKind::AllLeague, team));
            }
            for &(slot, team, _) in active.iter().take(24) {
                awards[slot].push(award(AwardKind::AllStar, team));
            }
            if let Some(&(slot, team, _)) = active.iter().skip(3).find(|entry| entry.2 > 0.3) {
                awards[slot].push(award(AwardKind::DefensivePlayer, team));
            }

            let Some(&champion) = team_ids.choose(rng) else { continue };
            let mut finals_mvp = None;
            for &(slot, team, _) in active.iter().filter(|entry| entry.1 == champion) {
                awards[slot].push(award(AwardKind::Champion, team));
                finals_mvp.get_or_insert((slot, team));
            }
            if let Some((slot, team)) = finals_mvp {
                awards[slot].push(award(AwardKind::FinalsMvp, team));
            }

            let rookie = active.iter().find(|entry| prospects[entry.0].start == season);
            if let Some(&(slot, team, _)) = rookie {
                awards[slot].push(award(AwardKind::RookieOfTheYear, team));
            }
        }

        for (slot, player) in players.iter_mut().enumerate() {
            let prospect = &prospects[slot];
            let retired_long_enough = prospect.end + 5 <= self.last_season;
            let decorated = awards[slot].iter().filter(|a| a.kind == AwardKind::AllStar).count() >= 6;
            if retired_long_enough && decorated && prospect.end - prospect.start >= 9 {
                awards[slot].push(Award { kind: AwardKind::HallOfFame, season: prospect.end + 5, team_id: None });
            }
            player.awards = std::mem::take(&mut awards[slot]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_league() {
        let a = SyntheticLeague::new(42).with_players(150).build();
        let b = SyntheticLeague::new(42).with_players(150).build();
        let c = SyntheticLeague::new(43).with_players(150).build();
        assert_eq!(a.version, b.version);
        assert_ne!(a.version, c.version);
    }

    #[test]
    fn test_awards_line_up_with_season_lines() {
        let league = SyntheticLeague::new(1).with_players(300).build();
        for player in &league.players {
            for award in player.awards.iter().filter(|a| !a.kind.is_career_honor()) {
                let team = award.team_id.unwrap();
                assert!(
                    player.regular_lines().any(|line| line.season == award.season && line.team_id == team),
                    "{} {:?}",
                    player.name,
                    award
                );
            }
        }
        assert!(league.players.iter().any(|p| p.has_award(AwardKind::Mvp)));
        assert!(league.players.iter().any(|p| p.has_award(AwardKind::Champion)));
    }

    #[test]
    fn test_every_sport_builds() {
        for sport in [Sport::Basketball, Sport::Football, Sport::Hockey, Sport::Baseball] {
            let league = SyntheticLeague::new(5).with_sport(sport).with_players(50).with_teams(6).build();
            assert_eq!(league.sport, sport);
            assert_eq!(league.teams.len(), 6);
            assert_eq!(league.players.len(), 50);
        }
    }
}
