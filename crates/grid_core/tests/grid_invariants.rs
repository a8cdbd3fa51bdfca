//! Cross-module checks: every generated grid satisfies the grid invariants.

use fxhash::FxHashMap;
use grid_core::data::SyntheticLeague;
use grid_core::models::SeasonLine;
use grid_core::{
    generate_grid, Constraint, EligibilityIndex, GenerateOptions, GenerationError, Grid, GridGenerator,
    GeneratorConfig, Layout, LeagueContext, LeagueDataset, Player, PlayerId, Sport, StandardCatalog, Team,
};

fn prepared(seed: u64, sport: Sport) -> (LeagueDataset, StandardCatalog) {
    let mut dataset = SyntheticLeague::new(seed).with_sport(sport).build();
    let catalog = StandardCatalog::for_dataset(&dataset);
    dataset.prepare(&catalog);
    (dataset, catalog)
}

fn assert_invariants(ctx: &LeagueContext<'_>, grid: &Grid) {
    let headers: Vec<&Constraint> = grid.rows().iter().chain(grid.cols().iter()).collect();
    for (i, a) in headers.iter().enumerate() {
        for b in &headers[i + 1..] {
            assert_ne!(a, b, "seed {} repeats a header", grid.seed());
        }
    }

    let mut sole: FxHashMap<PlayerId, usize> = FxHashMap::default();
    for (r, row) in grid.rows().iter().enumerate() {
        for (c, col) in grid.cols().iter().enumerate() {
            let cell = grid.cell(r, c).unwrap();
            assert!(!cell.is_empty(), "seed {} cell ({r}, {c}) is empty", grid.seed());
            if cell.len() == 1 {
                *sole.entry(*cell.iter().next().unwrap()).or_default() += 1;
            }
            for id in cell {
                let player = ctx.dataset.player(*id).unwrap();
                if !(row.is_season_specific() || col.is_season_specific()) {
                    assert!(row.test(player, ctx.dataset, ctx.catalog), "{row} rejects {id}");
                    assert!(col.test(player, ctx.dataset, ctx.catalog), "{col} rejects {id}");
                }
            }
        }
    }
    assert!(sole.values().all(|&n| n <= 1), "seed {} forces one player twice", grid.seed());
}

#[test]
fn generated_grids_hold_invariants_over_many_seeds() {
    let (dataset, catalog) = prepared(2024, Sport::Basketball);
    let ctx = LeagueContext::new(&dataset, &catalog);
    let index = EligibilityIndex::new();

    for n in 0..40 {
        let grid = generate_grid(&ctx, &index, &GenerateOptions::seeded(format!("seed-{n}"))).unwrap();
        assert_invariants(&ctx, &grid);
    }
}

#[test]
fn other_sports_generate_too() {
    for sport in [Sport::Football, Sport::Hockey, Sport::Baseball] {
        let (dataset, catalog) = prepared(77, sport);
        let ctx = LeagueContext::new(&dataset, &catalog);
        let index = EligibilityIndex::new();
        let grid = GridGenerator::new(GeneratorConfig::sparse())
            .generate(&ctx, &index, &GenerateOptions::seeded(format!("{sport:?}")))
            .unwrap();
        assert_invariants(&ctx, &grid);
    }
}

#[test]
fn same_seed_same_grid_across_fresh_indexes() {
    let (dataset, catalog) = prepared(5, Sport::Basketball);
    let ctx = LeagueContext::new(&dataset, &catalog);

    let first = generate_grid(&ctx, &EligibilityIndex::new(), &GenerateOptions::seeded("daily-0042")).unwrap();
    let second = generate_grid(&ctx, &EligibilityIndex::new(), &GenerateOptions::seeded("daily-0042")).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.share_code(), second.share_code());
}

#[test]
fn rebuilt_dataset_keeps_seeded_grids() {
    let (a, catalog) = prepared(6, Sport::Basketball);
    let (b, _) = prepared(6, Sport::Basketball);
    let index = EligibilityIndex::new();

    let from_a = generate_grid(&LeagueContext::new(&a, &catalog), &index, &GenerateOptions::seeded("stable")).unwrap();
    let from_b = generate_grid(&LeagueContext::new(&b, &catalog), &index, &GenerateOptions::seeded("stable")).unwrap();
    assert_eq!(from_a.rows(), from_b.rows());
    assert_eq!(from_a.cols(), from_b.cols());
}

#[test]
fn share_codes_round_trip() {
    let (dataset, catalog) = prepared(8, Sport::Basketball);
    let ctx = LeagueContext::new(&dataset, &catalog);
    let index = EligibilityIndex::new();

    for n in 0..10 {
        let grid = generate_grid(&ctx, &index, &GenerateOptions::seeded(format!("share-{n}"))).unwrap();
        let rebuilt = Grid::from_share_code(&ctx, &index, &grid.share_code()).unwrap();
        assert_eq!(rebuilt, grid);
    }
}

/// Six teams whose only shared player is one journeyman: every complete
/// all-team grid has that player as the sole answer of all nine cells, so each
/// attempt reaches assembly and is thrown away.
#[test]
fn grids_forcing_one_player_are_retried_then_rejected() {
    let mut players: Vec<Player> = (0..6u32)
        .flat_map(|team| {
            (0..3u32).map(move |n| {
                let id = 10 + team * 3 + n;
                Player::new(id, format!("Local {id}"), vec![SeasonLine::regular(2015, team, 50)])
            })
        })
        .collect();
    players.push(Player::new(
        1,
        "Journeyman",
        (0..6u32).map(|team| SeasonLine::regular(2010 + team as u16, team, 40)).collect(),
    ));
    let teams = (0..6u32).map(|id| Team::new(id, "City", format!("T{id}"), format!("T{id}"))).collect();
    let mut dataset = LeagueDataset::new(Sport::Basketball, players, teams);
    let catalog = StandardCatalog::new(Sport::Basketball);
    dataset.prepare(&catalog);
    let ctx = LeagueContext::new(&dataset, &catalog);
    let index = EligibilityIndex::new();

    let options = GenerateOptions::seeded("journeyman").with_layout(Layout::AllTeams);
    let config = GeneratorConfig::quick();
    match GridGenerator::new(config.clone()).generate(&ctx, &index, &options) {
        Err(GenerationError::Exhausted { attempts, reason }) => {
            assert_eq!(attempts, config.max_attempts);
            assert!(reason.contains("forced player"), "{reason}");
        }
        Ok(grid) => {
            assert_invariants(&ctx, &grid);
            panic!("every all-team grid forces player 1, got {}", grid.share_code());
        }
        Err(other) => panic!("expected exhaustion, got {other:?}"),
    }
}

/// The solvability check on its own: a complete grid in which one player is
/// the only answer for two cells is refused by assembly.
#[test]
fn assembly_refuses_forced_player() {
    let mut players: Vec<Player> = (0..6u32)
        .map(|team| Player::new(10 + team, format!("Local {team}"), vec![SeasonLine::regular(2015, team, 50)]))
        .collect();
    players.push(Player::new(
        1,
        "Journeyman",
        (0..6u32).map(|team| SeasonLine::regular(2010 + team as u16, team, 40)).collect(),
    ));
    let teams = (0..6u32).map(|id| Team::new(id, "City", format!("T{id}"), format!("T{id}"))).collect();
    let dataset = LeagueDataset::new(Sport::Basketball, players, teams);
    let catalog = StandardCatalog::new(Sport::Basketball);
    let ctx = LeagueContext::new(&dataset, &catalog);
    let index = EligibilityIndex::new();

    let rows = [Constraint::team(0), Constraint::team(1), Constraint::team(2)];
    let cols = [Constraint::team(3), Constraint::team(4), Constraint::team(5)];
    match Grid::assemble(&ctx, &index, "forced", Layout::AllTeams, rows, cols) {
        Err(GenerationError::Unsolvable { player_id, cells }) => {
            assert_eq!(player_id, 1);
            assert!(cells.len() >= 2);
        }
        other => panic!("expected unsolvable, got {other:?}"),
    }
}

#[test]
fn missing_season_index_never_yields_season_headers() {
    let mut dataset = SyntheticLeague::new(12).build();
    let catalog = StandardCatalog::for_dataset(&dataset);
    dataset.precompute_flags(&catalog);
    let ctx = LeagueContext::new(&dataset, &catalog);
    let index = EligibilityIndex::new();

    let season = Constraint::achievement("season_mvp", true);
    assert!(index.eligible(&ctx, &season).is_empty());
    assert!(index.intersect(&ctx, &Constraint::team(1), &season).is_empty());

    for n in 0..10 {
        let grid = generate_grid(&ctx, &index, &GenerateOptions::seeded(format!("plain-{n}"))).unwrap();
        assert!(grid.rows().iter().chain(grid.cols().iter()).all(|h| !h.is_season_specific()));
    }
}

#[test]
fn correct_guesses_score_within_bounds() {
    let (dataset, catalog) = prepared(13, Sport::Basketball);
    let ctx = LeagueContext::new(&dataset, &catalog);
    let index = EligibilityIndex::new();
    let grid = generate_grid(&ctx, &index, &GenerateOptions::seeded("scores")).unwrap();

    for r in 0..3 {
        for c in 0..3 {
            let cell = grid.cell(r, c).unwrap();
            for id in cell {
                assert!(grid.check_guess(r, c, *id));
                let score = grid.score_guess(&dataset, r, c, *id).unwrap();
                assert!((10..=100).contains(&score));
            }
            if cell.len() == 1 {
                let only = *cell.iter().next().unwrap();
                assert_eq!(grid.score_guess(&dataset, r, c, only), Ok(100));
            }
        }
    }
}
