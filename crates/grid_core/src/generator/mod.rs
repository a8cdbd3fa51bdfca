//! Grid generation.
//!
//! Each attempt picks a layout template, anchors the grid on one seed header,
//! fills the opposite axis against the seed, then fills the seed's own axis
//! against the whole opposite axis. The finished headers go through
//! [`Grid::assemble`], which computes every cell and enforces feasibility and
//! solvability. Failed attempts are discarded and retried with a growing
//! per-slot draw budget.
//!
//! All randomness comes from one `ChaCha8Rng` seeded from the seed string, so
//! the same seed over the same dataset version yields the same grid.

mod attempt;
mod candidates;
pub mod config;
pub mod layout;

use std::collections::BTreeMap;

use rand_chacha::ChaCha8Rng;

use crate::context::LeagueContext;
use crate::eligibility::EligibilityIndex;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::seed::{fresh_seed, is_valid_seed, rng_for_seed, weighted_choice};
use attempt::Attempt;
use candidates::CandidatePools;

pub use config::{DecadeWeighting, GeneratorConfig, LayoutWeight};
pub use layout::{Axis, Layout, SlotKind};

/// Snapshot handed to the yield hook between candidate chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationProgress {
    /// 1-based attempt number.
    pub attempt: u32,
    pub max_attempts: u32,
    pub layout: Layout,
    /// Candidate evaluations so far, across attempts.
    pub evaluated: usize,
}

#[derive(Default)]
pub struct GenerateOptions<'a> {
    /// Reproduce a specific puzzle. A fresh seed is drawn and recorded when absent.
    pub seed: Option<String>,
    /// Force one template for every attempt.
    pub layout: Option<Layout>,
    /// Called after every `chunk_size` candidate evaluations.
    pub on_yield: Option<&'a dyn Fn(&GenerationProgress)>,
}

impl<'a> GenerateOptions<'a> {
    pub fn seeded(seed: impl Into<String>) -> Self {
        Self { seed: Some(seed.into()), ..Self::default() }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_yield(mut self, hook: &'a dyn Fn(&GenerationProgress)) -> Self {
        self.on_yield = Some(hook);
        self
    }
}

/// Counts candidate evaluations and invokes the yield hook once per chunk.
pub(crate) struct ProgressTracker<'a> {
    hook: Option<&'a dyn Fn(&GenerationProgress)>,
    chunk_size: usize,
    progress: GenerationProgress,
}

impl ProgressTracker<'_> {
    pub(crate) fn tick(&mut self) {
        self.progress.evaluated += 1;
        if self.progress.evaluated % self.chunk_size.max(1) == 0 {
            if let Some(hook) = self.hook {
                hook(&self.progress);
            }
        }
    }
}

pub struct GridGenerator {
    config: GeneratorConfig,
}

impl Default for GridGenerator {
    fn default() -> Self {
        Self::new(GeneratorConfig::default())
    }
}

impl GridGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn generate(
        &self,
        ctx: &LeagueContext<'_>,
        index: &EligibilityIndex,
        options: &GenerateOptions<'_>,
    ) -> Result<Grid, GenerationError> {
        self.config.validate().map_err(GenerationError::InvalidConfig)?;
        let seed = match &options.seed {
            Some(seed) if is_valid_seed(seed) => seed.clone(),
            Some(seed) => return Err(GenerationError::InvalidSeed(seed.clone())),
            None => fresh_seed(),
        };
        let mut rng = rng_for_seed(&seed);
        let config = &self.config;

        let pools = CandidatePools::build(ctx, index, config);
        if let Some(reason) = shortage(&pools, options.layout) {
            tracing::warn!(%seed, version = %ctx.version(), "{reason}");
            return Err(GenerationError::Exhausted { attempts: 0, reason });
        }

        let mut tracker = ProgressTracker {
            hook: options.on_yield,
            chunk_size: config.chunk_size,
            progress: GenerationProgress {
                attempt: 0,
                max_attempts: config.max_attempts,
                layout: Layout::Balanced,
                evaluated: 0,
            },
        };
        let mut failures: BTreeMap<String, u32> = BTreeMap::new();

        for attempt in 0..config.max_attempts {
            let allow_all_teams = attempt >= config.max_attempts / 2;
            let layout = match options.layout {
                Some(layout) => layout,
                None => match pick_layout(&mut rng, config, &pools, allow_all_teams) {
                    Some(layout) => layout,
                    None => {
                        *failures.entry("no usable layout".to_string()).or_default() += 1;
                        continue;
                    }
                },
            };
            tracker.progress.attempt = attempt + 1;
            tracker.progress.layout = layout;

            let search = Attempt {
                ctx,
                index,
                pools: &pools,
                config,
                budget: config.draw_budget(attempt) as usize,
            };
            let result = search
                .run(&mut rng, layout, &mut tracker)
                .and_then(|(rows, cols)| Grid::assemble(ctx, index, seed.as_str(), layout, rows, cols));

            match result {
                Ok(grid) => {
                    tracing::info!(
                        %seed,
                        layout = layout.name(),
                        attempts = attempt + 1,
                        evaluated = tracker.progress.evaluated,
                        "generated grid"
                    );
                    return Ok(grid);
                }
                Err(err) if err.is_recoverable() => {
                    tracing::debug!(%seed, attempt = attempt + 1, layout = layout.name(), code = err.code(), "{err}");
                    *failures.entry(failure_kind(&err)).or_default() += 1;
                }
                Err(err) => return Err(err),
            }
        }

        let reason = tally(&failures);
        tracing::warn!(%seed, attempts = config.max_attempts, "grid generation exhausted: {reason}");
        Err(GenerationError::Exhausted { attempts: config.max_attempts, reason })
    }
}

/// Generates a grid with the default configuration.
pub fn generate_grid(
    ctx: &LeagueContext<'_>,
    index: &EligibilityIndex,
    options: &GenerateOptions<'_>,
) -> Result<Grid, GenerationError> {
    GridGenerator::default().generate(ctx, index, options)
}

/// Human-readable reason when the pools cannot fill any template at all.
fn shortage(pools: &CandidatePools, forced: Option<Layout>) -> Option<String> {
    let (teams, achievements) = (pools.teams.len(), pools.achievements.len());
    let min_teams = Layout::all().iter().map(Layout::teams_needed).min().unwrap_or(3);
    if teams < min_teams {
        return Some(format!("not enough teams: {teams} usable, at least {min_teams} needed"));
    }
    match forced {
        Some(layout) if !pools.supports(layout) => Some(format!(
            "not enough teams or viable achievements for {} layout: {teams} teams, {achievements} achievements",
            layout.name()
        )),
        Some(_) => None,
        None if !Layout::all().iter().any(|layout| pools.supports(*layout)) => Some(format!(
            "not enough viable achievements: {achievements} usable with {teams} teams"
        )),
        None => None,
    }
}

/// Weighted template choice among the ones the pools can fill. `AllTeams`
/// joins once backoff allows it, or immediately when it is the only option.
fn pick_layout(
    rng: &mut ChaCha8Rng,
    config: &GeneratorConfig,
    pools: &CandidatePools,
    allow_all_teams: bool,
) -> Option<Layout> {
    let mut choices: Vec<LayoutWeight> = config
        .layouts
        .iter()
        .copied()
        .filter(|lw| lw.layout != Layout::AllTeams && lw.weight > 0.0 && pools.supports(lw.layout))
        .collect();
    if (allow_all_teams || choices.is_empty()) && pools.supports(Layout::AllTeams) {
        let weight = config
            .layouts
            .iter()
            .find(|lw| lw.layout == Layout::AllTeams && lw.weight > 0.0)
            .map_or(1.0, |lw| lw.weight);
        choices.push(LayoutWeight { layout: Layout::AllTeams, weight });
    }
    let weights: Vec<f64> = choices.iter().map(|lw| lw.weight).collect();
    weighted_choice(rng, &weights).map(|i| choices[i].layout)
}

fn failure_kind(err: &GenerationError) -> String {
    match err {
        GenerationError::InfeasibleLayout { reason } => {
            reason.split(':').next().unwrap_or(reason.as_str()).trim().to_string()
        }
        GenerationError::Unsolvable { .. } => "forced player".to_string(),
        other => other.code().to_string(),
    }
}

fn tally(failures: &BTreeMap<String, u32>) -> String {
    if failures.is_empty() {
        return "no attempt completed".to_string();
    }
    let mut counts: Vec<(&String, &u32)> = failures.iter().collect();
    counts.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    counts.iter().map(|(kind, n)| format!("{n}x {kind}")).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::StandardCatalog;
    use crate::data::synthetic::SyntheticLeague;
    use crate::models::{LeagueDataset, Player, SeasonLine, Sport, Team};
    use std::cell::Cell;

    fn prepared(seed: u64) -> (LeagueDataset, StandardCatalog) {
        let mut dataset = SyntheticLeague::new(seed).build();
        let catalog = StandardCatalog::for_dataset(&dataset);
        dataset.prepare(&catalog);
        (dataset, catalog)
    }

    #[test]
    fn test_same_seed_same_headers() {
        let (dataset, catalog) = prepared(7);
        let ctx = LeagueContext::new(&dataset, &catalog);
        let index = EligibilityIndex::new();

        let a = generate_grid(&ctx, &index, &GenerateOptions::seeded("repeatable")).unwrap();
        let b = generate_grid(&ctx, &index, &GenerateOptions::seeded("repeatable")).unwrap();
        assert_eq!(a.rows(), b.rows());
        assert_eq!(a.cols(), b.cols());
        assert_eq!(a.layout(), b.layout());
        assert_eq!(a.seed(), "repeatable");
    }

    #[test]
    fn test_unseeded_grid_records_its_seed() {
        let (dataset, catalog) = prepared(8);
        let ctx = LeagueContext::new(&dataset, &catalog);
        let index = EligibilityIndex::new();

        let grid = generate_grid(&ctx, &index, &GenerateOptions::default()).unwrap();
        let again = generate_grid(&ctx, &index, &GenerateOptions::seeded(grid.seed())).unwrap();
        assert_eq!(grid.rows(), again.rows());
        assert_eq!(grid.cols(), again.cols());
    }

    #[test]
    fn test_invalid_seed_rejected() {
        let (dataset, catalog) = prepared(9);
        let ctx = LeagueContext::new(&dataset, &catalog);
        let index = EligibilityIndex::new();

        let err = generate_grid(&ctx, &index, &GenerateOptions::seeded("no spaces")).unwrap_err();
        assert_eq!(err, GenerationError::InvalidSeed("no spaces".to_string()));
    }

    #[test]
    fn test_forced_layout_is_used() {
        let (dataset, catalog) = prepared(10);
        let ctx = LeagueContext::new(&dataset, &catalog);
        let index = EligibilityIndex::new();

        let options = GenerateOptions::seeded("forced").with_layout(Layout::AllTeams);
        let grid = generate_grid(&ctx, &index, &options).unwrap();
        assert_eq!(grid.layout(), Layout::AllTeams);
        assert!(grid.rows().iter().chain(grid.cols().iter()).all(|h| h.is_team()));
    }

    #[test]
    fn test_yield_hook_is_called_per_chunk() {
        let (dataset, catalog) = prepared(11);
        let ctx = LeagueContext::new(&dataset, &catalog);
        let index = EligibilityIndex::new();
        let config = GeneratorConfig { chunk_size: 1, ..GeneratorConfig::default() };

        let calls = Cell::new(0usize);
        let hook = |progress: &GenerationProgress| {
            assert!(progress.attempt >= 1);
            calls.set(calls.get() + 1);
        };
        let options = GenerateOptions::seeded("yielding").with_yield(&hook);
        GridGenerator::new(config).generate(&ctx, &index, &options).unwrap();
        assert!(calls.get() >= 5, "{}", calls.get());
    }

    #[test]
    fn test_two_team_league_exhausts() {
        let players = (0..6)
            .map(|id| Player::new(id, format!("P{id}"), vec![SeasonLine::regular(2020, id % 2, 40)]))
            .collect();
        let teams = vec![Team::new(0, "A", "Alphas", "ALP"), Team::new(1, "B", "Betas", "BET")];
        let dataset = LeagueDataset::new(Sport::Basketball, players, teams);
        let catalog = StandardCatalog::new(Sport::Basketball);
        let ctx = LeagueContext::new(&dataset, &catalog);
        let index = EligibilityIndex::new();

        match generate_grid(&ctx, &index, &GenerateOptions::seeded("tiny")) {
            Err(GenerationError::Exhausted { reason, .. }) => assert!(reason.contains("not enough teams"), "{reason}"),
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_tally_orders_by_count() {
        let mut failures = BTreeMap::new();
        failures.insert("empty cell".to_string(), 3);
        failures.insert("forced player".to_string(), 7);
        assert_eq!(tally(&failures), "7x forced player, 3x empty cell");
        assert_eq!(
            failure_kind(&GenerationError::InfeasibleLayout { reason: "empty cell: (0, 1) A x B".into() }),
            "empty cell"
        );
    }

    #[test]
    fn test_zero_sized_knobs_are_rejected_not_panicking() {
        let (dataset, catalog) = prepared(12);
        let ctx = LeagueContext::new(&dataset, &catalog);
        let index = EligibilityIndex::new();

        for config in [
            GeneratorConfig { chunk_size: 0, ..GeneratorConfig::default() },
            GeneratorConfig { backoff_every: 0, ..GeneratorConfig::default() },
            GeneratorConfig { max_draws_per_slot: 1, ..GeneratorConfig::default() },
        ] {
            match GridGenerator::new(config).generate(&ctx, &index, &GenerateOptions::seeded("knobs")) {
                Err(GenerationError::InvalidConfig(_)) => {}
                other => panic!("expected invalid config, got {other:?}"),
            }
        }
    }
}
