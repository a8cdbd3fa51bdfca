//! Benchmarks for grid generation and eligibility queries
//!
//! Uses a 5,000-player synthetic league so the season-biased seed path is active.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use grid_core::data::SyntheticLeague;
use grid_core::{
    generate_grid, Constraint, EligibilityIndex, GenerateOptions, LeagueContext, LeagueDataset, StandardCatalog,
};

fn league() -> (LeagueDataset, StandardCatalog) {
    let mut dataset = SyntheticLeague::new(42).with_players(5000).with_teams(16).build();
    let catalog = StandardCatalog::for_dataset(&dataset);
    dataset.prepare(&catalog);
    (dataset, catalog)
}

fn bench_generate_warm_index(c: &mut Criterion) {
    let (dataset, catalog) = league();
    let ctx = LeagueContext::new(&dataset, &catalog);
    let index = EligibilityIndex::new();
    let mut n = 0u64;

    c.bench_function("generate_grid_warm_index", |b| {
        b.iter(|| {
            n += 1;
            let grid = generate_grid(&ctx, &index, &GenerateOptions::seeded(format!("bench-{n}")));
            black_box(grid)
        })
    });
}

fn bench_generate_cold_index(c: &mut Criterion) {
    let (dataset, catalog) = league();
    let ctx = LeagueContext::new(&dataset, &catalog);

    c.bench_function("generate_grid_cold_index", |b| {
        b.iter(|| {
            let index = EligibilityIndex::new();
            black_box(generate_grid(&ctx, &index, &GenerateOptions::seeded("cold")))
        })
    });
}

fn bench_intersections(c: &mut Criterion) {
    let (dataset, catalog) = league();
    let ctx = LeagueContext::new(&dataset, &catalog);
    let index = EligibilityIndex::new();
    let team = Constraint::team(3);
    let all_star = Constraint::achievement("all_star", false);
    let season_mvp = Constraint::achievement("season_mvp", true);

    c.bench_function("intersect_team_achievement", |b| {
        b.iter(|| black_box(index.count(&ctx, black_box(&team), black_box(&all_star))))
    });
    c.bench_function("intersect_team_season_memoized", |b| {
        b.iter(|| black_box(index.count(&ctx, black_box(&team), black_box(&season_mvp))))
    });
}

criterion_group!(benches, bench_generate_warm_index, bench_generate_cold_index, bench_intersections);
criterion_main!(benches);
