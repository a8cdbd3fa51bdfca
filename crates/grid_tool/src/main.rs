//! Grid Tool CLI
//!
//! League cache packing, grid generation and guess scoring from the shell.

#[cfg(feature = "cli")]
use anyhow::{Context, Result};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};

#[cfg(feature = "cli")]
use grid_core::{
    EligibilityIndex, GenerateOptions, GeneratorConfig, Grid, GridGenerator, Layout, LeagueContext, Sport,
};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "grid_tool")]
#[command(about = "Build league caches and generate immaculate grids", long_about = None)]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Pack a league JSON file into a MsgPack+LZ4 cache
    Pack {
        /// Input league JSON path
        #[arg(long)]
        r#in: PathBuf,

        /// Output MsgPack+LZ4 file path
        #[arg(long)]
        out: PathBuf,

        /// Schema version (e.g., "v1")
        #[arg(long, default_value = "v1")]
        schema_version: String,

        /// Skip flag/season-index/overlap precomputation
        #[arg(long, default_value = "false")]
        raw: bool,

        /// Verify cache after building
        #[arg(long, default_value = "false")]
        verify: bool,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Check a cache file against its checksum
    Verify {
        #[arg(long)]
        cache: PathBuf,

        #[arg(long)]
        checksum: String,
    },

    /// Generate a grid
    Generate {
        /// League file (.json or cache); IG_LEAGUE_PATH when omitted
        #[arg(long)]
        league: Option<PathBuf>,

        #[arg(long)]
        seed: Option<String>,

        /// default | sparse | quick
        #[arg(long)]
        profile: Option<String>,

        /// balanced | mixed_rows | mixed_columns | row_heavy | column_heavy | all_teams
        #[arg(long)]
        layout: Option<String>,

        /// Print the JSON API response instead of a table
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Score a guess against a shared grid
    Score {
        #[arg(long)]
        league: Option<PathBuf>,

        #[arg(long)]
        share_code: String,

        #[arg(long)]
        row: usize,

        #[arg(long)]
        col: usize,

        #[arg(long)]
        player: u32,
    },

    /// Summarize which headers a league can support
    Analyze {
        #[arg(long)]
        league: Option<PathBuf>,

        /// Achievements to list
        #[arg(long, default_value = "15")]
        top: usize,
    },

    /// Write a synthetic league JSON file
    Synth {
        #[arg(long)]
        out: PathBuf,

        #[arg(long, default_value = "42")]
        seed: u64,

        #[arg(long, default_value = "basketball")]
        sport: String,

        #[arg(long, default_value = "600")]
        players: usize,

        #[arg(long, default_value = "10")]
        teams: usize,
    },
}

#[cfg(feature = "cli")]
fn init_logging(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr);

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Pack { r#in, out, schema_version, raw, verify, metadata } => {
            println!("🔨 Packing league cache...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());
            println!("   Schema: {}", schema_version);

            let meta = grid_tool::pack_league(&r#in, &out, &schema_version, !raw)?;
            print_metadata(&meta);

            if verify {
                verify_cache_integrity(&out, &meta.checksum)?;
            }

            if let Some(metadata_path) = metadata {
                save_metadata(&metadata_path, &meta)?;
            }
        }

        Commands::Verify { cache, checksum } => {
            verify_cache_integrity(&cache, &checksum)?;
        }

        Commands::Generate { league, seed, profile, layout, json } => {
            let (dataset, catalog) = grid_tool::open_league(league.as_deref())?;
            let index = EligibilityIndex::new();

            if json {
                let request = serde_json::json!({
                    "schema_version": grid_core::api::json_api::SCHEMA_VERSION,
                    "seed": seed,
                    "profile": profile,
                    "layout": layout,
                });
                let response = grid_core::generate_grid_json(&dataset, &catalog, &index, &request.to_string())
                    .map_err(anyhow::Error::msg)?;
                println!("{response}");
                return Ok(());
            }

            let config = match profile.as_deref() {
                Some(name) => GeneratorConfig::from_profile(name)
                    .with_context(|| format!("unknown profile '{name}'"))?,
                None => GeneratorConfig::from_env_or_default(),
            };
            let layout = match layout.as_deref() {
                Some(name) => Some(Layout::from_str(name).with_context(|| format!("unknown layout '{name}'"))?),
                None => None,
            };

            let ctx = LeagueContext::new(&dataset, &catalog);
            let options = GenerateOptions { seed, layout, on_yield: None };
            let grid = GridGenerator::new(config).generate(&ctx, &index, &options)?;
            print_grid(&ctx, &grid);
        }

        Commands::Score { league, share_code, row, col, player } => {
            let (dataset, catalog) = grid_tool::open_league(league.as_deref())?;
            let ctx = LeagueContext::new(&dataset, &catalog);
            let grid = Grid::from_share_code(&ctx, &EligibilityIndex::new(), &share_code)?;

            let name = dataset.player(player).map_or("unknown player", |p| p.name.as_str());
            let score = grid.score_guess(&dataset, row, col, player)?;
            let pool = grid.cell(row, col).map_or(0, |cell| cell.len());
            println!("✅ {name} fits ({row}, {col})");
            println!("   Score: {score} / 100  (pool of {pool})");
        }

        Commands::Analyze { league, top } => {
            let (dataset, catalog) = grid_tool::open_league(league.as_deref())?;
            let report = grid_tool::analyze_league(&dataset, &catalog, &EligibilityIndex::new());

            println!("📊 League {}", report.dataset_version);
            println!("   Players:       {}", report.players);
            println!("   Teams:         {}", report.enabled_teams);
            if let (Some(first), Some(last)) = (report.first_season, report.last_season) {
                println!("   Seasons:       {first}-{last}");
            }
            println!("   Season index:  {}", if report.has_season_index { "yes" } else { "no" });
            println!("   Viable headers: {} / {}", report.viable_achievements(), report.achievements.len());
            println!();
            for achievement in report.achievements.iter().take(top) {
                let mark = if achievement.is_viable() { "✓" } else { "✗" };
                let season = if achievement.season_specific { " [season]" } else { "" };
                println!("   {mark} {:>6}  {}{season}", achievement.players, achievement.label);
            }
        }

        Commands::Synth { out, seed, sport, players, teams } => {
            let sport = Sport::from_str(&sport).with_context(|| format!("unknown sport '{sport}'"))?;
            let league = grid_core::data::SyntheticLeague::new(seed)
                .with_sport(sport)
                .with_players(players)
                .with_teams(teams);
            let dataset = grid_tool::write_synthetic_league(&league, &out)?;
            println!("🧪 Synthetic league written to {}", out.display());
            println!("   Players: {}  Teams: {}  Version: {}", dataset.players.len(), dataset.teams.len(), dataset.version);
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_grid(ctx: &LeagueContext<'_>, grid: &Grid) {
    println!("🧩 Grid {}  ({})", grid.seed(), grid.layout().name());
    println!("   Share code: {}", grid.share_code());
    println!();
    let counts = grid.candidate_counts();
    for (c, col) in grid.cols().iter().enumerate() {
        println!("   col {c}: {}", ctx.label(col));
    }
    for (r, row) in grid.rows().iter().enumerate() {
        let cells: Vec<String> = counts[r].iter().map(|n| format!("{n:>5}")).collect();
        println!("   row {r}: {:<40} {}", ctx.label(row), cells.join(" "));
    }
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &grid_tool::CacheMetadata) {
    println!("\n✅ Cache built successfully!");
    println!("   Players:         {}", meta.players);
    println!("   Teams:           {}", meta.teams);
    println!("   Dataset version: {}", meta.dataset_version);
    println!(
        "   Original size:   {} bytes ({:.2} KB)",
        meta.original_size,
        meta.original_size as f64 / 1024.0
    );
    println!(
        "   Compressed size: {} bytes ({:.2} KB)",
        meta.compressed_size,
        meta.compressed_size as f64 / 1024.0
    );
    println!("   Compression:     {:.1}%", meta.compression_ratio * 100.0);
    println!("   Checksum:        {}", meta.checksum);
    println!("   Created:         {}", meta.created_at);
}

#[cfg(feature = "cli")]
fn verify_cache_integrity(cache_path: &Path, checksum: &str) -> Result<()> {
    println!("\n🔍 Verifying cache integrity...");
    if grid_tool::verify_cache(cache_path, checksum)? {
        println!("✅ Cache verification passed");
        Ok(())
    } else {
        anyhow::bail!("❌ Cache verification failed - checksum mismatch!")
    }
}

#[cfg(feature = "cli")]
fn save_metadata(path: &Path, meta: &grid_tool::CacheMetadata) -> Result<()> {
    let metadata_json = serde_json::to_string_pretty(meta)?;
    std::fs::write(path, metadata_json)?;
    println!("\n📄 Metadata saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("grid_tool CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
