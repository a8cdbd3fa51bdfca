//! # grid_core - Deterministic Immaculate-Grid Puzzle Generation
//!
//! Builds 3x3 "immaculate grid" puzzles from a sports league dataset. Each
//! row and column header is a team or an achievement, and every cell has at
//! least one player satisfying both of its headers.
//!
//! ## Features
//! - Seeded generation (same seed + same dataset = same grid)
//! - Feasibility and solvability checked before a grid is returned
//! - Memoized eligibility index over tens of thousands of players
//! - Rarity scoring for correct guesses
//! - Share codes and a JSON API for hosts

// Method naming conventions - would require API changes
#![allow(clippy::should_implement_trait)]
// Catalog predicates take the full (player, id, index, op, team, season) tuple
#![allow(clippy::too_many_arguments)]
#![allow(clippy::type_complexity)]

pub mod achievements;
pub mod analysis;
pub mod api;
pub mod constraint;
pub mod context;
pub mod data;
pub mod eligibility;
pub mod error;
pub mod generator;
pub mod grid;
pub mod models;
pub mod rarity;
pub mod seed;
pub mod share;

pub use achievements::{Achievement, AchievementCatalog, AchievementKind, SeasonIndex, StandardCatalog};
pub use analysis::OverlapSummary;
pub use api::{check_guess_json, generate_grid_json, score_guess_json};
pub use constraint::Constraint;
pub use context::LeagueContext;
pub use eligibility::{EligibilityIndex, PlayerSet};
pub use error::{DatasetError, GenerationError, GridError, GuessError, Result, ShareCodeError};
pub use generator::{generate_grid, GenerateOptions, GenerationProgress, GeneratorConfig, GridGenerator, Layout};
pub use grid::Grid;
pub use models::{AchievementId, DatasetVersion, LeagueDataset, Player, PlayerId, Sport, Team, TeamId};
pub use share::ShareCode;
