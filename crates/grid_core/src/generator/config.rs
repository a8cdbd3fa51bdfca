//! Generator configuration.
//!
//! Tunables for the retry loop, candidate search and decade weighting. Values
//! come from a preset, optionally overridden by a JSON file.
//!
//! ## Usage
//!
//! ```rust
//! use grid_core::generator::GeneratorConfig;
//!
//! let config = GeneratorConfig::default();
//! let sparse = GeneratorConfig::sparse();
//! assert!(sparse.max_attempts > config.max_attempts);
//! ```
//!
//! ## Environment Variables
//!
//! - `IG_GENERATOR_PROFILE`: preset name (`default`, `sparse`, `quick`)
//! - `IG_GENERATOR_CONFIG_PATH`: JSON file replacing the preset

use serde::{Deserialize, Serialize};
use std::{env, fs};

use super::layout::Layout;
use crate::models::Season;

pub const GENERATOR_PROFILE_ENV: &str = "IG_GENERATOR_PROFILE";
pub const GENERATOR_CONFIG_PATH_ENV: &str = "IG_GENERATOR_CONFIG_PATH";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutWeight {
    pub layout: Layout,
    pub weight: f64,
}

/// Prior that keeps puzzles contemporary: recent decades are favoured and
/// decades far in the past become very rare.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecadeWeighting {
    /// Used when the dataset does not know its current season.
    pub reference_year: Season,
    pub half_life_years: f64,
    pub ancient_cutoff_years: u16,
    pub ancient_weight: f64,
}

impl Default for DecadeWeighting {
    fn default() -> Self {
        Self { reference_year: 2024, half_life_years: 20.0, ancient_cutoff_years: 40, ancient_weight: 0.01 }
    }
}

impl DecadeWeighting {
    pub fn weight(&self, decade_start: Season, reference_year: Season) -> f64 {
        let decade_end = decade_start.saturating_add(9);
        if decade_end >= reference_year {
            return 1.0;
        }
        let age = reference_year - decade_end;
        if age > self.ancient_cutoff_years {
            return self.ancient_weight;
        }
        (-(f64::from(age)) * std::f64::consts::LN_2 / self.half_life_years).exp().max(self.ancient_weight)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Whole-grid attempts before giving up.
    pub max_attempts: u32,
    /// Candidates evaluated per remaining slot before the attempt fails.
    pub draws_per_slot: u32,
    /// Failed attempts between draw-budget increases.
    pub backoff_every: u32,
    pub backoff_factor: f64,
    pub max_draws_per_slot: u32,
    /// Candidate evaluations between cooperative yields.
    pub chunk_size: usize,
    /// Leagues at least this large (with a season index) prefer season-aligned seeds.
    pub rich_dataset_players: usize,
    pub season_seed_bias: f64,
    /// Skip achievements with fewer qualifying players than their `min_players`.
    pub enforce_min_players: bool,
    pub layouts: Vec<LayoutWeight>,
    pub decade: DecadeWeighting,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_attempts: 120,
            draws_per_slot: 40,
            backoff_every: 10,
            backoff_factor: 1.5,
            max_draws_per_slot: 400,
            chunk_size: 64,
            rich_dataset_players: 2000,
            season_seed_bias: 0.7,
            enforce_min_players: true,
            layouts: vec![
                LayoutWeight { layout: Layout::Balanced, weight: 4.0 },
                LayoutWeight { layout: Layout::MixedRows, weight: 1.5 },
                LayoutWeight { layout: Layout::MixedColumns, weight: 1.5 },
                LayoutWeight { layout: Layout::RowHeavy, weight: 1.0 },
                LayoutWeight { layout: Layout::ColumnHeavy, weight: 1.0 },
            ],
            decade: DecadeWeighting::default(),
        }
    }
}

impl GeneratorConfig {
    /// Small or young leagues: more attempts, every achievement with at least
    /// one player is usable, team-heavy templates preferred.
    pub fn sparse() -> Self {
        Self {
            max_attempts: 400,
            draws_per_slot: 80,
            max_draws_per_slot: 1000,
            enforce_min_players: false,
            layouts: vec![
                LayoutWeight { layout: Layout::Balanced, weight: 3.0 },
                LayoutWeight { layout: Layout::RowHeavy, weight: 2.0 },
                LayoutWeight { layout: Layout::ColumnHeavy, weight: 2.0 },
                LayoutWeight { layout: Layout::AllTeams, weight: 1.0 },
            ],
            ..Self::default()
        }
    }

    /// Low budgets for previews and interactive hosts.
    pub fn quick() -> Self {
        Self { max_attempts: 30, draws_per_slot: 20, max_draws_per_slot: 80, ..Self::default() }
    }

    pub fn from_profile(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "" | "default" => Some(Self::default()),
            "sparse" => Some(Self::sparse()),
            "quick" => Some(Self::quick()),
            _ => None,
        }
    }

    /// `IG_GENERATOR_CONFIG_PATH` if set, else the `IG_GENERATOR_PROFILE`
    /// preset, else the default.
    pub fn from_env() -> Result<Self, String> {
        if let Ok(path) = env::var(GENERATOR_CONFIG_PATH_ENV) {
            let path = path.trim();
            if !path.is_empty() {
                let content = fs::read_to_string(path).map_err(|e| {
                    format!("Failed to read generator config from {GENERATOR_CONFIG_PATH_ENV}='{path}': {e}")
                })?;
                let config = Self::from_json(&content).map_err(|e| {
                    format!("Invalid generator config from {GENERATOR_CONFIG_PATH_ENV}='{path}': {e}")
                })?;
                return Ok(config);
            }
        }
        let profile = env::var(GENERATOR_PROFILE_ENV).unwrap_or_default();
        Self::from_profile(&profile)
            .ok_or_else(|| format!("Unknown generator profile {GENERATOR_PROFILE_ENV}='{profile}'"))
    }

    pub fn from_env_or_default() -> Self {
        Self::from_env().unwrap_or_else(|e| {
            tracing::warn!("{e}; using default generator config");
            Self::default()
        })
    }

    /// Parses and validates a JSON config; missing fields take default values.
    pub fn from_json(content: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("max_attempts must be at least 1".into());
        }
        if self.draws_per_slot == 0 || self.max_draws_per_slot < self.draws_per_slot {
            return Err("draws_per_slot must be in 1..=max_draws_per_slot".into());
        }
        if self.backoff_every == 0 || self.backoff_factor < 1.0 {
            return Err("backoff_every must be >= 1 and backoff_factor >= 1.0".into());
        }
        if self.chunk_size == 0 {
            return Err("chunk_size must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.season_seed_bias) {
            return Err(format!("season_seed_bias must be in [0, 1], got {}", self.season_seed_bias));
        }
        if self.layouts.iter().any(|lw| !lw.weight.is_finite() || lw.weight < 0.0) {
            return Err("layout weights must be finite and non-negative".into());
        }
        if !self.layouts.iter().any(|lw| lw.weight > 0.0) {
            return Err("at least one layout needs a positive weight".into());
        }
        if self.decade.half_life_years <= 0.0 || !(0.0..=1.0).contains(&self.decade.ancient_weight) {
            return Err("decade weighting needs half_life_years > 0 and ancient_weight in [0, 1]".into());
        }
        Ok(())
    }

    /// Per-slot draw budget after `failed` attempts.
    pub fn draw_budget(&self, failed: u32) -> u32 {
        let steps = failed / self.backoff_every.max(1);
        let scaled = f64::from(self.draws_per_slot) * self.backoff_factor.powi(steps.min(32) as i32);
        let cap = self.max_draws_per_slot.max(self.draws_per_slot);
        (scaled.round() as u32).clamp(self.draws_per_slot, cap)
    }
}
