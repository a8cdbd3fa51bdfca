//! Grid Tool Library
//!
//! League JSON → prepared `LeagueDataset` → MessagePack → LZ4 → SHA256 checksum,
//! plus the dataset helpers behind the `grid_tool` CLI.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use grid_core::data::{load_league, load_league_from_env, SyntheticLeague};
use grid_core::{AchievementCatalog, EligibilityIndex, LeagueContext, LeagueDataset, StandardCatalog};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheMetadata {
    /// e.g. "v1"
    pub schema_version: String,
    /// SHA256 of the written file (hex)
    pub checksum: String,
    /// RFC3339
    pub created_at: String,
    pub original_size: u64,
    pub compressed_size: u64,
    /// compressed / original
    pub compression_ratio: f64,
    pub dataset_version: String,
    pub players: usize,
    pub teams: usize,
}

/// Packs a normalized league JSON into a MessagePack+LZ4 cache.
///
/// With `prepare`, achievement flags, the season index and the overlap summary
/// are computed now and shipped inside the cache.
pub fn pack_league(
    input_json: &Path,
    output_msgpack_lz4: &Path,
    schema_version: &str,
    prepare: bool,
) -> Result<CacheMetadata> {
    let json = fs::read(input_json).with_context(|| format!("Failed to read league JSON: {}", input_json.display()))?;
    let original_size = json.len() as u64;

    let mut dataset: LeagueDataset = serde_json::from_slice(&json).context("Failed to parse league JSON")?;
    dataset.finalize();
    if prepare {
        let catalog = StandardCatalog::for_dataset(&dataset);
        dataset.prepare(&catalog);
    }

    let msgpack = rmp_serde::to_vec_named(&dataset).context("Failed to serialize league to MessagePack")?;
    let compressed = lz4_flex::compress_prepend_size(&msgpack);
    let compressed_size = compressed.len() as u64;
    let checksum = sha256_hex(&compressed);

    if let Some(parent) = output_msgpack_lz4.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    fs::write(output_msgpack_lz4, &compressed)
        .with_context(|| format!("Failed to write cache file: {}", output_msgpack_lz4.display()))?;

    tracing::info!(
        players = dataset.players.len(),
        version = %dataset.version,
        bytes = compressed_size,
        "packed league cache"
    );

    Ok(CacheMetadata {
        schema_version: schema_version.to_string(),
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        original_size,
        compressed_size,
        compression_ratio: compressed_size as f64 / original_size.max(1) as f64,
        dataset_version: dataset.version.to_string(),
        players: dataset.players.len(),
        teams: dataset.teams.len(),
    })
}

pub fn verify_cache(cache_file: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(cache_file).with_context(|| format!("Failed to read cache file: {}", cache_file.display()))?;
    Ok(sha256_hex(&bytes) == expected_checksum.trim().to_lowercase())
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Loads `path` (or `IG_LEAGUE_PATH` when `None`) and prepares it if the
/// cache was packed without preparation.
pub fn open_league(path: Option<&Path>) -> Result<(LeagueDataset, StandardCatalog)> {
    let mut dataset = match path {
        Some(path) => load_league(path).with_context(|| format!("Failed to load league: {}", path.display()))?,
        None => load_league_from_env().context("Failed to load league from environment")?,
    };
    let catalog = StandardCatalog::for_dataset(&dataset);
    if dataset.season_index.is_none() {
        dataset.prepare(&catalog);
    }
    Ok((dataset, catalog))
}

/// Writes a synthetic league as JSON, ready for [`pack_league`].
pub fn write_synthetic_league(league: &SyntheticLeague, out: &Path) -> Result<LeagueDataset> {
    let dataset = league.build();
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }
    let json = serde_json::to_vec(&dataset).context("Failed to serialize synthetic league")?;
    fs::write(out, json).with_context(|| format!("Failed to write league JSON: {}", out.display()))?;
    Ok(dataset)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementReport {
    pub id: String,
    pub label: String,
    pub season_specific: bool,
    pub players: usize,
    pub min_players: usize,
}

impl AchievementReport {
    pub fn is_viable(&self) -> bool {
        self.players >= self.min_players.max(1)
    }
}

/// What a league offers the generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeagueReport {
    pub dataset_version: String,
    pub players: usize,
    pub enabled_teams: usize,
    pub first_season: Option<u16>,
    pub last_season: Option<u16>,
    pub has_season_index: bool,
    /// Sorted by qualifying players, most first.
    pub achievements: Vec<AchievementReport>,
}

impl LeagueReport {
    pub fn viable_achievements(&self) -> usize {
        self.achievements.iter().filter(|a| a.is_viable()).count()
    }
}

pub fn analyze_league(dataset: &LeagueDataset, catalog: &dyn AchievementCatalog, index: &EligibilityIndex) -> LeagueReport {
    let ctx = LeagueContext::new(dataset, catalog);
    let mut achievements: Vec<AchievementReport> = ctx
        .achievements()
        .iter()
        .map(|achievement| AchievementReport {
            id: achievement.id.to_string(),
            label: achievement.label.clone(),
            season_specific: achievement.is_season_specific(),
            players: index.eligible(&ctx, &LeagueContext::constraint_for(achievement)).len(),
            min_players: achievement.min_players,
        })
        .collect();
    achievements.sort_by(|a, b| b.players.cmp(&a.players).then_with(|| a.id.cmp(&b.id)));

    LeagueReport {
        dataset_version: dataset.version.to_string(),
        players: dataset.players.len(),
        enabled_teams: dataset.enabled_teams().count(),
        first_season: dataset.players.iter().filter_map(|p| p.first_season()).min(),
        last_season: dataset.players.iter().filter_map(|p| p.last_season()).max(),
        has_season_index: dataset.season_index.is_some(),
        achievements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_pack_verify_and_load() -> Result<()> {
        let dir = tempdir()?;
        let json_path = dir.path().join("league.json");
        let cache_path = dir.path().join("out/league.msgpack.lz4");
        let original = write_synthetic_league(&SyntheticLeague::new(4).with_players(200), &json_path)?;

        let meta = pack_league(&json_path, &cache_path, "v1", true)?;
        assert_eq!(meta.schema_version, "v1");
        assert_eq!(meta.players, 200);
        assert_eq!(meta.dataset_version, original.version.to_string());
        assert!(verify_cache(&cache_path, &meta.checksum)?);
        assert!(!verify_cache(&cache_path, "00")?);

        let (loaded, _catalog) = open_league(Some(&cache_path))?;
        assert_eq!(loaded.version, original.version);
        assert!(loaded.season_index.is_some());
        assert!(loaded.overlap.is_some());
        Ok(())
    }

    #[test]
    fn test_unprepared_cache_is_prepared_on_open() -> Result<()> {
        let dir = tempdir()?;
        let json_path = dir.path().join("league.json");
        let cache_path = dir.path().join("league.msgpack.lz4");
        write_synthetic_league(&SyntheticLeague::new(9).with_players(60), &json_path)?;

        pack_league(&json_path, &cache_path, "v1", false)?;
        let (loaded, _catalog) = open_league(Some(&cache_path))?;
        assert!(loaded.season_index.is_some());
        Ok(())
    }

    #[test]
    fn test_analyze_reports_viability() -> Result<()> {
        let dir = tempdir()?;
        let json_path = dir.path().join("league.json");
        write_synthetic_league(&SyntheticLeague::new(2).with_players(300), &json_path)?;
        let (dataset, catalog) = open_league(Some(&json_path))?;

        let report = analyze_league(&dataset, &catalog, &EligibilityIndex::new());
        assert_eq!(report.players, 300);
        assert!(report.has_season_index);
        assert!(report.viable_achievements() > 5);
        assert!(report.achievements.windows(2).all(|w| w[0].players >= w[1].players));
        Ok(())
    }
}
