//! League dataset loader.
//!
//! Accepted inputs:
//! - `*.json`: a serialized [`LeagueDataset`]
//! - anything else: MessagePack of the same, optionally wrapped in
//!   size-prepended LZ4 (the format `grid_tool pack` writes)
//!
//! Derived fields (`teams_played`, ordering, version) are recomputed after
//! decoding, so caches never need to carry them correctly.

use lz4_flex::decompress_size_prepended;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::DatasetError;
use crate::models::LeagueDataset;

/// Path of the default league dataset.
pub const LEAGUE_PATH_ENV: &str = "IG_LEAGUE_PATH";

pub fn load_league(path: &Path) -> Result<LeagueDataset, DatasetError> {
    let bytes = std::fs::read(path)?;
    let is_json = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let mut dataset = if is_json { serde_json::from_slice(&bytes)? } else { decode_league_bytes(&bytes)? };
    dataset.finalize();
    tracing::info!(
        path = %path.display(),
        players = dataset.players.len(),
        teams = dataset.teams.len(),
        version = %dataset.version,
        "loaded league dataset"
    );
    Ok(dataset)
}

/// MessagePack, or LZ4-wrapped MessagePack. Not finalized.
pub fn decode_league_bytes(bytes: &[u8]) -> Result<LeagueDataset, DatasetError> {
    if let Ok(dataset) = rmp_serde::from_slice::<LeagueDataset>(bytes) {
        return Ok(dataset);
    }
    let msgpack = decompress_size_prepended(bytes)?;
    Ok(rmp_serde::from_slice(&msgpack)?)
}

pub fn league_path_from_env() -> Result<PathBuf, DatasetError> {
    env::var(LEAGUE_PATH_ENV)
        .ok()
        .map(|path| path.trim().to_string())
        .filter(|path| !path.is_empty())
        .map(PathBuf::from)
        .ok_or(DatasetError::NotConfigured(LEAGUE_PATH_ENV))
}

/// Loads the dataset named by `IG_LEAGUE_PATH`.
pub fn load_league_from_env() -> Result<LeagueDataset, DatasetError> {
    load_league(&league_path_from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::synthetic::SyntheticLeague;
    use lz4_flex::compress_prepend_size;

    #[test]
    fn test_json_and_compressed_msgpack_load_the_same_league() {
        let dataset = SyntheticLeague::new(3).with_players(80).build();
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("league.json");
        std::fs::write(&json_path, serde_json::to_vec(&dataset).unwrap()).unwrap();

        let packed_path = dir.path().join("league.msgpack.lz4");
        let msgpack = rmp_serde::to_vec_named(&dataset).unwrap();
        std::fs::write(&packed_path, compress_prepend_size(&msgpack)).unwrap();

        let raw_path = dir.path().join("league.msgpack");
        std::fs::write(&raw_path, &msgpack).unwrap();

        let from_json = load_league(&json_path).unwrap();
        let from_packed = load_league(&packed_path).unwrap();
        let from_raw = load_league(&raw_path).unwrap();
        assert_eq!(from_json.version, dataset.version);
        assert_eq!(from_packed.version, dataset.version);
        assert_eq!(from_raw.players.len(), dataset.players.len());
        assert_eq!(from_packed.player(5).map(|p| p.teams_played.clone()), dataset.player(5).map(|p| p.teams_played.clone()));
    }

    #[test]
    fn test_garbage_is_an_error() {
        let err = decode_league_bytes(b"\x05\x00\x00\x00\xff\xff").unwrap_err();
        assert!(matches!(err, DatasetError::Decompress(_) | DatasetError::MsgPackDecode(_)), "{err}");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_league(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
