//! League data sources: cache files on disk and synthetic leagues.

pub mod league_cache;
pub mod synthetic;

pub use league_cache::{decode_league_bytes, league_path_from_env, load_league, load_league_from_env, LEAGUE_PATH_ENV};
pub use synthetic::SyntheticLeague;
