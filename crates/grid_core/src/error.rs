use thiserror::Error;

use crate::models::PlayerId;

/// Failures while building a grid.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// One layout/seed combination could not be completed.
    #[error("Infeasible layout: {reason}")]
    InfeasibleLayout { reason: String },

    /// A complete grid forces one player into several cells.
    #[error("Unsolvable grid: player {player_id} is the only answer for cells {cells:?}")]
    Unsolvable { player_id: PlayerId, cells: Vec<(usize, usize)> },

    /// Every attempt failed.
    #[error("No feasible grid after {attempts} attempts: {reason}")]
    Exhausted { attempts: u32, reason: String },

    #[error("Invalid seed '{0}': use 1-64 characters from [A-Za-z0-9_-]")]
    InvalidSeed(String),

    #[error("Invalid generator config: {0}")]
    InvalidConfig(String),
}

impl GenerationError {
    /// Recoverable errors are retried inside the generation loop.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GenerationError::InfeasibleLayout { .. } => true,
            GenerationError::Unsolvable { .. } => true,
            GenerationError::Exhausted { .. } => false,
            GenerationError::InvalidSeed(_) => false,
            GenerationError::InvalidConfig(_) => false,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GenerationError::InfeasibleLayout { .. } => "E_INFEASIBLE_LAYOUT",
            GenerationError::Unsolvable { .. } => "E_UNSOLVABLE",
            GenerationError::Exhausted { .. } => "E_GENERATION_EXHAUSTED",
            GenerationError::InvalidSeed(_) => "E_INVALID_SEED",
            GenerationError::InvalidConfig(_) => "E_INVALID_CONFIG",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuessError {
    #[error("Cell ({row}, {col}) is outside the 3x3 grid")]
    CellOutOfRange { row: usize, col: usize },

    #[error("Player {player_id} does not satisfy cell ({row}, {col})")]
    NotEligible { player_id: PlayerId, row: usize, col: usize },

    #[error("Player {0} is not in the dataset")]
    UnknownPlayer(PlayerId),
}

impl GuessError {
    pub fn code(&self) -> &'static str {
        match self {
            GuessError::CellOutOfRange { .. } => "E_CELL_OUT_OF_RANGE",
            GuessError::NotEligible { .. } => "E_NOT_ELIGIBLE",
            GuessError::UnknownPlayer(_) => "E_UNKNOWN_PLAYER",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareCodeError {
    #[error("Malformed share code: {0}")]
    Malformed(String),

    #[error("Unsupported share code version: {0}")]
    UnsupportedVersion(String),

    #[error("Unknown team in share code: {0}")]
    UnknownTeam(u32),

    #[error("Unknown achievement in share code: {0}")]
    UnknownAchievement(String),
}

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("MessagePack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    #[error("LZ4 decompress error: {0}")]
    Decompress(#[from] lz4_flex::block::DecompressError),

    #[error("No league dataset configured (set {0})")]
    NotConfigured(&'static str),
}

/// Umbrella error for host-facing entry points.
#[derive(Error, Debug)]
pub enum GridError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Guess(#[from] GuessError),

    #[error(transparent)]
    ShareCode(#[from] ShareCodeError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

impl GridError {
    pub fn code(&self) -> &'static str {
        match self {
            GridError::Generation(e) => e.code(),
            GridError::Guess(e) => e.code(),
            GridError::ShareCode(_) => "E_SHARE_CODE",
            GridError::Dataset(_) => "E_DATASET",
        }
    }
}

pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverability() {
        assert!(GenerationError::InfeasibleLayout { reason: "x".into() }.is_recoverable());
        assert!(GenerationError::Unsolvable { player_id: 1, cells: vec![(0, 0), (1, 1)] }.is_recoverable());
        assert!(!GenerationError::Exhausted { attempts: 3, reason: "x".into() }.is_recoverable());
    }

    #[test]
    fn test_umbrella_codes() {
        let err: GridError = GuessError::UnknownPlayer(4).into();
        assert_eq!(err.code(), "E_UNKNOWN_PLAYER");
        assert_eq!(err.to_string(), "Player 4 is not in the dataset");
    }
}
