use fxhash::FxHashMap;
use serde::Serialize;

use crate::constraint::Constraint;
use crate::context::LeagueContext;
use crate::eligibility::{EligibilityIndex, PlayerSet};
use crate::error::{GenerationError, GuessError};
use crate::generator::layout::{Axis, Layout};
use crate::models::{DatasetVersion, LeagueDataset, Player, PlayerId};
use crate::rarity;

pub const GRID_SIZE: usize = 3;

/// A committed puzzle: six distinct headers and the answers for each cell.
///
/// Only [`Grid::assemble`] builds one, so every `Grid` in circulation has
/// nine non-empty cells and no player who is the sole answer to two cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    seed: String,
    layout: Layout,
    rows: [Constraint; GRID_SIZE],
    cols: [Constraint; GRID_SIZE],
    cells: [[PlayerSet; GRID_SIZE]; GRID_SIZE],
    version: DatasetVersion,
}

impl Grid {
    /// Computes all nine cells and enforces the grid invariants.
    pub fn assemble(
        ctx: &LeagueContext<'_>,
        index: &EligibilityIndex,
        seed: impl Into<String>,
        layout: Layout,
        rows: [Constraint; GRID_SIZE],
        cols: [Constraint; GRID_SIZE],
    ) -> Result<Grid, GenerationError> {
        let headers: Vec<&Constraint> = rows.iter().chain(cols.iter()).collect();
        for (i, a) in headers.iter().enumerate() {
            if headers[i + 1..].contains(a) {
                return Err(GenerationError::InfeasibleLayout {
                    reason: format!("duplicate header: {} appears twice", ctx.label(a)),
                });
            }
        }

        let mut cells: [[PlayerSet; GRID_SIZE]; GRID_SIZE] = Default::default();
        for (r, row) in rows.iter().enumerate() {
            for (c, col) in cols.iter().enumerate() {
                let set = index.intersect(ctx, row, col);
                if set.is_empty() {
                    return Err(GenerationError::InfeasibleLayout {
                        reason: format!("empty cell: ({r}, {c}) {} x {}", ctx.label(row), ctx.label(col)),
                    });
                }
                cells[r][c] = set;
            }
        }

        check_solvable(&cells)?;

        Ok(Grid { seed: seed.into(), layout, rows, cols, cells, version: ctx.version() })
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn rows(&self) -> &[Constraint; GRID_SIZE] {
        &self.rows
    }

    pub fn cols(&self) -> &[Constraint; GRID_SIZE] {
        &self.cols
    }

    pub fn headers(&self, axis: Axis) -> &[Constraint; GRID_SIZE] {
        match axis {
            Axis::Rows => &self.rows,
            Axis::Cols => &self.cols,
        }
    }

    pub fn version(&self) -> DatasetVersion {
        self.version
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&PlayerSet> {
        self.cells.get(row).and_then(|cells| cells.get(col))
    }

    pub fn candidate_counts(&self) -> [[usize; GRID_SIZE]; GRID_SIZE] {
        let mut counts = [[0; GRID_SIZE]; GRID_SIZE];
        for (r, row) in self.cells.iter().enumerate() {
            for (c, set) in row.iter().enumerate() {
                counts[r][c] = set.len();
            }
        }
        counts
    }

    /// Whether `player_id` answers cell `(row, col)`. Out-of-range cells are never correct.
    pub fn check_guess(&self, row: usize, col: usize, player_id: PlayerId) -> bool {
        self.cell(row, col).is_some_and(|set| set.contains(&player_id))
    }

    /// Rarity score in `10..=100` for a correct guess.
    pub fn score_guess(
        &self,
        dataset: &LeagueDataset,
        row: usize,
        col: usize,
        player_id: PlayerId,
    ) -> Result<u8, GuessError> {
        let cell = self.cell(row, col).ok_or(GuessError::CellOutOfRange { row, col })?;
        if dataset.player(player_id).is_none() {
            return Err(GuessError::UnknownPlayer(player_id));
        }
        let pool: Vec<&Player> = cell.iter().filter_map(|id| dataset.player(*id)).collect();
        rarity::score(player_id, &pool, &self.seed).ok_or(GuessError::NotEligible { player_id, row, col })
    }
}

/// Fails when one player is the only answer to two or more cells: answering
/// one of them would make the others impossible.
fn check_solvable(cells: &[[PlayerSet; GRID_SIZE]; GRID_SIZE]) -> Result<(), GenerationError> {
    let mut forced: FxHashMap<PlayerId, Vec<(usize, usize)>> = FxHashMap::default();
    for (r, row) in cells.iter().enumerate() {
        for (c, set) in row.iter().enumerate() {
            if set.len() == 1 {
                if let Some(&only) = set.iter().next() {
                    forced.entry(only).or_default().push((r, c));
                }
            }
        }
    }
    match forced.into_iter().filter(|(_, cells)| cells.len() > 1).min_by_key(|(id, _)| *id) {
        Some((player_id, cells)) => Err(GenerationError::Unsolvable { player_id, cells }),
        None => Ok(()),
    }
}
