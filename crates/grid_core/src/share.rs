//! Share codes: a grid's seed and headers as one short string.
//!
//! ```text
//! v1.<seed>.<r0>~<r1>~<r2>.<c0>~<c1>~<c2>
//!
//! t<id>     team
//! a:<id>    achievement
//! s:<id>    season-aligned achievement
//! ```
//!
//! Cells are not encoded. Decoding recomputes them against the current
//! dataset and re-checks every grid invariant.

use std::fmt;
use std::str::FromStr;

use crate::constraint::Constraint;
use crate::context::LeagueContext;
use crate::eligibility::EligibilityIndex;
use crate::error::{GridError, ShareCodeError};
use crate::generator::layout::Layout;
use crate::grid::{Grid, GRID_SIZE};
use crate::seed::is_valid_seed;

pub const SHARE_CODE_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareCode {
    pub seed: String,
    pub rows: [Constraint; GRID_SIZE],
    pub cols: [Constraint; GRID_SIZE],
}

impl ShareCode {
    pub fn from_grid(grid: &Grid) -> Self {
        Self { seed: grid.seed().to_string(), rows: grid.rows().clone(), cols: grid.cols().clone() }
    }

    pub fn parse(code: &str) -> Result<Self, ShareCodeError> {
        let parts: Vec<&str> = code.trim().split('.').collect();
        let [version, seed, rows, cols] = parts.as_slice() else {
            return Err(ShareCodeError::Malformed(format!("expected 4 dot-separated parts, got {}", parts.len())));
        };
        if *version != SHARE_CODE_VERSION {
            return Err(ShareCodeError::UnsupportedVersion(version.to_string()));
        }
        if !is_valid_seed(seed) {
            return Err(ShareCodeError::Malformed(format!("invalid seed '{seed}'")));
        }
        Ok(Self { seed: seed.to_string(), rows: parse_axis(rows)?, cols: parse_axis(cols)? })
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    /// Checks every header against the dataset and catalog in `ctx`.
    pub fn resolve(&self, ctx: &LeagueContext<'_>) -> Result<Layout, ShareCodeError> {
        for header in self.rows.iter().chain(self.cols.iter()) {
            match header {
                Constraint::Team { team_id } => {
                    if ctx.dataset.team(*team_id).is_none() {
                        return Err(ShareCodeError::UnknownTeam(*team_id));
                    }
                }
                Constraint::Achievement { id, season_specific } => {
                    let known = ctx.achievement(id).is_some_and(|a| a.is_season_specific() == *season_specific);
                    if !known {
                        return Err(ShareCodeError::UnknownAchievement(id.to_string()));
                    }
                }
            }
        }
        let count = |axis: &[Constraint; GRID_SIZE]| axis.iter().filter(|h| !h.is_team()).count();
        Layout::from_counts(count(&self.rows), count(&self.cols))
            .ok_or_else(|| ShareCodeError::Malformed("header mix matches no layout".to_string()))
    }
}

impl fmt::Display for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{SHARE_CODE_VERSION}.{}.{}.{}", self.seed, axis_token(&self.rows), axis_token(&self.cols))
    }
}

impl FromStr for ShareCode {
    type Err = ShareCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Grid {
    pub fn share_code(&self) -> String {
        ShareCode::from_grid(self).encode()
    }

    /// Rebuilds a grid from its share code. Fails if the dataset no longer
    /// supports the headers or the rebuilt grid breaks an invariant.
    pub fn from_share_code(
        ctx: &LeagueContext<'_>,
        index: &EligibilityIndex,
        code: &str,
    ) -> Result<Grid, GridError> {
        let share = ShareCode::parse(code)?;
        let layout = share.resolve(ctx)?;
        Ok(Grid::assemble(ctx, index, share.seed, layout, share.rows, share.cols)?)
    }
}

fn header_token(header: &Constraint) -> String {
    match header {
        Constraint::Team { team_id } => format!("t{team_id}"),
        Constraint::Achievement { id, season_specific: true } => format!("s:{id}"),
        Constraint::Achievement { id, season_specific: false } => format!("a:{id}"),
    }
}

fn axis_token(axis: &[Constraint; GRID_SIZE]) -> String {
    axis.iter().map(header_token).collect::<Vec<_>>().join("~")
}

fn parse_header(token: &str) -> Result<Constraint, ShareCodeError> {
    let malformed = || ShareCodeError::Malformed(format!("bad header token '{token}'"));
    if let Some(id) = token.strip_prefix("a:") {
        return valid_id(id).then(|| Constraint::achievement(id, false)).ok_or_else(malformed);
    }
    if let Some(id) = token.strip_prefix("s:") {
        return valid_id(id).then(|| Constraint::achievement(id, true)).ok_or_else(malformed);
    }
    token.strip_prefix('t').and_then(|id| id.parse().ok()).map(Constraint::team).ok_or_else(malformed)
}

fn valid_id(id: &str) -> bool {
    !id.is_empty() && id.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn parse_axis(token: &str) -> Result<[Constraint; GRID_SIZE], ShareCodeError> {
    let headers = token.split('~').map(parse_header).collect::<Result<Vec<_>, _>>()?;
    let count = headers.len();
    <[Constraint; GRID_SIZE]>::try_from(headers)
        .map_err(|_| ShareCodeError::Malformed(format!("expected {GRID_SIZE} headers per axis, got {count}")))
}
