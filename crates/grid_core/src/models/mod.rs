//! Canonical league data consumed by the grid core.
//!
//! Raw league exports are normalized elsewhere; everything here is already in
//! the shape the eligibility index and generator expect.

pub mod dataset;
pub mod player;
pub mod team;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use dataset::{DatasetVersion, LeagueDataset, Sport};
pub use player::{Award, AwardKind, DraftInfo, Player, SeasonLine, StatField};
pub use team::Team;

pub type PlayerId = u32;
pub type TeamId = u32;
pub type Season = u16;

/// Stable identifier of an achievement in a catalog (e.g. `"mvp"`, `"career_pts_20000"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementId(String);

impl AchievementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AchievementId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
