use serde::{Deserialize, Serialize};

/// Whether a header slot holds a team or an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Team,
    Achievement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Rows,
    Cols,
}

impl Axis {
    pub fn opposite(&self) -> Axis {
        match self {
            Axis::Rows => Axis::Cols,
            Axis::Cols => Axis::Rows,
        }
    }
}

/// Row/column shape templates: how many of each axis's 3 slots are achievements.
///
/// An axis never carries more than 2 achievements, and the achievement-heavy
/// templates always pair with an all-team axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// 2 teams + 1 achievement on each axis
    Balanced,
    /// rows 1T+2A, cols 2T+1A
    MixedRows,
    /// rows 2T+1A, cols 1T+2A
    MixedColumns,
    /// rows 1T+2A, cols 3T
    RowHeavy,
    /// rows 3T, cols 1T+2A
    ColumnHeavy,
    /// 3 teams on each axis; only for leagues without usable achievements
    AllTeams,
}

impl Layout {
    pub fn all() -> &'static [Layout] {
        &[
            Layout::Balanced,
            Layout::MixedRows,
            Layout::MixedColumns,
            Layout::RowHeavy,
            Layout::ColumnHeavy,
            Layout::AllTeams,
        ]
    }

    pub fn achievements_on(&self, axis: Axis) -> usize {
        match (self, axis) {
            (Layout::Balanced, _) => 1,
            (Layout::MixedRows, Axis::Rows) => 2,
            (Layout::MixedRows, Axis::Cols) => 1,
            (Layout::MixedColumns, Axis::Rows) => 1,
            (Layout::MixedColumns, Axis::Cols) => 2,
            (Layout::RowHeavy, Axis::Rows) => 2,
            (Layout::RowHeavy, Axis::Cols) => 0,
            (Layout::ColumnHeavy, Axis::Rows) => 0,
            (Layout::ColumnHeavy, Axis::Cols) => 2,
            (Layout::AllTeams, _) => 0,
        }
    }

    /// Slot kinds for one axis, teams first. The generator shuffles positions.
    pub fn slots(&self, axis: Axis) -> [SlotKind; 3] {
        let achievements = self.achievements_on(axis);
        let mut slots = [SlotKind::Team; 3];
        for slot in slots.iter_mut().skip(3 - achievements) {
            *slot = SlotKind::Achievement;
        }
        slots
    }

    pub fn teams_needed(&self) -> usize {
        6 - self.achievements_on(Axis::Rows) - self.achievements_on(Axis::Cols)
    }

    pub fn achievements_needed(&self) -> usize {
        self.achievements_on(Axis::Rows) + self.achievements_on(Axis::Cols)
    }

    /// Template with the given achievement count per axis.
    pub fn from_counts(row_achievements: usize, col_achievements: usize) -> Option<Self> {
        Layout::all().iter().copied().find(|layout| {
            layout.achievements_on(Axis::Rows) == row_achievements
                && layout.achievements_on(Axis::Cols) == col_achievements
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Layout::Balanced => "balanced",
            Layout::MixedRows => "mixed_rows",
            Layout::MixedColumns => "mixed_columns",
            Layout::RowHeavy => "row_heavy",
            Layout::ColumnHeavy => "column_heavy",
            Layout::AllTeams => "all_teams",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Layout::all().iter().copied().find(|layout| layout.name() == s.trim().to_lowercase())
    }
}
