//! One pass of header selection: seed, opposite axis, remaining slots.

use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;

use super::candidates::{draw_order, may_intersect, Candidate, CandidatePools};
use super::config::GeneratorConfig;
use super::layout::{Axis, Layout, SlotKind};
use super::ProgressTracker;
use crate::achievements::ExclusionGroup;
use crate::constraint::Constraint;
use crate::context::LeagueContext;
use crate::eligibility::EligibilityIndex;
use crate::error::GenerationError;
use crate::grid::GRID_SIZE;
use crate::seed::weighted_choice;

pub(crate) type Headers = ([Constraint; GRID_SIZE], [Constraint; GRID_SIZE]);

/// Headers placed so far in one attempt.
#[derive(Default)]
struct Draft {
    rows: [Option<Constraint>; GRID_SIZE],
    cols: [Option<Constraint>; GRID_SIZE],
    groups: Vec<ExclusionGroup>,
}

impl Draft {
    fn place(&mut self, axis: Axis, pos: usize, candidate: &Candidate) {
        let slots = match axis {
            Axis::Rows => &mut self.rows,
            Axis::Cols => &mut self.cols,
        };
        slots[pos] = Some(candidate.constraint.clone());
        self.groups.extend(candidate.group);
    }

    fn axis(&self, axis: Axis) -> Vec<Constraint> {
        let slots = match axis {
            Axis::Rows => &self.rows,
            Axis::Cols => &self.cols,
        };
        slots.iter().flatten().cloned().collect()
    }

    fn admits(&self, candidate: &Candidate) -> bool {
        let header = &candidate.constraint;
        let used = self.rows.iter().chain(self.cols.iter()).flatten().any(|h| h == header);
        let conflict = candidate.group.is_some_and(|g| self.groups.iter().any(|used| used.conflicts_with(&g)));
        !used && !conflict
    }

    fn finish(self) -> Option<Headers> {
        let [r0, r1, r2] = self.rows;
        let [c0, c1, c2] = self.cols;
        Some(([r0?, r1?, r2?], [c0?, c1?, c2?]))
    }
}

pub(crate) struct Attempt<'r, 'd> {
    pub ctx: &'r LeagueContext<'d>,
    pub index: &'r EligibilityIndex,
    pub pools: &'r CandidatePools,
    pub config: &'r GeneratorConfig,
    /// Draws allowed per slot in this attempt.
    pub budget: usize,
}

impl Attempt<'_, '_> {
    pub(crate) fn run(
        &self,
        rng: &mut ChaCha8Rng,
        layout: Layout,
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<Headers, GenerationError> {
        let mut row_kinds = layout.slots(Axis::Rows);
        let mut col_kinds = layout.slots(Axis::Cols);
        row_kinds.shuffle(rng);
        col_kinds.shuffle(rng);
        let kinds = |axis: Axis| match axis {
            Axis::Rows => row_kinds,
            Axis::Cols => col_kinds,
        };

        let mut draft = Draft::default();
        let (seed_axis, seed_pos, seed) = self.pick_seed(rng, layout, &kinds(Axis::Rows), &kinds(Axis::Cols))?;
        draft.place(seed_axis, seed_pos, seed);

        let opposite = seed_axis.opposite();
        let anchors = [seed.constraint.clone()];
        for (pos, kind) in kinds(opposite).into_iter().enumerate() {
            let chosen = self
                .fill_slot(rng, &draft, kind, &anchors, tracker)
                .ok_or_else(|| no_candidate(opposite, pos, kind, self.budget))?;
            draft.place(opposite, pos, chosen);
        }

        let anchors = draft.axis(opposite);
        for (pos, kind) in kinds(seed_axis).into_iter().enumerate() {
            if pos == seed_pos {
                continue;
            }
            let chosen = self
                .fill_slot(rng, &draft, kind, &anchors, tracker)
                .ok_or_else(|| no_candidate(seed_axis, pos, kind, self.budget))?;
            draft.place(seed_axis, pos, chosen);
        }

        draft.finish().ok_or_else(|| GenerationError::InfeasibleLayout {
            reason: "no candidate: grid left with an open slot".to_string(),
        })
    }

    /// Anchor header. Achievement layouts anchor on an achievement, biased
    /// toward season-aligned ones on rich datasets; `AllTeams` anchors on a team.
    fn pick_seed<'p>(
        &'p self,
        rng: &mut ChaCha8Rng,
        layout: Layout,
        row_kinds: &[SlotKind; GRID_SIZE],
        col_kinds: &[SlotKind; GRID_SIZE],
    ) -> Result<(Axis, usize, &'p Candidate), GenerationError> {
        let seed_kind = if layout.achievements_needed() == 0 { SlotKind::Team } else { SlotKind::Achievement };
        let axes: Vec<Axis> = [Axis::Rows, Axis::Cols]
            .into_iter()
            .filter(|axis| {
                let kinds = if *axis == Axis::Rows { row_kinds } else { col_kinds };
                kinds.contains(&seed_kind)
            })
            .collect();
        let axis = *axes.choose(rng).ok_or_else(|| infeasible("layout has no slot for the seed header"))?;
        let kinds = if axis == Axis::Rows { row_kinds } else { col_kinds };
        let positions: Vec<usize> = (0..GRID_SIZE).filter(|&pos| kinds[pos] == seed_kind).collect();
        let pos = *positions.choose(rng).ok_or_else(|| infeasible("layout has no slot for the seed header"))?;

        let mut pool: Vec<&Candidate> = self.pools.of_kind(seed_kind).iter().collect();
        if seed_kind == SlotKind::Achievement && self.is_rich() {
            let season = self.pools.season_aligned();
            if !season.is_empty() && rng.gen_bool(self.config.season_seed_bias) {
                pool = season;
            }
        }
        let weights: Vec<f64> = pool.iter().map(|c| c.weight).collect();
        let seed = weighted_choice(rng, &weights)
            .and_then(|i| pool.get(i).copied())
            .ok_or_else(|| infeasible("no seed candidate available"))?;
        Ok((axis, pos, seed))
    }

    /// First drawn candidate of `kind` that shares a player with every anchor.
    fn fill_slot<'p>(
        &'p self,
        rng: &mut ChaCha8Rng,
        draft: &Draft,
        kind: SlotKind,
        anchors: &[Constraint],
        tracker: &mut ProgressTracker<'_>,
    ) -> Option<&'p Candidate> {
        let pool = self.pools.of_kind(kind);
        let weights: Vec<f64> = pool.iter().map(|c| c.weight).collect();
        let overlap = self.ctx.dataset.overlap.as_ref();

        for i in draw_order(rng, &weights, self.budget) {
            let candidate = &pool[i];
            if !draft.admits(candidate) {
                continue;
            }
            if !anchors.iter().all(|anchor| may_intersect(overlap, anchor, &candidate.constraint)) {
                continue;
            }
            tracker.tick();
            if anchors.iter().all(|anchor| self.index.count(self.ctx, anchor, &candidate.constraint) > 0) {
                return Some(candidate);
            }
        }
        None
    }

    fn is_rich(&self) -> bool {
        self.ctx.dataset.season_index.is_some() && self.ctx.dataset.players.len() >= self.config.rich_dataset_players
    }
}

fn infeasible(reason: &str) -> GenerationError {
    GenerationError::InfeasibleLayout { reason: reason.to_string() }
}

fn no_candidate(axis: Axis, pos: usize, kind: SlotKind, budget: usize) -> GenerationError {
    let axis = match axis {
        Axis::Rows => "row",
        Axis::Cols => "column",
    };
    let kind = match kind {
        SlotKind::Team => "team",
        SlotKind::Achievement => "achievement",
    };
    GenerationError::InfeasibleLayout {
        reason: format!("no candidate: {axis} {pos} ({kind}) after {budget} draws"),
    }
}
