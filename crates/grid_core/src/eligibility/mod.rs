//! Eligibility index: which players satisfy two headers at once.
//!
//! ## Query paths
//!
//! | Pair | Strategy |
//! |------|----------|
//! | Team × Team | intersect flat sets, iterating the smaller |
//! | Team × Achievement | intersect flat sets, iterating the smaller |
//! | Team × Season achievement | scan the team's players, aligned to that team, memoized |
//! | Achievement × Achievement | scan, both predicates independently, memoized |
//!
//! Flat sets are built lazily once per [`DatasetVersion`] and never mutated
//! afterwards, so one index can serve concurrent callers over the same
//! dataset. The scan path goes through a short-TTL pair memo.
//!
//! A season-specific query against a dataset without a season index has no
//! eligible players.

mod memo;
mod tables;

use fxhash::{FxHashMap, FxHashSet};
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::constraint::Constraint;
use crate::context::LeagueContext;
use crate::models::{DatasetVersion, Player, PlayerId};
use memo::{PairKey, PairMemo};
use tables::LookupTables;

pub type PlayerSet = FxHashSet<PlayerId>;

pub const DEFAULT_MEMO_TTL: Duration = Duration::from_secs(30);

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub table_builds: u64,
    pub scans: u64,
    pub memo_hits: u64,
}

/// Caches are keyed by [`DatasetVersion`] alone, so one index must only ever
/// be queried with one achievement catalog. Use a separate index (or
/// [`clear`](Self::clear) it) when switching catalogs.
pub struct EligibilityIndex {
    tables: Mutex<FxHashMap<DatasetVersion, Arc<OnceCell<LookupTables>>>>,
    memo: Mutex<PairMemo>,
    table_builds: AtomicU64,
    scans: AtomicU64,
    memo_hits: AtomicU64,
}

impl Default for EligibilityIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl EligibilityIndex {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_MEMO_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            tables: Mutex::new(FxHashMap::default()),
            memo: Mutex::new(PairMemo::new(ttl)),
            table_builds: AtomicU64::new(0),
            scans: AtomicU64::new(0),
            memo_hits: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            table_builds: self.table_builds.load(Ordering::Relaxed),
            scans: self.scans.load(Ordering::Relaxed),
            memo_hits: self.memo_hits.load(Ordering::Relaxed),
        }
    }

    /// Drops every cache entry belonging to `version`.
    pub fn invalidate(&self, version: DatasetVersion) {
        lock(&self.tables).remove(&version);
        lock(&self.memo).drop_version(version);
    }

    pub fn clear(&self) {
        lock(&self.tables).clear();
        lock(&self.memo).clear();
    }

    /// Players satisfying a single header.
    pub fn eligible(&self, ctx: &LeagueContext<'_>, constraint: &Constraint) -> PlayerSet {
        self.intersect(ctx, constraint, constraint)
    }

    /// Exact set of players satisfying both headers. Symmetric in `a`/`b`.
    pub fn intersect(&self, ctx: &LeagueContext<'_>, a: &Constraint, b: &Constraint) -> PlayerSet {
        if !season_index_available(ctx, a, b) {
            return PlayerSet::default();
        }
        let cell = self.table_cell(ctx.version());
        let tables = self.tables_for(&cell, ctx);

        if let Some((small, large)) = flat_pair(tables, a, b) {
            return small.iter().filter(|id| large.contains(id)).copied().collect();
        }

        let key = PairKey::new(ctx.version(), a, b);
        let now = Instant::now();
        if let Some(set) = lock(&self.memo).get_set(&key, now) {
            self.memo_hits.fetch_add(1, Ordering::Relaxed);
            return (*set).clone();
        }

        let set: PlayerSet = self.scan(ctx, tables, a, b).map(|player| player.id).collect();
        lock(&self.memo).put_set(key, Arc::new(set.clone()), now);
        set
    }

    /// Cardinality of [`intersect`](Self::intersect) without building the set.
    pub fn count(&self, ctx: &LeagueContext<'_>, a: &Constraint, b: &Constraint) -> usize {
        if !season_index_available(ctx, a, b) {
            return 0;
        }
        let cell = self.table_cell(ctx.version());
        let tables = self.tables_for(&cell, ctx);

        if let Some((small, large)) = flat_pair(tables, a, b) {
            return small.iter().filter(|id| large.contains(id)).count();
        }

        let key = PairKey::new(ctx.version(), a, b);
        let now = Instant::now();
        if let Some(count) = lock(&self.memo).get_count(&key, now) {
            self.memo_hits.fetch_add(1, Ordering::Relaxed);
            return count;
        }

        let count = self.scan(ctx, tables, a, b).count();
        lock(&self.memo).put_count(key, count, now);
        count
    }

    /// Whether at least `min` players satisfy the header on its own.
    pub fn has_at_least(&self, ctx: &LeagueContext<'_>, constraint: &Constraint, min: usize) -> bool {
        self.count(ctx, constraint, constraint) >= min
    }

    fn table_cell(&self, version: DatasetVersion) -> Arc<OnceCell<LookupTables>> {
        Arc::clone(lock(&self.tables).entry(version).or_default())
    }

    fn tables_for<'t>(&self, cell: &'t OnceCell<LookupTables>, ctx: &LeagueContext<'_>) -> &'t LookupTables {
        cell.get_or_init(|| {
            self.table_builds.fetch_add(1, Ordering::Relaxed);
            LookupTables::build(ctx)
        })
    }

    /// Per-player evaluation over the narrowest candidate pool available.
    fn scan<'c>(
        &self,
        ctx: &'c LeagueContext<'_>,
        tables: &'c LookupTables,
        a: &'c Constraint,
        b: &'c Constraint,
    ) -> Box<dyn Iterator<Item = &'c Player> + 'c> {
        self.scans.fetch_add(1, Ordering::Relaxed);
        let pool = [a, b]
            .into_iter()
            .filter_map(|c| flat_set(tables, c))
            .min_by_key(|set| set.len());

        let matches = move |player: &&'c Player| pair_holds(ctx, player, a, b);
        match pool {
            Some(ids) => Box::new(ids.iter().filter_map(move |id| ctx.dataset.player(*id)).filter(matches)),
            None => Box::new(ctx.dataset.players.iter().filter(matches)),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding a cache lock leaves only a partially filled cache.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn season_index_available(ctx: &LeagueContext<'_>, a: &Constraint, b: &Constraint) -> bool {
    ctx.dataset.season_index.is_some() || !(a.is_season_specific() || b.is_season_specific())
}

fn flat_set<'t>(tables: &'t LookupTables, constraint: &Constraint) -> Option<&'t PlayerSet> {
    match constraint {
        Constraint::Team { team_id } => Some(tables.team(*team_id).unwrap_or(empty_set())),
        Constraint::Achievement { season_specific: true, .. } => None,
        Constraint::Achievement { id, .. } => tables.achievement(id),
    }
}

/// Both sides as flat sets, smaller first, when the pair qualifies for plain
/// intersection (team × team, team × non-season achievement, or a constraint
/// with itself).
fn flat_pair<'t>(
    tables: &'t LookupTables,
    a: &Constraint,
    b: &Constraint,
) -> Option<(&'t PlayerSet, &'t PlayerSet)> {
    if !(a.is_team() || b.is_team() || a == b) {
        return None;
    }
    let (x, y) = (flat_set(tables, a)?, flat_set(tables, b)?);
    Some(if x.len() <= y.len() { (x, y) } else { (y, x) })
}

fn empty_set() -> &'static PlayerSet {
    static EMPTY: OnceCell<PlayerSet> = OnceCell::new();
    EMPTY.get_or_init(PlayerSet::default)
}

fn pair_holds(ctx: &LeagueContext<'_>, player: &Player, a: &Constraint, b: &Constraint) -> bool {
    let index = ctx.dataset.season_index.as_ref();
    match (a, b) {
        (Constraint::Team { team_id }, Constraint::Achievement { id, season_specific: true })
        | (Constraint::Achievement { id, season_specific: true }, Constraint::Team { team_id }) => {
            player.played_for(*team_id)
                && ctx.catalog.meets_achievement(player, id, index, None, Some(*team_id), None)
        }
        _ => single_holds(ctx, player, a) && (a == b || single_holds(ctx, player, b)),
    }
}

fn single_holds(ctx: &LeagueContext<'_>, player: &Player, constraint: &Constraint) -> bool {
    match constraint {
        Constraint::Team { team_id } => player.played_for(*team_id),
        Constraint::Achievement { id, season_specific: false } => player.flag(id).unwrap_or_else(|| {
            ctx.catalog.meets_achievement(player, id, None, None, None, None)
        }),
        Constraint::Achievement { id, season_specific: true } => ctx.catalog.meets_achievement(
            player,
            id,
            ctx.dataset.season_index.as_ref(),
            None,
            None,
            None,
        ),
    }
}
