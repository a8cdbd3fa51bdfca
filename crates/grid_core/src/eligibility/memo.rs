use fxhash::FxHashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::PlayerSet;
use crate::constraint::Constraint;
use crate::models::DatasetVersion;

/// Entries beyond this trigger a purge of expired entries before inserting.
const PURGE_THRESHOLD: usize = 4096;

/// `(dataset, lower constraint, higher constraint)`; both argument orders of a
/// pair share one key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PairKey {
    version: DatasetVersion,
    first: Constraint,
    second: Constraint,
}

impl PairKey {
    pub(crate) fn new(version: DatasetVersion, a: &Constraint, b: &Constraint) -> Self {
        let (first, second) = if a <= b { (a.clone(), b.clone()) } else { (b.clone(), a.clone()) };
        Self { version, first, second }
    }
}

/// Short-lived memo for the per-player evaluation path.
///
/// The generator re-asks the same pairs many times while it explores
/// candidates; entries expire after `ttl`.
#[derive(Debug)]
pub(crate) struct PairMemo {
    ttl: Duration,
    sets: FxHashMap<PairKey, (Instant, Arc<PlayerSet>)>,
    counts: FxHashMap<PairKey, (Instant, usize)>,
}

impl PairMemo {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self { ttl, sets: FxHashMap::default(), counts: FxHashMap::default() }
    }

    fn fresh(&self, stored: Instant, now: Instant) -> bool {
        now.saturating_duration_since(stored) < self.ttl
    }

    pub(crate) fn get_set(&self, key: &PairKey, now: Instant) -> Option<Arc<PlayerSet>> {
        self.sets
            .get(key)
            .filter(|(stored, _)| self.fresh(*stored, now))
            .map(|(_, set)| Arc::clone(set))
    }

    pub(crate) fn get_count(&self, key: &PairKey, now: Instant) -> Option<usize> {
        if let Some(set) = self.get_set(key, now) {
            return Some(set.len());
        }
        self.counts.get(key).filter(|(stored, _)| self.fresh(*stored, now)).map(|(_, n)| *n)
    }

    pub(crate) fn put_set(&mut self, key: PairKey, set: Arc<PlayerSet>, now: Instant) {
        if self.sets.len() >= PURGE_THRESHOLD {
            self.purge_expired(now);
        }
        self.sets.insert(key, (now, set));
    }

    pub(crate) fn put_count(&mut self, key: PairKey, count: usize, now: Instant) {
        if self.counts.len() >= PURGE_THRESHOLD {
            self.purge_expired(now);
        }
        self.counts.insert(key, (now, count));
    }

    pub(crate) fn purge_expired(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.sets.retain(|_, (stored, _)| now.saturating_duration_since(*stored) < ttl);
        self.counts.retain(|_, (stored, _)| now.saturating_duration_since(*stored) < ttl);
    }

    pub(crate) fn drop_version(&mut self, version: DatasetVersion) {
        self.sets.retain(|key, _| key.version != version);
        self.counts.retain(|key, _| key.version != version);
    }

    pub(crate) fn clear(&mut self) {
        self.sets.clear();
        self.counts.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.sets.len() + self.counts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(version: u64) -> PairKey {
        PairKey::new(DatasetVersion(version), &Constraint::achievement("mvp", false), &Constraint::team(3))
    }

    #[test]
    fn test_key_is_order_insensitive() {
        let a = Constraint::team(1);
        let b = Constraint::achievement("x", true);
        assert_eq!(PairKey::new(DatasetVersion(1), &a, &b), PairKey::new(DatasetVersion(1), &b, &a));
        assert_ne!(PairKey::new(DatasetVersion(1), &a, &b), PairKey::new(DatasetVersion(2), &a, &b));
    }

    #[test]
    fn test_entries_expire() {
        let mut memo = PairMemo::new(Duration::from_secs(5));
        let now = Instant::now();
        memo.put_set(key(1), Arc::new([1, 2].into_iter().collect()), now);

        assert_eq!(memo.get_count(&key(1), now + Duration::from_secs(1)), Some(2));
        assert!(memo.get_set(&key(1), now + Duration::from_secs(6)).is_none());

        memo.purge_expired(now + Duration::from_secs(6));
        assert_eq!(memo.len(), 0);
    }

    #[test]
    fn test_drop_version_only_touches_that_dataset() {
        let mut memo = PairMemo::new(Duration::from_secs(60));
        let now = Instant::now();
        memo.put_count(key(1), 3, now);
        memo.put_count(key(2), 4, now);
        memo.drop_version(DatasetVersion(1));
        assert_eq!(memo.get_count(&key(1), now), None);
        assert_eq!(memo.get_count(&key(2), now), Some(4));
    }
}
