/// Bounded tab-context cache with least-recently-written eviction
use crate::context::{TabContext, TabId};
use log::debug;
use lru::LruCache;
use std::num::NonZeroUsize;

pub const CACHE_CAPACITY: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Stored { evicted: Option<TabId> },
    /// The cache already holds a newer detection for the tab
    Stale { cached_sequence: u64 },
}

pub struct TabContextCache {
    entries: LruCache<TabId, TabContext>,
}

impl TabContextCache {
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        TabContextCache {
            entries: LruCache::new(capacity),
        }
    }

    /// Rebuild from a snapshot ordered oldest write first
    pub fn restore(contexts: Vec<TabContext>) -> Self {
        let mut cache = Self::new();
        for context in contexts {
            cache.write(context);
        }
        cache
    }

    /// Read without affecting eviction order
    pub fn get(&self, tab_id: TabId) -> Option<&TabContext> {
        self.entries.peek(&tab_id)
    }

    pub fn sequence(&self, tab_id: TabId) -> Option<u64> {
        self.get(tab_id).map(|context| context.sequence)
    }

    /// Store a context unless a newer sequence is cached for the tab
    pub fn write(&mut self, context: TabContext) -> WriteOutcome {
        let tab_id = context.tab_id;
        if let Some(cached_sequence) = self.sequence(tab_id) {
            if cached_sequence > context.sequence {
                debug!(
                    "tab {}: dropping sequence {} behind cached {}",
                    tab_id, context.sequence, cached_sequence
                );
                return WriteOutcome::Stale { cached_sequence };
            }
        }

        let evicted = self
            .entries
            .push(tab_id, context)
            .map(|(old_tab, _)| old_tab)
            .filter(|old_tab| *old_tab != tab_id);
        if let Some(evicted) = evicted {
            debug!("tab {}: evicted from context cache", evicted);
        }
        WriteOutcome::Stored { evicted }
    }

    pub fn remove(&mut self, tab_id: TabId) -> Option<TabContext> {
        self.entries.pop(&tab_id)
    }

    pub fn contains(&self, tab_id: TabId) -> bool {
        self.entries.contains(&tab_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Contexts ordered oldest write first, suitable for `restore`
    pub fn snapshot(&self) -> Vec<TabContext> {
        self.entries.iter().rev().map(|(_, context)| context.clone()).collect()
    }
}

impl Default for TabContextCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(tab_id: TabId, sequence: u64) -> TabContext {
        TabContext::empty(tab_id, format!("https://acme.domo.com/page/{}", tab_id), sequence, 0.0)
    }

    #[test]
    fn test_capacity_and_eviction_order() {
        let mut cache = TabContextCache::new();
        for tab in 1..=CACHE_CAPACITY as TabId {
            assert_eq!(cache.write(context(tab, 1)), WriteOutcome::Stored { evicted: None });
        }

        assert_eq!(cache.write(context(11, 1)), WriteOutcome::Stored { evicted: Some(1) });
        assert_eq!(cache.len(), CACHE_CAPACITY);
        assert!(!cache.contains(1));
        assert!((2..=11).all(|tab| cache.contains(tab)));
    }

    #[test]
    fn test_reads_do_not_refresh_entries() {
        let mut cache = TabContextCache::with_capacity(2);
        cache.write(context(1, 1));
        cache.write(context(2, 1));
        assert!(cache.get(1).is_some());

        cache.write(context(3, 1));
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
    }

    #[test]
    fn test_rewrite_refreshes_entry() {
        let mut cache = TabContextCache::with_capacity(2);
        cache.write(context(1, 1));
        cache.write(context(2, 1));
        assert_eq!(cache.write(context(1, 2)), WriteOutcome::Stored { evicted: None });

        cache.write(context(3, 1));
        assert!(cache.contains(1));
        assert!(!cache.contains(2));
    }

    #[test]
    fn test_stale_sequence_rejected() {
        let mut cache = TabContextCache::new();
        cache.write(context(1, 5));

        assert_eq!(cache.write(context(1, 4)), WriteOutcome::Stale { cached_sequence: 5 });
        assert_eq!(cache.sequence(1), Some(5));
        assert_eq!(cache.write(context(1, 5)), WriteOutcome::Stored { evicted: None });
    }

    #[test]
    fn test_snapshot_restore_preserves_order() {
        let mut cache = TabContextCache::new();
        for tab in [3, 1, 2] {
            cache.write(context(tab, 1));
        }

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.iter().map(|c| c.tab_id).collect::<Vec<_>>(), vec![3, 1, 2]);

        let restored = TabContextCache::restore(snapshot);
        assert_eq!(restored.snapshot().iter().map(|c| c.tab_id).collect::<Vec<_>>(), vec![3, 1, 2]);
    }

    #[test]
    fn test_remove() {
        let mut cache = TabContextCache::new();
        cache.write(context(1, 1));
        assert!(cache.remove(1).is_some());
        assert!(cache.is_empty());
        assert!(cache.remove(1).is_none());
    }
}
