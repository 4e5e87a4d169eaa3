/// Per-tab detection coalescing
///
/// Every trigger bumps the tab's generation; a pending run only proceeds if no
/// newer trigger arrived during its quiet window.
use crate::context::TabId;
use std::collections::HashMap;

pub const COALESCE_WINDOW_MS: u32 = 50;

#[derive(Debug, Default)]
pub struct Coalescer {
    generations: HashMap<TabId, u64>,
    pending: HashMap<TabId, u64>,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger and return its generation
    pub fn trigger(&mut self, tab_id: TabId) -> u64 {
        let generation = self.generations.entry(tab_id).or_insert(0);
        *generation += 1;
        self.pending.insert(tab_id, *generation);
        *generation
    }

    pub fn is_current(&self, tab_id: TabId, generation: u64) -> bool {
        self.generations.get(&tab_id) == Some(&generation)
    }

    pub fn is_pending(&self, tab_id: TabId) -> bool {
        self.pending.contains_key(&tab_id)
    }

    /// The run for `generation` left its window; only the current one clears pending
    pub fn settle(&mut self, tab_id: TabId, generation: u64) {
        if self.pending.get(&tab_id) == Some(&generation) {
            self.pending.remove(&tab_id);
        }
    }

    /// Forget the tab; runs still waiting will find themselves superseded
    pub fn cancel(&mut self, tab_id: TabId) {
        self.pending.remove(&tab_id);
        if let Some(generation) = self.generations.get_mut(&tab_id) {
            *generation += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_trigger_wins() {
        let mut coalescer = Coalescer::new();
        let first = coalescer.trigger(1);
        let second = coalescer.trigger(1);

        assert!(!coalescer.is_current(1, first));
        assert!(coalescer.is_current(1, second));
    }

    #[test]
    fn test_tabs_are_independent() {
        let mut coalescer = Coalescer::new();
        let a = coalescer.trigger(1);
        let b = coalescer.trigger(2);

        assert!(coalescer.is_current(1, a));
        assert!(coalescer.is_current(2, b));
    }

    #[test]
    fn test_settle_only_clears_current() {
        let mut coalescer = Coalescer::new();
        let first = coalescer.trigger(1);
        let second = coalescer.trigger(1);

        coalescer.settle(1, first);
        assert!(coalescer.is_pending(1));
        coalescer.settle(1, second);
        assert!(!coalescer.is_pending(1));
    }

    #[test]
    fn test_cancel_supersedes_waiting_run() {
        let mut coalescer = Coalescer::new();
        let generation = coalescer.trigger(1);
        coalescer.cancel(1);

        assert!(!coalescer.is_current(1, generation));
        assert!(!coalescer.is_pending(1));
        assert!(coalescer.trigger(1) > generation);
    }
}
