use std::collections::{HashSet, VecDeque};
use std::hash::Hash;

#[derive(Debug)]
pub struct Scheduled<K, T> {
    pub key: K,
    pub value: T,
}

/// FIFO queue that never hands out two items with the same key while one is
/// still active. Items sharing a key come out in enqueue order.
#[derive(Debug)]
pub struct PerKeyScheduler<K, T> {
    pending: VecDeque<Scheduled<K, T>>,
    active_keys: HashSet<K>,
}

impl<K, T> Default for PerKeyScheduler<K, T> {
    fn default() -> Self {
        Self {
            pending: VecDeque::new(),
            active_keys: HashSet::new(),
        }
    }
}

impl<K: Clone + Eq + Hash, T> PerKeyScheduler<K, T> {
    pub fn enqueue(&mut self, key: K, value: T) {
        self.pending.push_back(Scheduled { key, value });
    }

    pub fn dequeue_runnable(&mut self, max_items: usize) -> Vec<Scheduled<K, T>> {
        if max_items == 0 || self.pending.is_empty() {
            return Vec::new();
        }

        let mut selected = Vec::new();
        let mut blocked = HashSet::new();
        let mut remaining = VecDeque::new();

        while let Some(item) = self.pending.pop_front() {
            let key_busy = self.active_keys.contains(&item.key) || blocked.contains(&item.key);
            if !key_busy && selected.len() < max_items {
                self.active_keys.insert(item.key.clone());
                selected.push(item);
            } else {
                // Later items for this key must wait behind this one.
                blocked.insert(item.key.clone());
                remaining.push_back(item);
            }
        }

        self.pending = remaining;
        selected
    }

    pub fn complete(&mut self, key: &K) {
        self.active_keys.remove(key);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn active_len(&self) -> usize {
        self.active_keys.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.active_keys.is_empty()
    }
}
