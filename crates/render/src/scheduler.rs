use std::time::{Duration, Instant};

/// One-shot deferred tasks driven by the caller's clock.
///
/// A key has at most one pending deadline; scheduling it again replaces the
/// earlier one, so repeated requests fire once.
#[derive(Debug, Clone)]
pub struct Scheduler<K> {
    pending: Vec<(K, Instant)>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self { pending: Vec::new() }
    }
}

impl<K: Copy + Eq> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, key: K, delay: Duration, now: Instant) {
        self.cancel(key);
        self.pending.push((key, now + delay));
    }

    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(k, _)| *k != key);
        self.pending.len() != before
    }

    pub fn is_pending(&self, key: K) -> bool {
        self.pending.iter().any(|(k, _)| *k == key)
    }

    /// Removes and returns every task whose deadline has passed, earliest first.
    pub fn due(&mut self, now: Instant) -> Vec<K> {
        let mut fired: Vec<(K, Instant)> = Vec::new();
        self.pending.retain(|&(k, at)| {
            if at <= now {
                fired.push((k, at));
                false
            } else {
                true
            }
        });
        fired.sort_by_key(|&(_, at)| at);
        fired.into_iter().map(|(k, _)| k).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
