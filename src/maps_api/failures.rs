use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// How long a failed tile or image is left alone before it is requested again.
pub const RETRY_AFTER: Duration = Duration::from_secs(30);

/// Remembers fetches that failed so they are not re-requested every frame,
/// while still letting them through again once `retry_after` has passed.
#[derive(Debug)]
pub struct FailedFetches<K> {
    failed_at: HashMap<K, Instant>,
    retry_after: Duration,
}

impl<K: Eq + Hash> FailedFetches<K> {
    pub fn new(retry_after: Duration) -> Self {
        Self {
            failed_at: HashMap::new(),
            retry_after,
        }
    }

    pub fn mark_failed(&mut self, key: K, now: Instant) {
        self.failed_at.insert(key, now);
    }

    /// Whether `key` failed recently enough that it should not be retried yet.
    pub fn is_cooling_down(&self, key: &K, now: Instant) -> bool {
        self.failed_at
            .get(key)
            .is_some_and(|failed| now.saturating_duration_since(*failed) < self.retry_after)
    }

    /// Forget failures whose delay is over.
    pub fn prune(&mut self, now: Instant) {
        if self.is_empty() {
            return;
        }

        let before = self.len();
        let retry_after = self.retry_after;
        self.failed_at
            .retain(|_, failed| now.saturating_duration_since(*failed) < retry_after);
        if self.len() < before {
            log::debug!("{} failed fetches may be retried", before - self.len());
        }
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&K) -> bool) {
        self.failed_at.retain(|key, _| keep(key));
    }

    pub fn clear(&mut self) {
        self.failed_at.clear();
    }

    pub fn len(&self) -> usize {
        self.failed_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failed_at.is_empty()
    }
}

impl<K: Eq + Hash> Default for FailedFetches<K> {
    fn default() -> Self {
        Self::new(RETRY_AFTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_blocks_retries_until_the_delay_passes() {
        let start = Instant::now();
        let mut failed = FailedFetches::new(Duration::from_secs(30));
        failed.mark_failed("tile", start);

        assert!(failed.is_cooling_down(&"tile", start));
        assert!(failed.is_cooling_down(&"tile", start + Duration::from_secs(29)));
        assert!(!failed.is_cooling_down(&"tile", start + Duration::from_secs(30)));
        assert!(!failed.is_cooling_down(&"other", start));
    }

    #[test]
    fn pruning_drops_only_expired_failures() {
        let start = Instant::now();
        let mut failed = FailedFetches::new(Duration::from_secs(10));
        failed.mark_failed(1, start);
        failed.mark_failed(2, start + Duration::from_secs(8));

        failed.prune(start + Duration::from_secs(12));

        assert_eq!(failed.len(), 1);
        assert!(failed.is_cooling_down(&2, start + Duration::from_secs(12)));
    }

    #[test]
    fn a_new_failure_restarts_the_delay() {
        let start = Instant::now();
        let mut failed = FailedFetches::new(Duration::from_secs(10));
        failed.mark_failed("img", start);
        failed.mark_failed("img", start + Duration::from_secs(9));

        assert!(failed.is_cooling_down(&"img", start + Duration::from_secs(15)));
    }

    #[test]
    fn retain_and_clear_forget_failures() {
        let now = Instant::now();
        let mut failed = FailedFetches::default();
        for key in 0..6 {
            failed.mark_failed(key, now);
        }

        failed.retain(|key| key % 2 == 0);
        assert_eq!(failed.len(), 3);
        assert!(!failed.is_cooling_down(&1, now));

        failed.clear();
        assert!(failed.is_empty());
    }
}
