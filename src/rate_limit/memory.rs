use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

use async_trait::async_trait;

use super::{RateLimitDecision, RateLimitError, RateLimitPolicy, RateLimitStore};

#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    resets_at: Instant,
}

/// In-process store holding at most `capacity` client windows.
pub struct MemoryStore {
    capacity: usize,
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            windows: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.windows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hit_at(&self, key: &str, policy: &RateLimitPolicy, now: Instant) -> RateLimitDecision {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(window) = windows.get_mut(key) {
            if now < window.resets_at {
                window.count += 1;
                return policy.decide(window.count, window.resets_at - now);
            }
        } else if windows.len() >= self.capacity {
            evict(&mut windows, now, self.capacity);
        }

        windows.insert(
            key.to_string(),
            Window {
                count: 1,
                resets_at: now + policy.window,
            },
        );
        policy.decide(1, policy.window)
    }
}

/// Drops expired windows; if the map is still full, drops the one closest to reset.
fn evict(windows: &mut HashMap<String, Window>, now: Instant, capacity: usize) {
    windows.retain(|_, window| window.resets_at > now);
    if windows.len() < capacity {
        return;
    }
    let oldest = windows
        .iter()
        .min_by_key(|(_, window)| window.resets_at)
        .map(|(key, _)| key.clone());
    if let Some(key) = oldest {
        windows.remove(&key);
    }
}

#[async_trait]
impl RateLimitStore for MemoryStore {
    async fn hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
    ) -> Result<RateLimitDecision, RateLimitError> {
        Ok(self.hit_at(key, policy, Instant::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_hundred_and_first_request_rejected() {
        let store = MemoryStore::new(100);
        let policy = RateLimitPolicy::default();
        let start = Instant::now();

        for i in 0..100 {
            let decision = store.hit_at("10.0.0.1", &policy, start + Duration::from_millis(i));
            assert!(decision.allowed, "request {} should pass", i + 1);
        }
        let decision = store.hit_at("10.0.0.1", &policy, start + Duration::from_secs(30));
        assert!(!decision.allowed);
        assert_eq!(decision.remaining, 0);
        assert_eq!(decision.reset_in, Duration::from_secs(30));
    }

    #[test]
    fn test_window_elapsed_resets_count() {
        let store = MemoryStore::new(100);
        let policy = RateLimitPolicy::default();
        let start = Instant::now();

        for _ in 0..101 {
            store.hit_at("10.0.0.1", &policy, start);
        }
        assert!(!store.hit_at("10.0.0.1", &policy, start).allowed);

        let later = start + policy.window;
        let decision = store.hit_at("10.0.0.1", &policy, later);
        assert!(decision.allowed);
        assert_eq!(decision.remaining, 99);
    }

    #[test]
    fn test_clients_do_not_share_windows() {
        let store = MemoryStore::new(100);
        let policy = RateLimitPolicy {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let now = Instant::now();
        assert!(store.hit_at("a", &policy, now).allowed);
        assert!(!store.hit_at("a", &policy, now).allowed);
        assert!(store.hit_at("b", &policy, now).allowed);
    }

    #[test]
    fn test_capacity_is_never_exceeded() {
        let store = MemoryStore::new(3);
        let policy = RateLimitPolicy::default();
        let start = Instant::now();

        for i in 0..20u64 {
            store.hit_at(&format!("client-{i}"), &policy, start + Duration::from_millis(i));
            assert!(store.len() <= 3);
        }
    }

    #[test]
    fn test_expired_windows_pruned_before_live_ones() {
        let store = MemoryStore::new(2);
        let policy = RateLimitPolicy {
            max_requests: 1,
            window: Duration::from_secs(10),
        };
        let start = Instant::now();

        store.hit_at("old", &policy, start);
        store.hit_at("live", &policy, start + Duration::from_secs(8));
        // "old" has expired by now, so "live" keeps its window.
        store.hit_at("new", &policy, start + Duration::from_secs(12));

        assert_eq!(store.len(), 2);
        assert!(!store.hit_at("live", &policy, start + Duration::from_secs(13)).allowed);
    }

    #[test]
    fn test_full_store_evicts_window_closest_to_reset() {
        let store = MemoryStore::new(2);
        let policy = RateLimitPolicy {
            max_requests: 1,
            window: Duration::from_secs(60),
        };
        let start = Instant::now();

        store.hit_at("first", &policy, start);
        store.hit_at("second", &policy, start + Duration::from_secs(1));
        store.hit_at("third", &policy, start + Duration::from_secs(2));

        assert_eq!(store.len(), 2);
        // "first" was evicted, so it starts a fresh window.
        assert!(store.hit_at("first", &policy, start + Duration::from_secs(3)).allowed);
    }
}
