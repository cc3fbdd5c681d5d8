use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::{RateLimitDecision, RateLimitError, RateLimitPolicy, RateLimitStore};

const KEY_PREFIX: &str = "ratelimit";

/// Counts requests in Redis so every server process shares the same windows.
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    /// Opens the shared connection; each hit clones it instead of reconnecting.
    pub async fn connect(client: &redis::Client) -> Result<Self, RateLimitError> {
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

fn redis_key(key: &str) -> String {
    format!("{KEY_PREFIX}:{key}")
}

/// Time until the window resets, and whether the key still needs an expiry.
/// A negative TTL means the key was just created or lost its expiry.
fn window_reset(ttl: i64, window: Duration) -> (Duration, bool) {
    if ttl < 0 {
        (Duration::from_secs(window.as_secs().max(1)), true)
    } else {
        (Duration::from_secs(ttl as u64), false)
    }
}

#[async_trait]
impl RateLimitStore for RedisStore {
    async fn hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
    ) -> Result<RateLimitDecision, RateLimitError> {
        let mut conn = self.conn.clone();
        let redis_key = redis_key(key);

        let (count, ttl): (u64, i64) = redis::pipe()
            .atomic()
            .incr(&redis_key, 1)
            .ttl(&redis_key)
            .query_async(&mut conn)
            .await?;

        let (reset_in, needs_expiry) = window_reset(ttl, policy.window);
        if needs_expiry {
            let _: () = conn.expire(&redis_key, reset_in.as_secs() as i64).await?;
        }

        Ok(policy.decide(count, reset_in))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_namespaced() {
        assert_eq!(redis_key("products:10.0.0.1"), "ratelimit:products:10.0.0.1");
    }

    #[test]
    fn test_new_key_starts_full_window_and_sets_expiry() {
        assert_eq!(
            window_reset(-1, Duration::from_secs(60)),
            (Duration::from_secs(60), true)
        );
        // -2 is returned for a key that does not exist
        assert_eq!(
            window_reset(-2, Duration::from_secs(60)),
            (Duration::from_secs(60), true)
        );
    }

    #[test]
    fn test_live_key_reports_remaining_ttl() {
        assert_eq!(
            window_reset(17, Duration::from_secs(60)),
            (Duration::from_secs(17), false)
        );
    }

    #[test]
    fn test_sub_second_window_rounds_up() {
        assert_eq!(
            window_reset(-1, Duration::from_millis(200)),
            (Duration::from_secs(1), true)
        );
    }

    #[test]
    fn test_decision_uses_ttl_as_reset() {
        let policy = RateLimitPolicy::default();
        let (reset_in, _) = window_reset(42, policy.window);
        let decision = policy.decide(101, reset_in);
        assert!(!decision.allowed);
        assert_eq!(decision.reset_in, Duration::from_secs(42));
    }
}
