//! Fixed-window request limiting keyed by client identifier.
//!
//! Two stores are available: a bounded in-process map and Redis for
//! deployments running more than one server process.

mod memory;
mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use thiserror::Error;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Shared bucket for requests that carry no client address.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub max_requests: u64,
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitPolicy {
    pub fn decide(&self, count: u64, reset_in: Duration) -> RateLimitDecision {
        RateLimitDecision {
            allowed: count <= self.max_requests,
            remaining: self.max_requests.saturating_sub(count),
            reset_in,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u64,
    pub reset_in: Duration,
}

#[derive(Debug, Error)]
pub enum RateLimitError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    /// Records one request for `key` and reports whether it is within the policy.
    async fn hit(
        &self,
        key: &str,
        policy: &RateLimitPolicy,
    ) -> Result<RateLimitDecision, RateLimitError>;
}

/// Limiter for one endpoint group.
#[derive(Clone)]
pub struct RateLimiter {
    group: &'static str,
    policy: RateLimitPolicy,
    store: Arc<dyn RateLimitStore>,
}

impl RateLimiter {
    pub fn new(group: &'static str, policy: RateLimitPolicy, store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            group,
            policy,
            store,
        }
    }

    pub fn group(&self) -> &'static str {
        self.group
    }

    /// Store failures let the request through.
    pub async fn check(&self, client: &str) -> RateLimitDecision {
        let key = format!("{}:{}", self.group, client);
        match self.store.hit(&key, &self.policy).await {
            Ok(decision) => decision,
            Err(e) => {
                tracing::warn!(group = self.group, error = %e, "rate limit store unavailable, allowing request");
                RateLimitDecision {
                    allowed: true,
                    remaining: self.policy.max_requests,
                    reset_in: self.policy.window,
                }
            }
        }
    }
}

/// One limiter per endpoint group, all sharing a store.
#[derive(Clone)]
pub struct RateLimits {
    pub products: RateLimiter,
    pub companies: RateLimiter,
    pub ingredients: RateLimiter,
}

impl RateLimits {
    pub fn new(policy: RateLimitPolicy, store: Arc<dyn RateLimitStore>) -> Self {
        Self {
            products: RateLimiter::new("products", policy, store.clone()),
            companies: RateLimiter::new("companies", policy, store.clone()),
            ingredients: RateLimiter::new("ingredients", policy, store),
        }
    }

    pub fn in_memory(policy: RateLimitPolicy, capacity: usize) -> Self {
        Self::new(policy, Arc::new(MemoryStore::new(capacity)))
    }
}

/// First `X-Forwarded-For` entry, then `X-Real-IP`, then [`UNKNOWN_CLIENT`].
pub fn client_identifier(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}
