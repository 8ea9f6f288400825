//! Read-through cache (C2): a short-TTL layer in front of [`crate::WorkflowStorage`]
//! / [`crate::RunStorage`], keyed `"workflow:<uuid>"` (≈60s TTL) and
//! `"run:<uuid>"` (≈10s TTL) per spec.md §4.2.
//!
//! Writes never invalidate — TTL is the only eventual-consistency
//! mechanism, and a Redis failure degrades to a cache miss (logged, never
//! propagated) so the cache can never fail a read. Correctness never
//! depends on this layer; it is advisory.

use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

pub const WORKFLOW_TTL_SECS: u64 = 60;
pub const RUN_TTL_SECS: u64 = 10;

pub fn workflow_key(uuid: &str) -> String {
    format!("workflow:{uuid}")
}

pub fn run_key(uuid: &str) -> String {
    format!("run:{uuid}")
}

/// Thin wrapper over `redis::aio::ConnectionManager`. Every method
/// swallows its own errors and logs a warning — callers treat any `Err`-
/// or `None`-shaped outcome identically: fall through to storage.
#[derive(Clone)]
pub struct Cache {
    manager: redis::aio::ConnectionManager,
}

impl Cache {
    pub async fn connect(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }

    /// Read-through get: returns `None` on miss *or* on any Redis failure.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let mut conn = self.manager.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    warn!(key, error = %e, "cache entry failed to deserialize");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, falling back to storage");
                None
            }
        }
    }

    /// Populate `key` with `value`, expiring after `ttl_secs`. Failures are
    /// logged and otherwise ignored — a write that never reaches the cache
    /// just means the next read falls back to storage.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let Ok(raw) = serde_json::to_string(value) else {
            warn!(key, "cache entry failed to serialize, skipping");
            return;
        };
        let mut conn = self.manager.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, raw, ttl_secs).await {
            warn!(key, error = %e, "cache write failed");
        }
    }
}
