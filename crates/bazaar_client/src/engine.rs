//! # Query Engine
//!
//! The caching core every read goes through and every write settles
//! against. Values are cached as type-erased JSON under [`QueryKey`]
//! strings, which keeps the cache monomorphic while the read surface
//! stays fully typed.
//!
//! Guarantees:
//!
//! - Structurally-equal reads share one provider call: concurrent
//!   callers of the same key coalesce onto a single in-flight fetch.
//! - Failures are delivered to every waiter of that fetch but are never
//!   retained, so the next read retries the provider.
//! - Scope invalidation is registered synchronously; a read issued
//!   after a write settles cannot observe the pre-write value.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::Address;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{ClientError, ProviderError};
use crate::keys::QueryKey;

/// Outcome of a cached read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryResult<T> {
    /// The read is not runnable yet; no provider call was made.
    Pending,
    /// The read produced a value, fresh or cached.
    Ready(T),
    /// The provider or a serializer failed.
    Failed(ClientError),
}

impl<T> QueryResult<T> {
    /// Whether a value is available.
    #[inline]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Whether the read is waiting on inputs it does not have yet.
    #[inline]
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// The value, if one is available.
    #[must_use]
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending | Self::Failed(_) => None,
        }
    }

    /// The failure, if the read failed.
    #[must_use]
    pub fn error(&self) -> Option<&ClientError> {
        match self {
            Self::Failed(err) => Some(err),
            Self::Pending | Self::Ready(_) => None,
        }
    }
}

/// Engine tuning knobs.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Maximum number of cached reads before eviction.
    pub max_entries: u64,
    /// Age at which a cached read expires on its own; `None` keeps
    /// entries until eviction or invalidation.
    pub time_to_live: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            time_to_live: None,
        }
    }
}

impl EngineConfig {
    /// Small cache for tests: evictions show up early.
    #[must_use]
    pub fn testing() -> Self {
        Self {
            max_entries: 64,
            time_to_live: None,
        }
    }

    /// Sets an expiry age for cached reads.
    #[must_use]
    pub const fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }
}

/// Engine counters, updated with relaxed ordering.
#[derive(Debug, Default)]
pub struct EngineStats {
    /// Reads that reached the engine (disabled reads never do).
    pub queries: AtomicU64,
    /// Reads resolved by calling the provider (cache misses).
    pub fetches: AtomicU64,
    /// Scope invalidations registered by writes.
    pub invalidations: AtomicU64,
}

/// The caching query engine.
///
/// Cheap to share: callers hold it in an `Arc` and the inner cache is
/// already concurrent. The engine never spawns tasks; fetch futures run
/// on the caller's task and concurrent callers of one key wait on the
/// first caller's fetch.
pub struct QueryEngine {
    cache: Cache<String, Arc<serde_json::Value>>,
    stats: Arc<EngineStats>,
    config: EngineConfig,
}

impl QueryEngine {
    /// Creates an engine with the given tuning.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let mut builder = Cache::builder()
            .max_capacity(config.max_entries)
            .support_invalidation_closures();
        if let Some(ttl) = config.time_to_live {
            builder = builder.time_to_live(ttl);
        }
        Self {
            cache: builder.build(),
            stats: Arc::new(EngineStats::default()),
            config,
        }
    }

    /// The tuning this engine was built with.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared handle to the engine counters.
    #[must_use]
    pub fn stats(&self) -> Arc<EngineStats> {
        Arc::clone(&self.stats)
    }

    /// Runs one read through the cache.
    ///
    /// On a miss the fetch future runs on the caller's task; concurrent
    /// callers of the same key wait for that fetch instead of issuing
    /// their own. A failed fetch is handed to every current waiter and
    /// then forgotten - errors are never cached.
    pub async fn run_query<T, F>(&self, key: &QueryKey, fetch: F) -> QueryResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, ClientError>> + Send + 'static,
    {
        self.stats.queries.fetch_add(1, Ordering::Relaxed);
        let stats = Arc::clone(&self.stats);
        let init = async move {
            stats.fetches.fetch_add(1, Ordering::Relaxed);
            let value = fetch.await?;
            let json =
                serde_json::to_value(&value).map_err(|err| ClientError::serialization(&err))?;
            Ok::<_, ClientError>(Arc::new(json))
        };

        match self.cache.try_get_with(key.to_string(), init).await {
            Ok(json) => match serde_json::from_value::<T>((*json).clone()) {
                Ok(value) => QueryResult::Ready(value),
                Err(err) => QueryResult::Failed(ClientError::serialization(&err)),
            },
            Err(shared) => QueryResult::Failed((*shared).clone()),
        }
    }

    /// Runs one write and then its settle hook.
    ///
    /// The hook runs whether the write succeeded or failed: a failed
    /// transaction can still have changed chain state before reverting,
    /// so its scope must be re-read either way.
    pub async fn run_mutation<T, F, S>(&self, mutate: F, settle: S) -> Result<T, ProviderError>
    where
        F: Future<Output = Result<T, ProviderError>> + Send,
        S: FnOnce(&Self),
    {
        let outcome = mutate.await;
        settle(self);
        outcome
    }

    /// Drops every cached read under one contract scope.
    ///
    /// Registration is synchronous: once this returns, a read of a
    /// matched key misses and refetches. Entry teardown itself happens
    /// lazily inside the cache.
    pub fn invalidate_scope(&self, chain_id: u64, address: Address) {
        self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
        let prefix = QueryKey::scope_prefix(chain_id, address);
        tracing::debug!(scope = %prefix, "invalidating contract scope");
        if let Err(err) = self
            .cache
            .invalidate_entries_if(move |key, _| key.starts_with(&prefix))
        {
            // Unreachable while the builder enables invalidation
            // closures; logged rather than unwrapped to keep the
            // write path panic-free.
            tracing::warn!(error = %err, "scope invalidation predicate rejected");
        }
    }

    /// Drops every cached read.
    pub fn invalidate_all(&self) {
        self.stats.invalidations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("invalidating all cached reads");
        self.cache.invalidate_all();
    }
}
