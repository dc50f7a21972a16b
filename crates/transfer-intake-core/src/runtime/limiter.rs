// crates/transfer-intake-core/src/runtime/limiter.rs
// ============================================================================
// Module: Transfer Intake Rate Limiter
// Description: Fixed-window limiter with a write-through local cache.
// Purpose: Gate intake requests per hashed identifier with fail-open errors.
// Dependencies: crate::{core, interfaces, runtime::cache}
// ============================================================================

//! ## Overview
//! The rate limiter counts requests per hashed identifier in fixed,
//! non-overlapping windows backed by the durable counter store. A short-TTL
//! process-local cache fronts the store so the common path avoids a durable
//! round trip; cache-hit updates are persisted through a background write
//! queue and never awaited.
//!
//! Failure policy is fail-open: any durable-store error lets the request
//! through after the failure is reported to the event sink. Availability is
//! prioritized over strict enforcement.
//!
//! Wall-clock time is read once per check; all window arithmetic flows
//! through explicit timestamps so the decision logic is deterministic under
//! test.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::counter::CounterWrite;
use crate::core::counter::RateLimitCounter;
use crate::core::hashing::Bucket;
use crate::core::hashing::CounterKey;
use crate::core::hashing::HashSecret;
use crate::core::time::unix_millis;
use crate::interfaces::CounterWriteQueue;
use crate::interfaces::EventSink;
use crate::interfaces::IntakeEvent;
use crate::interfaces::RateLimitStore;
use crate::runtime::cache::CounterCache;
use crate::runtime::store::SharedRateLimitStore;

// ============================================================================
// SECTION: Settings
// ============================================================================

/// Process-wide rate limiter settings, injected at startup and read-only
/// afterwards.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    /// Window length in milliseconds.
    pub window_ms: i64,
    /// Maximum requests per window.
    pub max_requests: u32,
}

// ============================================================================
// SECTION: Decision
// ============================================================================

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Requests remaining in the current window.
    pub remaining: u32,
    /// Instant at which the window resets (unix millis).
    pub reset_at: i64,
}

// ============================================================================
// SECTION: Rate Limiter
// ============================================================================

/// Fixed-window rate limiter over a durable store and a local cache.
pub struct RateLimiter {
    /// Limiter settings.
    settings: RateLimitSettings,
    /// Hashing secret for key derivation.
    secret: HashSecret,
    /// Process-local counter cache owned by this limiter.
    cache: CounterCache,
    /// Durable counter store.
    store: SharedRateLimitStore,
    /// Background write queue for cache-hit persistence.
    queue: Arc<dyn CounterWriteQueue>,
    /// Event sink for swallowed failures and denials.
    events: Arc<dyn EventSink>,
}

impl RateLimiter {
    /// Creates a rate limiter from its collaborators.
    #[must_use]
    pub fn new(
        settings: RateLimitSettings,
        secret: HashSecret,
        cache: CounterCache,
        store: SharedRateLimitStore,
        queue: Arc<dyn CounterWriteQueue>,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            settings,
            secret,
            cache,
            store,
            queue,
            events,
        }
    }

    /// Returns the limiter settings.
    #[must_use]
    pub const fn settings(&self) -> RateLimitSettings {
        self.settings
    }

    /// Checks whether a request from `identifier` is allowed in `bucket`.
    #[must_use]
    pub fn check(&self, identifier: &str, bucket: Bucket) -> RateLimitDecision {
        self.check_at(identifier, bucket, unix_millis())
    }

    /// Checks a request at an explicit instant.
    #[must_use]
    pub fn check_at(&self, identifier: &str, bucket: Bucket, now_ms: i64) -> RateLimitDecision {
        let key = CounterKey::derive(bucket, identifier, &self.secret);
        if let Some((counter, expires_at)) = self.cache.get(&key, now_ms) {
            return self.check_cached(key, counter, expires_at, now_ms);
        }
        self.check_durable(key, bucket, now_ms)
    }

    /// Cache-hit path: decide locally and persist through the write queue.
    fn check_cached(
        &self,
        key: CounterKey,
        counter: RateLimitCounter,
        expires_at: i64,
        now_ms: i64,
    ) -> RateLimitDecision {
        let window_ms = self.settings.window_ms;
        if counter.window_expired(now_ms, window_ms) {
            let reset = RateLimitCounter::started_at(now_ms);
            self.cache.put(key.clone(), reset, now_ms.saturating_add(self.cache.ttl_ms()), now_ms);
            self.queue.enqueue(CounterWrite::Replace {
                key,
                counter: reset,
            });
            return self.allowed(reset);
        }
        if counter.count >= self.settings.max_requests {
            return Self::denied(counter.reset_at(window_ms));
        }
        let advanced = counter.incremented();
        self.cache.put(key.clone(), advanced, expires_at, now_ms);
        self.queue.enqueue(CounterWrite::Increment {
            key,
        });
        self.allowed(advanced)
    }

    /// Cache-miss path: read through to the durable store.
    fn check_durable(&self, key: CounterKey, bucket: Bucket, now_ms: i64) -> RateLimitDecision {
        let window_ms = self.settings.window_ms;
        let existing = match self.store.get(&key) {
            Ok(existing) => existing,
            Err(err) => return self.fail_open(bucket, now_ms, &err.to_string()),
        };
        match existing {
            None => {
                let counter = RateLimitCounter::started_at(now_ms);
                if let Err(err) = self.store.put(&key, &counter) {
                    return self.fail_open(bucket, now_ms, &err.to_string());
                }
                self.cache_fresh(key, counter, now_ms);
                self.allowed(counter)
            }
            Some(counter) if counter.window_expired(now_ms, window_ms) => {
                let reset = RateLimitCounter::started_at(now_ms);
                if let Err(err) = self.store.put(&key, &reset) {
                    return self.fail_open(bucket, now_ms, &err.to_string());
                }
                self.cache_fresh(key, reset, now_ms);
                self.allowed(reset)
            }
            Some(counter) if counter.count >= self.settings.max_requests => {
                Self::denied(counter.reset_at(window_ms))
            }
            Some(_) => match self.store.increment(&key, now_ms) {
                Ok(stored) => {
                    self.cache_fresh(key, stored, now_ms);
                    self.allowed(stored)
                }
                Err(err) => self.fail_open(bucket, now_ms, &err.to_string()),
            },
        }
    }

    /// Populates the cache with a freshly observed counter.
    fn cache_fresh(&self, key: CounterKey, counter: RateLimitCounter, now_ms: i64) {
        self.cache.put(key, counter, now_ms.saturating_add(self.cache.ttl_ms()), now_ms);
    }

    /// Builds an allow decision from the counter that was just charged.
    const fn allowed(&self, counter: RateLimitCounter) -> RateLimitDecision {
        RateLimitDecision {
            allowed: true,
            remaining: self.settings.max_requests.saturating_sub(counter.count),
            reset_at: counter.reset_at(self.settings.window_ms),
        }
    }

    /// Builds a deny decision; state is never mutated on denial.
    const fn denied(reset_at: i64) -> RateLimitDecision {
        RateLimitDecision {
            allowed: false,
            remaining: 0,
            reset_at,
        }
    }

    /// Reports a durable-store failure and lets the request through.
    fn fail_open(&self, bucket: Bucket, now_ms: i64, detail: &str) -> RateLimitDecision {
        self.events.record(&IntakeEvent::RateLimitStoreFailure {
            timestamp_ms: now_ms,
            bucket: bucket.as_str().to_string(),
            detail: detail.to_string(),
        });
        RateLimitDecision {
            allowed: true,
            remaining: self.settings.max_requests,
            reset_at: now_ms.saturating_add(self.settings.window_ms),
        }
    }
}
