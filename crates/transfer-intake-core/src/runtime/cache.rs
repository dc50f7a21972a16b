// crates/transfer-intake-core/src/runtime/cache.rs
// ============================================================================
// Module: Transfer Intake Counter Cache
// Description: Process-local, time-bounded mirror of rate-limit counters.
// Purpose: Avoid a durable-store round trip on every rate-limit check.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The counter cache is a non-owning, best-effort mirror of the durable
//! rate-limit store. Entries expire after a short TTL that is independent of
//! the rate-limit window itself; expiry bounds memory use and staleness, not
//! the limiting semantics. The cache is an explicitly constructed object
//! owned by the limiter instance, created at startup and swept
//! opportunistically. Its absence never changes correctness, only latency.
//!
//! The cache may be slightly stale under concurrent writers in other
//! processes; it only protects the local process from redundant durable
//! round trips. That staleness is an accepted tradeoff.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::counter::RateLimitCounter;
use crate::core::hashing::CounterKey;

// ============================================================================
// SECTION: Cache Entry
// ============================================================================

/// Cached counter with its own expiry, distinct from the rate-limit window.
#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    /// Mirrored counter state.
    counter: RateLimitCounter,
    /// Instant after which this entry is no longer served (unix millis).
    expires_at: i64,
}

// ============================================================================
// SECTION: Counter Cache
// ============================================================================

/// Bounded, TTL-based counter cache.
#[derive(Debug)]
pub struct CounterCache {
    /// Entry map protected by a mutex; each key's read-modify-write happens
    /// inside one critical section.
    entries: Mutex<HashMap<CounterKey, CacheEntry>>,
    /// Entry lifetime in milliseconds.
    ttl_ms: i64,
    /// Maximum number of tracked entries.
    max_entries: usize,
}

impl CounterCache {
    /// Creates a cache with the given entry TTL and capacity.
    #[must_use]
    pub fn new(ttl_ms: i64, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl_ms,
            max_entries,
        }
    }

    /// Returns the entry TTL in milliseconds.
    #[must_use]
    pub const fn ttl_ms(&self) -> i64 {
        self.ttl_ms
    }

    /// Returns the live counter and its expiry for a key, or `None` when the
    /// entry is absent or expired.
    #[must_use]
    pub fn get(&self, key: &CounterKey, now_ms: i64) -> Option<(RateLimitCounter, i64)> {
        let guard = self.lock();
        let entry = guard.get(key)?;
        if entry.expires_at <= now_ms {
            return None;
        }
        Some((entry.counter, entry.expires_at))
    }

    /// Stores a counter with an explicit expiry. When the cache is full,
    /// expired entries are swept first; if it is still full the insert is
    /// skipped, which bounds memory without affecting correctness.
    pub fn put(&self, key: CounterKey, counter: RateLimitCounter, expires_at: i64, now_ms: i64) {
        let mut guard = self.lock();
        if !guard.contains_key(&key) && guard.len() >= self.max_entries {
            guard.retain(|_, entry| entry.expires_at > now_ms);
            if guard.len() >= self.max_entries {
                return;
            }
        }
        guard.insert(key, CacheEntry {
            counter,
            expires_at,
        });
    }

    /// Removes expired entries and returns how many were dropped.
    pub fn sweep(&self, now_ms: i64) -> usize {
        let mut guard = self.lock();
        let before = guard.len();
        guard.retain(|_, entry| entry.expires_at > now_ms);
        before - guard.len()
    }

    /// Returns the number of tracked entries, including expired ones not yet
    /// swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true when no entries are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Locks the entry map, recovering from a poisoned mutex since cache
    /// state is disposable.
    fn lock(&self) -> MutexGuard<'_, HashMap<CounterKey, CacheEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}
