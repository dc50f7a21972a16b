// crates/transfer-intake-core/src/runtime/store.rs
// ============================================================================
// Module: Transfer Intake In-Memory Stores
// Description: Simple in-memory stores for tests and local demos.
// Purpose: Provide deterministic store implementations without external deps.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! This module provides in-memory implementations of [`SubmissionStore`] and
//! [`RateLimitStore`] for tests and local demos, plus the shared `Arc`
//! wrappers the runtime passes around. The in-memory stores are not intended
//! for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use crate::core::counter::RateLimitCounter;
use crate::core::hashing::CounterKey;
use crate::core::identifiers::SubmissionId;
use crate::core::submission::Submission;
use crate::core::submission::SubmissionPatch;
use crate::interfaces::ListRequest;
use crate::interfaces::RateLimitStore;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionPage;
use crate::interfaces::SubmissionStore;

// ============================================================================
// SECTION: In-Memory Submission Store
// ============================================================================

/// In-memory submission store for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubmissionStore {
    /// Record map protected by a mutex.
    records: Arc<Mutex<BTreeMap<String, Submission>>>,
}

impl InMemorySubmissionStore {
    /// Creates a new in-memory submission store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// Returns the number of stored records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.guard()?.len())
    }

    /// Returns true when the store holds no records.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.guard()?.is_empty())
    }

    /// Locks the record map.
    fn guard(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, Submission>>, StoreError> {
        self.records.lock().map_err(|_| StoreError::Store("submission store mutex poisoned".to_string()))
    }
}

impl SubmissionStore for InMemorySubmissionStore {
    fn create(&self, submission: &Submission) -> Result<(), StoreError> {
        let mut guard = self.guard()?;
        let key = submission.id.as_str().to_string();
        if guard.contains_key(&key) {
            return Err(StoreError::Invalid(format!("submission {key} already exists")));
        }
        guard.insert(key, submission.clone());
        Ok(())
    }

    fn load(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError> {
        Ok(self.guard()?.get(id.as_str()).cloned())
    }

    fn patch(
        &self,
        id: &SubmissionId,
        patch: &SubmissionPatch,
        _now_ms: i64,
    ) -> Result<Option<Submission>, StoreError> {
        let mut guard = self.guard()?;
        let Some(record) = guard.get_mut(id.as_str()) else {
            return Ok(None);
        };
        record.fields.apply(patch);
        Ok(Some(record.clone()))
    }

    fn delete(&self, id: &SubmissionId) -> Result<bool, StoreError> {
        Ok(self.guard()?.remove(id.as_str()).is_some())
    }

    fn list(&self, request: &ListRequest) -> Result<SubmissionPage, StoreError> {
        if request.limit == 0 {
            return Err(StoreError::Invalid("list limit must be greater than zero".to_string()));
        }
        let mut items: Vec<Submission> = {
            let guard = self.guard()?;
            guard
                .values()
                .filter(|record| request.mode.is_none_or(|mode| record.mode == mode))
                .cloned()
                .collect()
        };
        items.sort_by(|a, b| match b.created_at.cmp(&a.created_at) {
            std::cmp::Ordering::Equal => a.id.as_str().cmp(b.id.as_str()),
            other => other,
        });
        let start_index = request.cursor.as_ref().map_or(0, |cursor| {
            items.iter().position(|record| record.id.as_str() == cursor).map_or(0, |idx| idx + 1)
        });
        let page_items: Vec<Submission> =
            items.into_iter().skip(start_index).take(request.limit).collect();
        let next_token = if page_items.len() == request.limit {
            page_items.last().map(|record| record.id.as_str().to_string())
        } else {
            None
        };
        Ok(SubmissionPage {
            items: page_items,
            next_token,
        })
    }
}

// ============================================================================
// SECTION: In-Memory Rate Limit Store
// ============================================================================

/// In-memory rate-limit counter store for tests and demos.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRateLimitStore {
    /// Counter map protected by a mutex.
    counters: Arc<Mutex<HashMap<String, RateLimitCounter>>>,
}

impl InMemoryRateLimitStore {
    /// Creates a new in-memory counter store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Locks the counter map.
    fn guard(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, RateLimitCounter>>, StoreError> {
        self.counters.lock().map_err(|_| StoreError::Store("rate limit store mutex poisoned".to_string()))
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn get(&self, key: &CounterKey) -> Result<Option<RateLimitCounter>, StoreError> {
        Ok(self.guard()?.get(key.as_str()).copied())
    }

    fn put(&self, key: &CounterKey, counter: &RateLimitCounter) -> Result<(), StoreError> {
        self.guard()?.insert(key.as_str().to_string(), *counter);
        Ok(())
    }

    fn increment(&self, key: &CounterKey, now_ms: i64) -> Result<RateLimitCounter, StoreError> {
        let mut guard = self.guard()?;
        let counter = guard
            .entry(key.as_str().to_string())
            .and_modify(|counter| *counter = counter.incremented())
            .or_insert_with(|| RateLimitCounter::started_at(now_ms));
        Ok(*counter)
    }

    fn sweep_expired(&self, before_ms: i64) -> Result<u64, StoreError> {
        let mut guard = self.guard()?;
        let before = guard.len();
        guard.retain(|_, counter| counter.window_start >= before_ms);
        Ok(u64::try_from(before - guard.len()).unwrap_or(u64::MAX))
    }
}

// ============================================================================
// SECTION: Shared Store Wrappers
// ============================================================================

/// Shared submission store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedSubmissionStore {
    /// Inner store implementation.
    inner: Arc<dyn SubmissionStore + Send + Sync>,
}

impl SharedSubmissionStore {
    /// Wraps a submission store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl SubmissionStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn SubmissionStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl SubmissionStore for SharedSubmissionStore {
    fn create(&self, submission: &Submission) -> Result<(), StoreError> {
        self.inner.create(submission)
    }

    fn load(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError> {
        self.inner.load(id)
    }

    fn patch(
        &self,
        id: &SubmissionId,
        patch: &SubmissionPatch,
        now_ms: i64,
    ) -> Result<Option<Submission>, StoreError> {
        self.inner.patch(id, patch, now_ms)
    }

    fn delete(&self, id: &SubmissionId) -> Result<bool, StoreError> {
        self.inner.delete(id)
    }

    fn list(&self, request: &ListRequest) -> Result<SubmissionPage, StoreError> {
        self.inner.list(request)
    }

    fn readiness(&self) -> Result<(), StoreError> {
        self.inner.readiness()
    }
}

/// Shared rate-limit store backed by an `Arc` trait object.
#[derive(Clone)]
pub struct SharedRateLimitStore {
    /// Inner store implementation.
    inner: Arc<dyn RateLimitStore + Send + Sync>,
}

impl SharedRateLimitStore {
    /// Wraps a rate-limit store in a shared, clonable wrapper.
    #[must_use]
    pub fn from_store(store: impl RateLimitStore + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }

    /// Wraps an existing shared store.
    #[must_use]
    pub const fn new(store: Arc<dyn RateLimitStore + Send + Sync>) -> Self {
        Self {
            inner: store,
        }
    }
}

impl RateLimitStore for SharedRateLimitStore {
    fn get(&self, key: &CounterKey) -> Result<Option<RateLimitCounter>, StoreError> {
        self.inner.get(key)
    }

    fn put(&self, key: &CounterKey, counter: &RateLimitCounter) -> Result<(), StoreError> {
        self.inner.put(key, counter)
    }

    fn increment(&self, key: &CounterKey, now_ms: i64) -> Result<RateLimitCounter, StoreError> {
        self.inner.increment(key, now_ms)
    }

    fn sweep_expired(&self, before_ms: i64) -> Result<u64, StoreError> {
        self.inner.sweep_expired(before_ms)
    }
}
