// crates/transfer-intake-core/src/core/counter.rs
// ============================================================================
// Module: Transfer Intake Rate-Limit Counters
// Description: Fixed-window counter state for hashed identifiers.
// Purpose: Provide the canonical counter record shared by cache and stores.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`RateLimitCounter`] records how many requests a hashed identifier has
//! made since the start of its current window. Counters are created on first
//! observation and updated on every subsequent one; they are never required
//! to be deleted, since an expired window is reset in place by the next
//! observation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::CounterKey;

// ============================================================================
// SECTION: Counter State
// ============================================================================

/// Fixed-window request counter for one hashed identifier.
///
/// # Invariants
/// - `count` reflects the requests counted since `window_start`.
/// - Once `now - window_start >= window_ms` the window is logically expired
///   and the next observation resets to `count = 1, window_start = now`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitCounter {
    /// Requests observed in the current window.
    pub count: u32,
    /// Start of the counting window (unix millis).
    pub window_start: i64,
}

impl RateLimitCounter {
    /// Returns a fresh counter starting a new window at `now_ms`.
    #[must_use]
    pub const fn started_at(now_ms: i64) -> Self {
        Self {
            count: 1,
            window_start: now_ms,
        }
    }

    /// Returns true when the window has expired relative to `now_ms`.
    #[must_use]
    pub const fn window_expired(&self, now_ms: i64, window_ms: i64) -> bool {
        now_ms.saturating_sub(self.window_start) >= window_ms
    }

    /// Returns the instant at which the current window resets.
    #[must_use]
    pub const fn reset_at(&self, window_ms: i64) -> i64 {
        self.window_start.saturating_add(window_ms)
    }

    /// Returns a copy with the count advanced by one.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self {
            count: self.count.saturating_add(1),
            window_start: self.window_start,
        }
    }
}

// ============================================================================
// SECTION: Write-Behind Payloads
// ============================================================================

/// Durable counter update handed to a write queue.
///
/// # Invariants
/// - Queue implementations log failures and never surface them to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterWrite {
    /// Replace the stored counter with the supplied state.
    Replace {
        /// Hashed bucket key.
        key: CounterKey,
        /// Counter state to persist.
        counter: RateLimitCounter,
    },
    /// Atomically advance the stored counter by one.
    Increment {
        /// Hashed bucket key.
        key: CounterKey,
    },
}
