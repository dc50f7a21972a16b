// crates/transfer-intake-core/src/core/time.rs
// ============================================================================
// Module: Transfer Intake Time Helpers
// Description: Wall-clock capture for request stamping.
// Purpose: Keep time reads at the edges so window logic stays deterministic.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Rate-limit window arithmetic and record timestamps operate on explicit
//! unix-millisecond values supplied by callers. Wall-clock time is read once
//! per request through [`unix_millis`] and flows through the runtime from
//! there, which keeps the decision paths testable with fixed timestamps.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the current unix epoch in milliseconds.
#[must_use]
pub fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
