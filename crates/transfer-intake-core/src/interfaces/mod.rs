// crates/transfer-intake-core/src/interfaces/mod.rs
// ============================================================================
// Module: Transfer Intake Interfaces
// Description: Backend-agnostic interfaces for storage, dispatch, and events.
// Purpose: Define the contract surfaces used by the intake runtime.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Interfaces define how the intake runtime integrates with external systems
//! without embedding backend-specific details. Submission and counter stores
//! must be safe under concurrent callers; the write queues and the event
//! sink carry an explicit fire-and-forget contract: errors are logged, never
//! awaited, and never surfaced to the request path.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::core::counter::CounterWrite;
use crate::core::counter::RateLimitCounter;
use crate::core::hashing::CounterKey;
use crate::core::identifiers::SubmissionId;
use crate::core::submission::FormMode;
use crate::core::submission::Submission;
use crate::core::submission::SubmissionPatch;

// ============================================================================
// SECTION: Store Errors
// ============================================================================

/// Store errors shared by submission and counter stores.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store I/O error.
    #[error("intake store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails integrity checks.
    #[error("intake store corruption: {0}")]
    Corrupt(String),
    /// Store data version is incompatible.
    #[error("intake store version mismatch: {0}")]
    VersionMismatch(String),
    /// Store data is invalid.
    #[error("intake store invalid data: {0}")]
    Invalid(String),
    /// Store reported an error.
    #[error("intake store error: {0}")]
    Store(String),
}

// ============================================================================
// SECTION: Submission Store
// ============================================================================

/// Pagination request for administrative listing.
#[derive(Debug, Clone)]
pub struct ListRequest {
    /// Opaque cursor returned by a previous page.
    pub cursor: Option<String>,
    /// Maximum items to return (must be greater than zero).
    pub limit: usize,
    /// Optional mode filter.
    pub mode: Option<FormMode>,
}

/// One page of submissions for administrative listing.
#[derive(Debug, Clone)]
pub struct SubmissionPage {
    /// Submissions in this page, newest first.
    pub items: Vec<Submission>,
    /// Cursor for the next page when more items remain.
    pub next_token: Option<String>,
}

/// Durable store owning submission records.
pub trait SubmissionStore {
    /// Creates a new submission record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the record cannot be persisted or the
    /// identifier already exists.
    fn create(&self, submission: &Submission) -> Result<(), StoreError>;

    /// Loads a submission by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, id: &SubmissionId) -> Result<Option<Submission>, StoreError>;

    /// Applies a merge-patch atomically and returns the merged record, or
    /// `None` when no record exists for the identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the patch cannot be persisted.
    fn patch(
        &self,
        id: &SubmissionId,
        patch: &SubmissionPatch,
        now_ms: i64,
    ) -> Result<Option<Submission>, StoreError>;

    /// Deletes a submission (administrative surface only). Returns true when
    /// a record was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when deletion fails.
    fn delete(&self, id: &SubmissionId) -> Result<bool, StoreError>;

    /// Lists submissions with pagination (administrative surface only).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when listing fails.
    fn list(&self, request: &ListRequest) -> Result<SubmissionPage, StoreError>;

    /// Reports store readiness for liveness/readiness probes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store is unavailable.
    fn readiness(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ============================================================================
// SECTION: Rate Limit Store
// ============================================================================

/// Durable store owning rate-limit counters.
///
/// The increment must be atomic with respect to concurrent callers across
/// processes; this is the only cross-process ordering guarantee the limiter
/// relies on.
pub trait RateLimitStore {
    /// Returns the counter for a hashed key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn get(&self, key: &CounterKey) -> Result<Option<RateLimitCounter>, StoreError>;

    /// Creates or replaces the counter for a hashed key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn put(&self, key: &CounterKey, counter: &RateLimitCounter) -> Result<(), StoreError>;

    /// Atomically advances the counter by one and returns the stored state.
    /// When no counter exists the store creates one at `count = 1` with
    /// `window_start = now_ms`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the write fails.
    fn increment(&self, key: &CounterKey, now_ms: i64) -> Result<RateLimitCounter, StoreError>;

    /// Removes counters whose window started before `before_ms`. Stale
    /// counters are harmless; this exists for opportunistic cleanup only.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the sweep fails.
    fn sweep_expired(&self, before_ms: i64) -> Result<u64, StoreError> {
        let _ = before_ms;
        Ok(0)
    }
}

// ============================================================================
// SECTION: Write Queue
// ============================================================================

/// Background queue for counter write-through from the cache-hit path.
///
/// Implementations perform the write off the request path. Errors are
/// reported to the event sink and never propagated to callers.
pub trait CounterWriteQueue: Send + Sync {
    /// Submits a durable counter update.
    fn enqueue(&self, write: CounterWrite);
}

// ============================================================================
// SECTION: Notification
// ============================================================================

/// Minimal submission summary handed to the notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    /// Submission identifier.
    pub id: SubmissionId,
    /// Applicant full name when supplied.
    pub full_name: Option<String>,
    /// Applicant email when supplied.
    pub email: Option<String>,
    /// Declared form mode.
    #[serde(rename = "formMode")]
    pub mode: FormMode,
}

/// Dispatch errors for notification delivery.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Dispatcher reported an error.
    #[error("dispatch error: {0}")]
    DispatchFailed(String),
}

/// Notification dispatcher responsible for delivering summaries.
pub trait NotificationDispatcher: Send + Sync {
    /// Attempts delivery of a submission summary.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when delivery fails.
    fn dispatch(&self, summary: &SubmissionSummary) -> Result<(), DispatchError>;
}

/// Background queue for notification dispatch.
///
/// Implementations invoke the dispatcher off the request path. Failures are
/// reported to the event sink and never affect the caller's response.
pub trait NotificationQueue: Send + Sync {
    /// Submits a summary for best-effort delivery.
    fn enqueue(&self, summary: SubmissionSummary);
}

// ============================================================================
// SECTION: Step Validator
// ============================================================================

/// Field-level validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Wire name of the offending field.
    pub field: String,
    /// Human-readable message.
    pub message: String,
}

/// Step validation collaborator: pass/fail plus a field-error list.
pub trait StepValidator: Send + Sync {
    /// Validates a creation payload against the mode's first-step table.
    ///
    /// # Errors
    ///
    /// Returns the field errors when required fields are missing.
    fn validate_create(
        &self,
        mode: FormMode,
        patch: &SubmissionPatch,
    ) -> Result<(), Vec<FieldError>>;

    /// Validates a patch against the merged record preview.
    ///
    /// # Errors
    ///
    /// Returns the field errors when the merged record is rejected.
    fn validate_patch(
        &self,
        merged: &Submission,
        patch: &SubmissionPatch,
    ) -> Result<(), Vec<FieldError>>;
}

// ============================================================================
// SECTION: Event Sink
// ============================================================================

/// Structured runtime events emitted by the intake core.
///
/// # Invariants
/// - Event labels are stable for log correlation.
/// - Events never carry raw client identifiers, only hashes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum IntakeEvent {
    /// The durable rate-limit store failed during a check; the request was
    /// allowed through (fail-open).
    RateLimitStoreFailure {
        /// Event timestamp (unix millis).
        timestamp_ms: i64,
        /// Bucket label for the failing check.
        bucket: String,
        /// Failure detail.
        detail: String,
    },
    /// A background counter write failed.
    CounterPersistFailure {
        /// Event timestamp (unix millis).
        timestamp_ms: i64,
        /// Failure detail.
        detail: String,
    },
    /// A notification dispatch failed.
    NotificationFailure {
        /// Event timestamp (unix millis).
        timestamp_ms: i64,
        /// Submission the notification was about.
        submission_id: String,
        /// Failure detail.
        detail: String,
    },
    /// A rate-limit check denied a request.
    RateLimitDenied {
        /// Event timestamp (unix millis).
        timestamp_ms: i64,
        /// Trace identifier of the denied request.
        trace_id: String,
        /// Bucket label for the denying check.
        bucket: String,
    },
    /// A submission record was created.
    SubmissionCreated {
        /// Event timestamp (unix millis).
        timestamp_ms: i64,
        /// Trace identifier of the creating request.
        trace_id: String,
        /// Identifier of the new record.
        submission_id: String,
        /// Declared mode label.
        mode: String,
    },
    /// A submission record was patched.
    SubmissionPatched {
        /// Event timestamp (unix millis).
        timestamp_ms: i64,
        /// Trace identifier of the patching request.
        trace_id: String,
        /// Identifier of the patched record.
        submission_id: String,
    },
}

/// Structured event sink, fire-and-forget from the core's perspective.
pub trait EventSink: Send + Sync {
    /// Records an event.
    fn record(&self, event: &IntakeEvent);
}

/// Event sink that discards everything.
pub struct NoopEventSink;

impl EventSink for NoopEventSink {
    fn record(&self, _event: &IntakeEvent) {}
}
