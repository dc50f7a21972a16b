// crates/transfer-intake-core/src/lib.rs
// ============================================================================
// Module: Transfer Intake Core Library
// Description: Public API surface for the Transfer Intake core.
// Purpose: Expose core types, interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Transfer Intake core implements the progressive-submission lifecycle and
//! the hybrid cached/persistent rate limiter behind the intake API. It is
//! backend-agnostic and integrates through explicit interfaces rather than
//! embedding into a specific HTTP framework or datastore.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use interfaces::CounterWriteQueue;
pub use interfaces::DispatchError;
pub use interfaces::EventSink;
pub use interfaces::FieldError;
pub use interfaces::IntakeEvent;
pub use interfaces::ListRequest;
pub use interfaces::NoopEventSink;
pub use interfaces::NotificationDispatcher;
pub use interfaces::NotificationQueue;
pub use interfaces::RateLimitStore;
pub use interfaces::StepValidator;
pub use interfaces::StoreError;
pub use interfaces::SubmissionPage;
pub use interfaces::SubmissionStore;
pub use interfaces::SubmissionSummary;
pub use runtime::ClientInfo;
pub use runtime::CounterCache;
pub use runtime::CreateSubmission;
pub use runtime::InMemoryRateLimitStore;
pub use runtime::InMemorySubmissionStore;
pub use runtime::InlineCounterWriteQueue;
pub use runtime::InlineNotificationQueue;
pub use runtime::IntakeError;
pub use runtime::ModeTableValidator;
pub use runtime::PatchPolicy;
pub use runtime::RateLimitDecision;
pub use runtime::RateLimitSettings;
pub use runtime::RateLimiter;
pub use runtime::SharedRateLimitStore;
pub use runtime::SharedSubmissionStore;
pub use runtime::SubmissionController;
pub use runtime::SubmissionReceipt;
