// crates/transfer-intake-core/src/runtime/controller.rs
// ============================================================================
// Module: Transfer Intake Lifecycle Controller
// Description: Create-then-patch orchestration for submission records.
// Purpose: Gate, validate, persist, and notify for every intake request.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The lifecycle controller owns the create-then-patch flow: the first step
//! of a form session creates a skeletal record and returns its identifier;
//! every subsequent step patches named fields onto that record. A second
//! record is never created for the same session, and records are never
//! deleted by the applicant-facing flow.
//!
//! Within one request the rate-limit check always precedes the store
//! mutation. Same-identifier concurrent patches race last-write-wins at the
//! granularity of the fields each request supplies; each individual patch is
//! atomic for the fields it touches. Notification dispatch is handed to a
//! background queue and never awaited.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use thiserror::Error;

use crate::core::hashing::Bucket;
use crate::core::hashing::HashSecret;
use crate::core::hashing::hash_identifier;
use crate::core::identifiers::SubmissionId;
use crate::core::identifiers::TraceId;
use crate::core::submission::FormMode;
use crate::core::submission::Submission;
use crate::core::submission::SubmissionFields;
use crate::core::submission::SubmissionPatch;
use crate::core::time::unix_millis;
use crate::interfaces::EventSink;
use crate::interfaces::FieldError;
use crate::interfaces::IntakeEvent;
use crate::interfaces::NotificationQueue;
use crate::interfaces::StepValidator;
use crate::interfaces::StoreError;
use crate::interfaces::SubmissionStore;
use crate::interfaces::SubmissionSummary;
use crate::runtime::limiter::RateLimiter;
use crate::runtime::store::SharedSubmissionStore;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// Client attribution captured from the transport layer.
///
/// # Invariants
/// - `ip` is already normalized; unknown clients carry the sentinel value.
#[derive(Debug, Clone)]
pub struct ClientInfo {
    /// Normalized client IP address.
    pub ip: String,
    /// Raw user-agent header when present.
    pub user_agent: Option<String>,
}

/// First-step creation request.
#[derive(Debug, Clone)]
pub struct CreateSubmission {
    /// Declared completeness tier, fixed for the record's lifetime.
    pub mode: FormMode,
    /// First-step field payload.
    pub fields: SubmissionPatch,
    /// Client attribution.
    pub client: ClientInfo,
}

/// Acknowledgement returned for successful create and patch calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Identifier of the affected record.
    pub id: SubmissionId,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request-path errors, each with a stable machine-readable code.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// Too many requests from the identifier's bucket.
    #[error("rate limit exceeded")]
    RateLimitExceeded {
        /// Instant at which the limiting window resets (unix millis).
        retry_after_ms: i64,
    },
    /// The payload failed step validation.
    #[error("validation failed")]
    ValidationFailed {
        /// Field-level errors.
        errors: Vec<FieldError>,
    },
    /// The target identifier does not correspond to any record.
    #[error("submission not found")]
    NotFound,
    /// Unexpected store failure; the client should retry.
    #[error("internal failure: {0}")]
    Internal(String),
}

impl IntakeError {
    /// Returns the stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RateLimitExceeded {
                ..
            } => "RATE_LIMIT_EXCEEDED",
            Self::ValidationFailed {
                ..
            } => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<StoreError> for IntakeError {
    fn from(error: StoreError) -> Self {
        Self::Internal(error.to_string())
    }
}

// ============================================================================
// SECTION: Controller
// ============================================================================

/// Orchestrates the create-then-patch submission lifecycle.
pub struct SubmissionController {
    /// Rate limiter gating every mutating request.
    limiter: RateLimiter,
    /// Durable submission store.
    store: SharedSubmissionStore,
    /// Step validation collaborator.
    validator: Arc<dyn StepValidator>,
    /// Background notification queue.
    notifications: Arc<dyn NotificationQueue>,
    /// Event sink for request milestones and denials.
    events: Arc<dyn EventSink>,
    /// Hashing secret for the stored client-identifier hash.
    secret: HashSecret,
}

impl SubmissionController {
    /// Creates a controller from its collaborators.
    #[must_use]
    pub fn new(
        limiter: RateLimiter,
        store: SharedSubmissionStore,
        validator: Arc<dyn StepValidator>,
        notifications: Arc<dyn NotificationQueue>,
        events: Arc<dyn EventSink>,
        secret: HashSecret,
    ) -> Self {
        Self {
            limiter,
            store,
            validator,
            notifications,
            events,
            secret,
        }
    }

    /// Handles a first-step submit: creates the backing record and returns
    /// its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::RateLimitExceeded`] when either the IP bucket
    /// or (if an email was supplied) the email bucket denies the request,
    /// [`IntakeError::ValidationFailed`] when the mode's first-step fields
    /// are missing, and [`IntakeError::Internal`] on store failure.
    pub fn create(
        &self,
        trace: &TraceId,
        request: CreateSubmission,
    ) -> Result<SubmissionReceipt, IntakeError> {
        let now_ms = unix_millis();
        self.gate(trace, &request.client.ip, Bucket::Ip)?;
        if let Some(email) = request.fields.email.as_deref() {
            self.gate(trace, email, Bucket::Email)?;
        }
        self.validator
            .validate_create(request.mode, &request.fields)
            .map_err(|errors| IntakeError::ValidationFailed {
                errors,
            })?;

        let mut fields = SubmissionFields::default();
        fields.apply(&request.fields);
        let submission = Submission {
            id: SubmissionId::generate(),
            mode: request.mode,
            created_at: now_ms,
            ip_hash: hash_identifier(Bucket::Ip, &request.client.ip, &self.secret),
            user_agent: request.client.user_agent,
            fields,
        };
        self.store.create(&submission)?;
        self.events.record(&IntakeEvent::SubmissionCreated {
            timestamp_ms: now_ms,
            trace_id: trace.as_str().to_string(),
            submission_id: submission.id.as_str().to_string(),
            mode: submission.mode.as_str().to_string(),
        });
        self.notifications.enqueue(SubmissionSummary {
            id: submission.id.clone(),
            full_name: submission.fields.full_name.clone(),
            email: submission.fields.email.clone(),
            mode: submission.mode,
        });
        Ok(SubmissionReceipt {
            id: submission.id,
        })
    }

    /// Handles a subsequent-step submit: merge-patches named fields onto the
    /// existing record.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::RateLimitExceeded`] when the IP bucket denies
    /// the request, [`IntakeError::NotFound`] when no record exists for the
    /// identifier, [`IntakeError::ValidationFailed`] under the strict patch
    /// policy, and [`IntakeError::Internal`] on store failure.
    pub fn patch(
        &self,
        trace: &TraceId,
        id: &SubmissionId,
        patch: &SubmissionPatch,
        client: &ClientInfo,
    ) -> Result<SubmissionReceipt, IntakeError> {
        let now_ms = unix_millis();
        self.gate(trace, &client.ip, Bucket::Ip)?;

        let Some(existing) = self.store.load(id)? else {
            return Err(IntakeError::NotFound);
        };
        let mut merged = existing;
        merged.fields.apply(patch);
        self.validator
            .validate_patch(&merged, patch)
            .map_err(|errors| IntakeError::ValidationFailed {
                errors,
            })?;

        let Some(updated) = self.store.patch(id, patch, now_ms)? else {
            return Err(IntakeError::NotFound);
        };
        self.events.record(&IntakeEvent::SubmissionPatched {
            timestamp_ms: now_ms,
            trace_id: trace.as_str().to_string(),
            submission_id: updated.id.as_str().to_string(),
        });
        Ok(SubmissionReceipt {
            id: updated.id,
        })
    }

    /// Reports controller readiness by probing the submission store.
    ///
    /// # Errors
    ///
    /// Returns [`IntakeError::Internal`] when the store is unavailable.
    pub fn readiness(&self) -> Result<(), IntakeError> {
        self.store.readiness().map_err(IntakeError::from)
    }

    /// Runs one bucket's rate-limit gate, recording denials.
    fn gate(&self, trace: &TraceId, identifier: &str, bucket: Bucket) -> Result<(), IntakeError> {
        let decision = self.limiter.check(identifier, bucket);
        if decision.allowed {
            return Ok(());
        }
        self.events.record(&IntakeEvent::RateLimitDenied {
            timestamp_ms: unix_millis(),
            trace_id: trace.as_str().to_string(),
            bucket: bucket.as_str().to_string(),
        });
        Err(IntakeError::RateLimitExceeded {
            retry_after_ms: decision.reset_at,
        })
    }
}
