// crates/transfer-intake-server/src/notify.rs
// ============================================================================
// Module: Intake Notification Dispatch
// Description: Webhook delivery of submission summaries.
// Purpose: Implement the notification collaborator over HTTP.
// Dependencies: transfer-intake-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! The webhook notifier posts a minimal submission summary to a configured
//! endpoint so staff tooling can react to new submissions. Delivery is
//! best-effort: the dispatcher only ever runs inside a background queue, and
//! its failures are recorded, never surfaced to the applicant's request.
//! When no endpoint is configured the no-op notifier is wired in instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use transfer_intake_core::DispatchError;
use transfer_intake_core::NotificationDispatcher;
use transfer_intake_core::SubmissionSummary;

// ============================================================================
// SECTION: Webhook Notifier
// ============================================================================

/// Notification dispatcher posting summaries to a webhook endpoint.
pub struct WebhookNotifier {
    /// Destination endpoint.
    endpoint: String,
    /// Blocking HTTP client with the configured timeout.
    client: reqwest::blocking::Client,
}

impl WebhookNotifier {
    /// Creates a webhook notifier with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError`] when the HTTP client cannot be built.
    pub fn new(endpoint: impl Into<String>, timeout_ms: u64) -> Result<Self, DispatchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(|err| DispatchError::DispatchFailed(err.to_string()))?;
        Ok(Self {
            endpoint: endpoint.into(),
            client,
        })
    }
}

impl NotificationDispatcher for WebhookNotifier {
    fn dispatch(&self, summary: &SubmissionSummary) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(summary)
            .send()
            .map_err(|err| DispatchError::DispatchFailed(err.to_string()))?;
        if !response.status().is_success() {
            return Err(DispatchError::DispatchFailed(format!(
                "webhook returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Noop Notifier
// ============================================================================

/// Notification dispatcher that silently accepts every summary.
///
/// Wired in when notifications are disabled, so the controller path is
/// identical either way.
pub struct NoopNotifier;

impl NotificationDispatcher for NoopNotifier {
    fn dispatch(&self, _summary: &SubmissionSummary) -> Result<(), DispatchError> {
        Ok(())
    }
}
