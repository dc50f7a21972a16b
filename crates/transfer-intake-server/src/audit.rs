// crates/transfer-intake-server/src/audit.rs
// ============================================================================
// Module: Intake Audit Logging
// Description: Structured audit events for intake request handling.
// Purpose: Emit redacted audit logs without hard dependencies.
// Dependencies: transfer-intake-core, serde
// ============================================================================

//! ## Overview
//! This module defines the per-request audit event and the sinks it can be
//! routed to. The same sinks also receive the core runtime's
//! [`IntakeEvent`]s (swallowed failures, denials, milestones), so one
//! configured destination carries every structured line for a request,
//! correlated by trace identifier. Raw client identifiers never appear in
//! events; only hashes do.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use serde::Serialize;
use transfer_intake_core::EventSink;
use transfer_intake_core::IntakeEvent;
use transfer_intake_core::unix_millis;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Request outcome classification for audit lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditOutcome {
    /// Request succeeded.
    Success,
    /// Request failed due to client input (validation, rate limit, missing
    /// record).
    ClientError,
    /// Request failed due to a server-side fault.
    ServerError,
}

/// Intake audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct IntakeAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: i64,
    /// Trace identifier for the request.
    pub trace_id: String,
    /// Endpoint label.
    pub endpoint: &'static str,
    /// Request outcome.
    pub outcome: AuditOutcome,
    /// HTTP status returned.
    pub status: u16,
    /// Stable error code when the request failed.
    pub error_code: Option<&'static str>,
    /// Request body size in bytes.
    pub request_bytes: usize,
}

impl IntakeAuditEvent {
    /// Creates a new audit event with a consistent timestamp.
    #[must_use]
    pub fn new(
        trace_id: String,
        endpoint: &'static str,
        outcome: AuditOutcome,
        status: u16,
        error_code: Option<&'static str>,
        request_bytes: usize,
    ) -> Self {
        Self {
            event: "intake_request",
            timestamp_ms: unix_millis(),
            trace_id,
            endpoint,
            outcome,
            status,
            error_code,
            request_bytes,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for intake request events.
pub trait IntakeAuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, event: &IntakeAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl IntakeAuditSink for StderrAuditSink {
    fn record(&self, event: &IntakeAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

impl EventSink for StderrAuditSink {
    fn record(&self, event: &IntakeEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized line to the log file.
    fn write_line(&self, payload: &str) {
        if let Ok(mut file) = self.file.lock() {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl IntakeAuditSink for FileAuditSink {
    fn record(&self, event: &IntakeAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.write_line(&payload);
        }
    }
}

impl EventSink for FileAuditSink {
    fn record(&self, event: &IntakeEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            self.write_line(&payload);
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl IntakeAuditSink for NoopAuditSink {
    fn record(&self, _event: &IntakeAuditEvent) {}
}

impl EventSink for NoopAuditSink {
    fn record(&self, _event: &IntakeEvent) {}
}
