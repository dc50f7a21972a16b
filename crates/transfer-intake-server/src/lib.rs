// crates/transfer-intake-server/src/lib.rs
// ============================================================================
// Module: Transfer Intake Server
// Description: HTTP API, audit sinks, and background queues for the intake.
// Purpose: Expose the submission lifecycle over axum with async side effects.
// Dependencies: transfer-intake-core, transfer-intake-config, axum, tokio
// ============================================================================

//! ## Overview
//! The server crate wires the intake core to the outside world: an axum JSON
//! API for submission creation and patching, tokio-backed queues for the
//! counter write-through and notification dispatch, a webhook notification
//! dispatcher, and structured audit sinks. All request inputs are untrusted
//! and validated before they reach the controller.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod notify;
pub mod server;
pub mod tasks;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditOutcome;
pub use audit::FileAuditSink;
pub use audit::IntakeAuditEvent;
pub use audit::IntakeAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use notify::NoopNotifier;
pub use notify::WebhookNotifier;
pub use server::HttpServer;
pub use server::ServerError;
pub use tasks::TokioCounterWriteQueue;
pub use tasks::TokioNotificationQueue;
