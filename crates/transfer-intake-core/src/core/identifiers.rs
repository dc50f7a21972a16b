// crates/transfer-intake-core/src/core/identifiers.rs
// ============================================================================
// Module: Transfer Intake Identifiers
// Description: Canonical opaque identifiers for submissions and requests.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde, rand
// ============================================================================

//! ## Overview
//! This module defines the canonical string-based identifiers used throughout
//! Transfer Intake. Identifiers are opaque and serialize as strings. A
//! submission identifier is assigned exactly once by the server and is
//! immutable afterwards; a trace identifier is generated once per request and
//! threaded through every log line and error response for that request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use rand::Rng;
use serde::Deserialize;
use serde::Serialize;

use crate::core::hashing::hex_encode;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Globally unique submission identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    /// Creates a submission identifier from an existing string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a fresh 128-bit random identifier in lowercase hex.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 16] = rand::thread_rng().r#gen();
        Self(hex_encode(&bytes))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for SubmissionId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SubmissionId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Per-request correlation identifier for logs and error responses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TraceId(String);

impl TraceId {
    /// Creates a trace identifier from an existing string form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generates a trace identifier of the form `{millis}-{hex}`.
    #[must_use]
    pub fn generate(now_ms: i64) -> Self {
        let bytes: [u8; 6] = rand::thread_rng().r#gen();
        Self(format!("{now_ms}-{}", hex_encode(&bytes)))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TraceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TraceId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
