// crates/transfer-intake-core/src/core/hashing.rs
// ============================================================================
// Module: Transfer Intake Identifier Hashing
// Description: Salted, bucket-namespaced one-way hashing of client identifiers.
// Purpose: Derive rate-limit keys and privacy-preserving stored values.
// Dependencies: serde, sha2
// ============================================================================

//! ## Overview
//! Client identifiers (IP addresses, email addresses) are never stored or
//! keyed in the clear. Each identifier is hashed with SHA-256 over
//! `"{bucket}:{identifier}:{secret}"`, so the same raw identifier produces
//! different digests for different buckets and cross-bucket correlation is
//! not possible. Hashing is deterministic within a process lifetime; the
//! secret is injected at startup and immutable afterwards.
//!
//! Callers normalize unknown client IPs to [`UNKNOWN_CLIENT_IP`] before
//! hashing, so all unknown clients share a single bucket. That collision is a
//! documented tradeoff, not a defect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Sentinel identifier for clients whose IP address cannot be determined.
pub const UNKNOWN_CLIENT_IP: &str = "unknown";

// ============================================================================
// SECTION: Buckets
// ============================================================================

/// Rate-limit counting scope for a hashed identifier.
///
/// # Invariants
/// - Labels are stable; they participate in key derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    /// Per-client-IP bucket.
    Ip,
    /// Per-email-address bucket.
    Email,
}

impl Bucket {
    /// Returns the stable bucket label used in key derivation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ip => "ip",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Secret
// ============================================================================

/// Process-wide hashing secret.
///
/// # Invariants
/// - The secret value never appears in `Debug` output or logs.
#[derive(Clone)]
pub struct HashSecret(String);

impl HashSecret {
    /// Creates a hashing secret from its raw value.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw secret for key derivation.
    #[must_use]
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for HashSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HashSecret(redacted)")
    }
}

// ============================================================================
// SECTION: Counter Keys
// ============================================================================

/// Hashed rate-limit bucket key.
///
/// # Invariants
/// - Keys are lowercase hex SHA-256 digests; raw identifiers never leave
///   the derivation function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CounterKey(String);

impl CounterKey {
    /// Derives the bucket key for a raw identifier.
    #[must_use]
    pub fn derive(bucket: Bucket, identifier: &str, secret: &HashSecret) -> Self {
        Self(hash_identifier(bucket, identifier, secret))
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Hashing Helpers
// ============================================================================

/// Hashes a raw identifier into its bucket-namespaced digest.
///
/// Deterministic and one-way. Empty identifiers hash like any other string;
/// normalization is a caller responsibility.
#[must_use]
pub fn hash_identifier(bucket: Bucket, identifier: &str, secret: &HashSecret) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bucket.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(identifier.as_bytes());
    hasher.update(b":");
    hasher.update(secret.expose().as_bytes());
    hex_encode(&hasher.finalize())
}

/// Hashes raw bytes to a lowercase hex SHA-256 digest.
///
/// Used by durable stores for record integrity checks.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex_encode(&hasher.finalize())
}

/// Encodes bytes as a lowercase hex string.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push(HEX[(byte >> 4) as usize] as char);
        out.push(HEX[(byte & 0x0f) as usize] as char);
    }
    out
}
