// crates/transfer-intake-core/src/core/mod.rs
// ============================================================================
// Module: Transfer Intake Core Types
// Description: Canonical submission and rate-limit data structures.
// Purpose: Provide stable, serializable types for intake records and counters.
// Dependencies: serde, sha2, rand
// ============================================================================

//! ## Overview
//! Core types define the submission record, the per-bucket rate-limit
//! counter, and the hashed identifiers that key both. These types are the
//! canonical source of truth for any derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod counter;
pub mod hashing;
pub mod identifiers;
pub mod submission;
pub mod time;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use counter::CounterWrite;
pub use counter::RateLimitCounter;
pub use hashing::Bucket;
pub use hashing::CounterKey;
pub use hashing::HashSecret;
pub use hashing::UNKNOWN_CLIENT_IP;
pub use hashing::hash_identifier;
pub use hashing::sha256_hex;
pub use identifiers::SubmissionId;
pub use identifiers::TraceId;
pub use submission::CommunicationChannel;
pub use submission::FormMode;
pub use submission::RequiredField;
pub use submission::StudyLevel;
pub use submission::Submission;
pub use submission::SubmissionFields;
pub use submission::SubmissionPatch;
pub use submission::TermSeason;
pub use time::unix_millis;
