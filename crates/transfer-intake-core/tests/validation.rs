// crates/transfer-intake-core/tests/validation.rs
// ============================================================================
// Module: Step Validation Tests
// Description: Verify per-mode required tables and the patch policy split.
// Purpose: Ensure creation steps and patches are validated as configured.
// Dependencies: transfer-intake-core
// ============================================================================

//! Step validation tests.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test assertions use unwraps for clarity."
)]

use transfer_intake_core::FormMode;
use transfer_intake_core::ModeTableValidator;
use transfer_intake_core::PatchPolicy;
use transfer_intake_core::StepValidator;
use transfer_intake_core::StudyLevel;
use transfer_intake_core::Submission;
use transfer_intake_core::SubmissionFields;
use transfer_intake_core::SubmissionId;
use transfer_intake_core::SubmissionPatch;
use transfer_intake_core::TermSeason;

/// Builds a patch covering the partial-mode contact fields.
fn contact_patch() -> SubmissionPatch {
    SubmissionPatch {
        full_name: Some("Alice Example".to_string()),
        email: Some("alice@example.com".to_string()),
        phone: Some("+15550100100".to_string()),
        ..SubmissionPatch::default()
    }
}

/// Builds a record in the given mode with the supplied fields.
fn record(mode: FormMode, fields: SubmissionFields) -> Submission {
    Submission {
        id: SubmissionId::from("sub-1"),
        mode,
        created_at: 1_700_000_000_000,
        ip_hash: "deadbeef".to_string(),
        user_agent: None,
        fields,
    }
}

#[test]
fn partial_creation_accepts_contact_fields() {
    let validator = ModeTableValidator::default();
    assert!(validator.validate_create(FormMode::Partial, &contact_patch()).is_ok());
}

#[test]
fn initial_creation_lists_every_missing_field() {
    let validator = ModeTableValidator::default();
    let errors = validator
        .validate_create(FormMode::Initial, &SubmissionPatch::default())
        .unwrap_err();
    let fields: Vec<&str> = errors.iter().map(|error| error.field.as_str()).collect();
    assert_eq!(fields, vec![
        "fullName",
        "email",
        "phone",
        "studyLevel",
        "currentCollege",
        "major",
        "termSeason",
    ]);
}

#[test]
fn initial_creation_accepts_the_first_step_payload() {
    let validator = ModeTableValidator::default();
    let patch = SubmissionPatch {
        study_level: Some(StudyLevel::Undergraduate),
        current_college: Some("Metro Community College".to_string()),
        major: Some("Computer Science".to_string()),
        term_season: Some(TermSeason::Fall),
        ..contact_patch()
    };
    assert!(validator.validate_create(FormMode::Initial, &patch).is_ok());
}

#[test]
fn full_creation_requires_address_but_not_email() {
    let validator = ModeTableValidator::default();
    let mut patch = contact_patch();
    patch.email = None;
    let errors = validator.validate_create(FormMode::Full, &patch).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "address");

    patch.address = Some("1 Campus Way, Springfield".to_string());
    assert!(validator.validate_create(FormMode::Full, &patch).is_ok());
}

#[test]
fn progressive_policy_accepts_incomplete_merges() {
    let validator = ModeTableValidator::new(PatchPolicy::Progressive);
    let merged = record(FormMode::Full, SubmissionFields::default());
    assert!(validator.validate_patch(&merged, &SubmissionPatch::default()).is_ok());
}

#[test]
fn strict_policy_rejects_merges_missing_required_fields() {
    let validator = ModeTableValidator::new(PatchPolicy::Strict);
    let merged = record(FormMode::Full, SubmissionFields {
        full_name: Some("Alice Example".to_string()),
        phone: Some("+15550100100".to_string()),
        ..SubmissionFields::default()
    });
    let errors = validator.validate_patch(&merged, &SubmissionPatch::default()).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "address");
}

#[test]
fn strict_policy_accepts_complete_merges() {
    let validator = ModeTableValidator::new(PatchPolicy::Strict);
    let merged = record(FormMode::Full, SubmissionFields {
        full_name: Some("Alice Example".to_string()),
        phone: Some("+15550100100".to_string()),
        address: Some("1 Campus Way, Springfield".to_string()),
        ..SubmissionFields::default()
    });
    assert!(validator.validate_patch(&merged, &SubmissionPatch::default()).is_ok());
}
