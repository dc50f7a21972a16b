// crates/transfer-intake-core/tests/submission.rs
// ============================================================================
// Module: Submission Record Tests
// Description: Verify patch wire format and merge-patch application.
// Purpose: Ensure recognized field names, renames, and merge semantics hold.
// Dependencies: transfer-intake-core, serde_json
// ============================================================================

//! Submission record and patch payload tests.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "Test assertions use unwraps for clarity."
)]

use transfer_intake_core::StudyLevel;
use transfer_intake_core::SubmissionFields;
use transfer_intake_core::SubmissionPatch;
use transfer_intake_core::TermSeason;

#[test]
fn patch_parses_camel_case_wire_names() {
    let patch: SubmissionPatch = serde_json::from_str(
        r#"{
            "fullName": "Alice Example",
            "previousGPA": 3.4,
            "expectedGPA": 3.8,
            "studyLevel": "Undergraduate",
            "termSeason": "Fall",
            "previousCreditHours": 45
        }"#,
    )
    .expect("parse patch");
    assert_eq!(patch.full_name.as_deref(), Some("Alice Example"));
    assert_eq!(patch.previous_gpa, Some(3.4));
    assert_eq!(patch.expected_gpa, Some(3.8));
    assert_eq!(patch.study_level, Some(StudyLevel::Undergraduate));
    assert_eq!(patch.term_season, Some(TermSeason::Fall));
    assert_eq!(patch.previous_credit_hours, Some(45));
}

#[test]
fn patch_rejects_unrecognized_field_names() {
    let result = serde_json::from_str::<SubmissionPatch>(r#"{"favoriteColor":"green"}"#);
    assert!(result.is_err());
    // The snake_case spelling of a renamed field is unrecognized too.
    let result = serde_json::from_str::<SubmissionPatch>(r#"{"previous_gpa":3.4}"#);
    assert!(result.is_err());
}

#[test]
fn explicit_null_leaves_the_field_untouched() {
    let patch: SubmissionPatch =
        serde_json::from_str(r#"{"email": null}"#).expect("parse patch");
    assert_eq!(patch.email, None);

    let mut fields = SubmissionFields {
        email: Some("alice@example.com".to_string()),
        ..SubmissionFields::default()
    };
    fields.apply(&patch);
    assert_eq!(fields.email.as_deref(), Some("alice@example.com"));
}

#[test]
fn apply_overwrites_present_fields_wholesale() {
    let mut fields = SubmissionFields {
        full_name: Some("Alice Example".to_string()),
        major: Some("Mathematics".to_string()),
        ..SubmissionFields::default()
    };
    let patch = SubmissionPatch {
        major: Some("Computer Science".to_string()),
        consent: Some(true),
        ..SubmissionPatch::default()
    };
    fields.apply(&patch);
    assert_eq!(fields.full_name.as_deref(), Some("Alice Example"));
    assert_eq!(fields.major.as_deref(), Some("Computer Science"));
    assert_eq!(fields.consent, Some(true));
}

#[test]
fn stored_fields_roundtrip_through_json() {
    let fields = SubmissionFields {
        full_name: Some("Alice Example".to_string()),
        previous_gpa: Some(3.4),
        term_season: Some(TermSeason::Spring),
        switching_major: Some(false),
        ..SubmissionFields::default()
    };
    let encoded = serde_json::to_vec(&fields).expect("serialize");
    let decoded: SubmissionFields = serde_json::from_slice(&encoded).expect("deserialize");
    assert_eq!(decoded, fields);
}
