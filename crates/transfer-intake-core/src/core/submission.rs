// crates/transfer-intake-core/src/core/submission.rs
// ============================================================================
// Module: Transfer Intake Submission Records
// Description: Progressive submission record, patch payload, and mode tables.
// Purpose: Provide the canonical applicant record and merge-patch semantics.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A submission is created once by the first step of a form flow and mutated
//! by every subsequent step's patch. The declared [`FormMode`] is fixed at
//! creation and selects which fields the record eventually requires; each
//! mode's creation-required field set is enumerated in a table consulted at
//! validation time. All business fields are independently optional until
//! supplied, and mutation is whole-field replacement only: a patch writes
//! exactly the fields present in the payload and leaves the rest untouched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::SubmissionId;

// ============================================================================
// SECTION: Form Modes
// ============================================================================

/// Declared completeness tier of a submission.
///
/// # Invariants
/// - Set at creation and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMode {
    /// Short interest form collected on the landing flow.
    Initial,
    /// Minimal contact form (name, email, phone).
    Partial,
    /// Full multi-step advising form.
    Full,
}

impl FormMode {
    /// Returns the stable mode label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Partial => "partial",
            Self::Full => "full",
        }
    }

    /// Returns the fields that must be present when a submission is created
    /// in this mode. Only the first step's fields are required; full
    /// cross-field validation of the record is deferred.
    #[must_use]
    pub const fn creation_required(self) -> &'static [RequiredField] {
        match self {
            Self::Initial => INITIAL_CREATION_REQUIRED,
            Self::Partial => PARTIAL_CREATION_REQUIRED,
            Self::Full => FULL_CREATION_REQUIRED,
        }
    }
}

// ============================================================================
// SECTION: Field Enums
// ============================================================================

/// Study level of the applicant's current program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudyLevel {
    /// Undergraduate program.
    Undergraduate,
    /// Graduate program.
    Graduate,
    /// Associate program.
    Associate,
    /// Certificate program.
    Certificate,
    /// Any other program type.
    Other,
}

/// Academic term season for the planned transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TermSeason {
    /// Spring term.
    Spring,
    /// Summer term.
    Summer,
    /// Fall term.
    Fall,
    /// Any other term.
    Other,
}

/// Preferred communication channel for follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommunicationChannel {
    /// Facebook contact.
    Facebook,
    /// LinkedIn contact.
    LinkedIn,
    /// WhatsApp contact.
    Whatsapp,
    /// Instagram contact.
    Instagram,
    /// Twitter contact.
    Twitter,
    /// Email contact.
    Email,
    /// Phone contact.
    Phone,
}

// ============================================================================
// SECTION: Business Fields
// ============================================================================

/// Progressively collected business fields of a submission.
///
/// # Invariants
/// - Every field is independently optional until supplied by some step.
/// - Fields are only mutated through [`SubmissionFields::apply`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubmissionFields {
    /// Applicant full name.
    pub full_name: Option<String>,
    /// Applicant email address.
    pub email: Option<String>,
    /// Applicant phone number.
    pub phone: Option<String>,
    /// Date of birth (ISO-8601 date string as submitted).
    pub date_of_birth: Option<String>,
    /// Mailing address.
    pub address: Option<String>,
    /// Country of birth.
    pub country_of_birth: Option<String>,
    /// Consent flag for contact and data handling.
    pub consent: Option<bool>,
    /// Study level of the current program.
    pub study_level: Option<StudyLevel>,
    /// Previously attended college.
    pub previous_college: Option<String>,
    /// Credit hours completed at the previous college.
    pub previous_credit_hours: Option<u32>,
    /// Currently attended college.
    pub current_college: Option<String>,
    /// Credit hours completed at the current college.
    pub current_credit_hours: Option<u32>,
    /// Intended transfer destination college.
    pub intended_college: Option<String>,
    /// Credit hours planned at the destination.
    pub planned_credit_hours: Option<u32>,
    /// Planned transfer year.
    pub term_year: Option<u32>,
    /// Planned transfer term season.
    pub term_season: Option<TermSeason>,
    /// Intended major.
    pub major: Option<String>,
    /// Whether the applicant is switching majors.
    pub switching_major: Option<bool>,
    /// Details about the major switch.
    pub switch_major_details: Option<String>,
    /// GPA at the previous institution.
    #[serde(rename = "previousGPA")]
    pub previous_gpa: Option<f64>,
    /// Expected GPA at the destination.
    #[serde(rename = "expectedGPA")]
    pub expected_gpa: Option<f64>,
    /// Tuition paid at the previous institution.
    pub previous_tuition: Option<f64>,
    /// Tuition paid at the current institution.
    pub current_tuition: Option<f64>,
    /// Whether the applicant holds a scholarship.
    pub has_scholarship: Option<bool>,
    /// Scholarship amount when held.
    pub scholarship_amount: Option<f64>,
    /// Amount paid per semester.
    pub paying_per_semester: Option<f64>,
    /// Free-text reason for transferring.
    pub transfer_reason: Option<String>,
    /// Free-text reason for choosing the institution.
    pub institution_reason: Option<String>,
    /// Extracurricular activities.
    pub extracurriculars: Option<String>,
    /// Immigration status.
    pub immigration_status: Option<String>,
    /// Special circumstances (free text).
    pub special_circumstances: Option<String>,
    /// Referral source person.
    pub referred_by: Option<String>,
    /// How the applicant heard about the service.
    pub how_did_you_know: Option<String>,
    /// Link for the preferred communication channel.
    pub preferred_channel_link: Option<String>,
    /// Preferred communication channel.
    pub preferred_channel: Option<CommunicationChannel>,
}

impl SubmissionFields {
    /// Applies a merge-patch: fields present in the patch replace the stored
    /// value wholesale, absent fields are left untouched.
    pub fn apply(&mut self, patch: &SubmissionPatch) {
        if patch.full_name.is_some() {
            self.full_name.clone_from(&patch.full_name);
        }
        if patch.email.is_some() {
            self.email.clone_from(&patch.email);
        }
        if patch.phone.is_some() {
            self.phone.clone_from(&patch.phone);
        }
        if patch.date_of_birth.is_some() {
            self.date_of_birth.clone_from(&patch.date_of_birth);
        }
        if patch.address.is_some() {
            self.address.clone_from(&patch.address);
        }
        if patch.country_of_birth.is_some() {
            self.country_of_birth.clone_from(&patch.country_of_birth);
        }
        if patch.consent.is_some() {
            self.consent = patch.consent;
        }
        if patch.study_level.is_some() {
            self.study_level = patch.study_level;
        }
        if patch.previous_college.is_some() {
            self.previous_college.clone_from(&patch.previous_college);
        }
        if patch.previous_credit_hours.is_some() {
            self.previous_credit_hours = patch.previous_credit_hours;
        }
        if patch.current_college.is_some() {
            self.current_college.clone_from(&patch.current_college);
        }
        if patch.current_credit_hours.is_some() {
            self.current_credit_hours = patch.current_credit_hours;
        }
        if patch.intended_college.is_some() {
            self.intended_college.clone_from(&patch.intended_college);
        }
        if patch.planned_credit_hours.is_some() {
            self.planned_credit_hours = patch.planned_credit_hours;
        }
        if patch.term_year.is_some() {
            self.term_year = patch.term_year;
        }
        if patch.term_season.is_some() {
            self.term_season = patch.term_season;
        }
        if patch.major.is_some() {
            self.major.clone_from(&patch.major);
        }
        if patch.switching_major.is_some() {
            self.switching_major = patch.switching_major;
        }
        if patch.switch_major_details.is_some() {
            self.switch_major_details.clone_from(&patch.switch_major_details);
        }
        if patch.previous_gpa.is_some() {
            self.previous_gpa = patch.previous_gpa;
        }
        if patch.expected_gpa.is_some() {
            self.expected_gpa = patch.expected_gpa;
        }
        if patch.previous_tuition.is_some() {
            self.previous_tuition = patch.previous_tuition;
        }
        if patch.current_tuition.is_some() {
            self.current_tuition = patch.current_tuition;
        }
        if patch.has_scholarship.is_some() {
            self.has_scholarship = patch.has_scholarship;
        }
        if patch.scholarship_amount.is_some() {
            self.scholarship_amount = patch.scholarship_amount;
        }
        if patch.paying_per_semester.is_some() {
            self.paying_per_semester = patch.paying_per_semester;
        }
        if patch.transfer_reason.is_some() {
            self.transfer_reason.clone_from(&patch.transfer_reason);
        }
        if patch.institution_reason.is_some() {
            self.institution_reason.clone_from(&patch.institution_reason);
        }
        if patch.extracurriculars.is_some() {
            self.extracurriculars.clone_from(&patch.extracurriculars);
        }
        if patch.immigration_status.is_some() {
            self.immigration_status.clone_from(&patch.immigration_status);
        }
        if patch.special_circumstances.is_some() {
            self.special_circumstances.clone_from(&patch.special_circumstances);
        }
        if patch.referred_by.is_some() {
            self.referred_by.clone_from(&patch.referred_by);
        }
        if patch.how_did_you_know.is_some() {
            self.how_did_you_know.clone_from(&patch.how_did_you_know);
        }
        if patch.preferred_channel_link.is_some() {
            self.preferred_channel_link.clone_from(&patch.preferred_channel_link);
        }
        if patch.preferred_channel.is_some() {
            self.preferred_channel = patch.preferred_channel;
        }
    }
}

// ============================================================================
// SECTION: Patch Payload
// ============================================================================

/// Merge-patch payload for a submission step.
///
/// Every field mirrors [`SubmissionFields`]; only fields present in the
/// request payload are written. Unknown field names are rejected at
/// deserialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SubmissionPatch {
    /// Applicant full name.
    pub full_name: Option<String>,
    /// Applicant email address.
    pub email: Option<String>,
    /// Applicant phone number.
    pub phone: Option<String>,
    /// Date of birth (ISO-8601 date string as submitted).
    pub date_of_birth: Option<String>,
    /// Mailing address.
    pub address: Option<String>,
    /// Country of birth.
    pub country_of_birth: Option<String>,
    /// Consent flag for contact and data handling.
    pub consent: Option<bool>,
    /// Study level of the current program.
    pub study_level: Option<StudyLevel>,
    /// Previously attended college.
    pub previous_college: Option<String>,
    /// Credit hours completed at the previous college.
    pub previous_credit_hours: Option<u32>,
    /// Currently attended college.
    pub current_college: Option<String>,
    /// Credit hours completed at the current college.
    pub current_credit_hours: Option<u32>,
    /// Intended transfer destination college.
    pub intended_college: Option<String>,
    /// Credit hours planned at the destination.
    pub planned_credit_hours: Option<u32>,
    /// Planned transfer year.
    pub term_year: Option<u32>,
    /// Planned transfer term season.
    pub term_season: Option<TermSeason>,
    /// Intended major.
    pub major: Option<String>,
    /// Whether the applicant is switching majors.
    pub switching_major: Option<bool>,
    /// Details about the major switch.
    pub switch_major_details: Option<String>,
    /// GPA at the previous institution.
    #[serde(rename = "previousGPA")]
    pub previous_gpa: Option<f64>,
    /// Expected GPA at the destination.
    #[serde(rename = "expectedGPA")]
    pub expected_gpa: Option<f64>,
    /// Tuition paid at the previous institution.
    pub previous_tuition: Option<f64>,
    /// Tuition paid at the current institution.
    pub current_tuition: Option<f64>,
    /// Whether the applicant holds a scholarship.
    pub has_scholarship: Option<bool>,
    /// Scholarship amount when held.
    pub scholarship_amount: Option<f64>,
    /// Amount paid per semester.
    pub paying_per_semester: Option<f64>,
    /// Free-text reason for transferring.
    pub transfer_reason: Option<String>,
    /// Free-text reason for choosing the institution.
    pub institution_reason: Option<String>,
    /// Extracurricular activities.
    pub extracurriculars: Option<String>,
    /// Immigration status.
    pub immigration_status: Option<String>,
    /// Special circumstances (free text).
    pub special_circumstances: Option<String>,
    /// Referral source person.
    pub referred_by: Option<String>,
    /// How the applicant heard about the service.
    pub how_did_you_know: Option<String>,
    /// Link for the preferred communication channel.
    pub preferred_channel_link: Option<String>,
    /// Preferred communication channel.
    pub preferred_channel: Option<CommunicationChannel>,
}

// ============================================================================
// SECTION: Submission Record
// ============================================================================

/// A single applicant's progressively collected record.
///
/// # Invariants
/// - `id`, `mode`, `created_at`, `ip_hash`, and `user_agent` are set at
///   creation and immutable afterwards.
/// - `ip_hash` and `user_agent` are never returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    /// Server-generated submission identifier.
    pub id: SubmissionId,
    /// Declared completeness tier, fixed at creation.
    #[serde(rename = "formMode")]
    pub mode: FormMode,
    /// Creation timestamp (unix millis), set once.
    pub created_at: i64,
    /// Hashed client identifier recorded at creation.
    pub ip_hash: String,
    /// Raw client user-agent recorded at creation.
    #[serde(rename = "ua")]
    pub user_agent: Option<String>,
    /// Progressively collected business fields.
    #[serde(flatten)]
    pub fields: SubmissionFields,
}

// ============================================================================
// SECTION: Required-Field Tables
// ============================================================================

/// Presence probe over a patch payload.
type PatchProbe = fn(&SubmissionPatch) -> bool;
/// Presence probe over stored fields.
type FieldProbe = fn(&SubmissionFields) -> bool;

/// One required field in a mode's creation table.
pub struct RequiredField {
    /// Wire name reported in validation errors.
    pub name: &'static str,
    /// Probe for presence in a patch payload.
    patch_present: PatchProbe,
    /// Probe for presence in stored fields.
    field_present: FieldProbe,
}

impl RequiredField {
    /// Returns true when the field is present in the patch payload.
    #[must_use]
    pub fn in_patch(&self, patch: &SubmissionPatch) -> bool {
        (self.patch_present)(patch)
    }

    /// Returns true when the field is present in the stored record.
    #[must_use]
    pub fn in_fields(&self, fields: &SubmissionFields) -> bool {
        (self.field_present)(fields)
    }
}

/// Creation-required fields for partial-mode submissions.
const PARTIAL_CREATION_REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "fullName",
        patch_present: |patch| patch.full_name.is_some(),
        field_present: |fields| fields.full_name.is_some(),
    },
    RequiredField {
        name: "email",
        patch_present: |patch| patch.email.is_some(),
        field_present: |fields| fields.email.is_some(),
    },
    RequiredField {
        name: "phone",
        patch_present: |patch| patch.phone.is_some(),
        field_present: |fields| fields.phone.is_some(),
    },
];

/// Creation-required fields for initial-mode submissions.
const INITIAL_CREATION_REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "fullName",
        patch_present: |patch| patch.full_name.is_some(),
        field_present: |fields| fields.full_name.is_some(),
    },
    RequiredField {
        name: "email",
        patch_present: |patch| patch.email.is_some(),
        field_present: |fields| fields.email.is_some(),
    },
    RequiredField {
        name: "phone",
        patch_present: |patch| patch.phone.is_some(),
        field_present: |fields| fields.phone.is_some(),
    },
    RequiredField {
        name: "studyLevel",
        patch_present: |patch| patch.study_level.is_some(),
        field_present: |fields| fields.study_level.is_some(),
    },
    RequiredField {
        name: "currentCollege",
        patch_present: |patch| patch.current_college.is_some(),
        field_present: |fields| fields.current_college.is_some(),
    },
    RequiredField {
        name: "major",
        patch_present: |patch| patch.major.is_some(),
        field_present: |fields| fields.major.is_some(),
    },
    RequiredField {
        name: "termSeason",
        patch_present: |patch| patch.term_season.is_some(),
        field_present: |fields| fields.term_season.is_some(),
    },
];

/// Creation-required fields for full-mode submissions. Email is optional in
/// the full flow; the first wizard step collects identity and address.
const FULL_CREATION_REQUIRED: &[RequiredField] = &[
    RequiredField {
        name: "fullName",
        patch_present: |patch| patch.full_name.is_some(),
        field_present: |fields| fields.full_name.is_some(),
    },
    RequiredField {
        name: "phone",
        patch_present: |patch| patch.phone.is_some(),
        field_present: |fields| fields.phone.is_some(),
    },
    RequiredField {
        name: "address",
        patch_present: |patch| patch.address.is_some(),
        field_present: |fields| fields.address.is_some(),
    },
];
