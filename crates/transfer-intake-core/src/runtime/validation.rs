// crates/transfer-intake-core/src/runtime/validation.rs
// ============================================================================
// Module: Transfer Intake Step Validation
// Description: Table-driven validation of creation and patch payloads.
// Purpose: Enforce per-mode required fields with an explicit patch policy.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Creation payloads are checked against the declared mode's
//! creation-required table; only the first step's fields are mandatory, and
//! full cross-field validation of the record is deferred so applicants can
//! save partial progress and resume.
//!
//! Whether patches are re-validated is an explicit, named policy rather than
//! an implicit gap. [`PatchPolicy::Progressive`] accepts any
//! recognized-field subset; [`PatchPolicy::Strict`] re-checks the mode's
//! required fields against the merged record, so a patch can add fields but
//! never regress a required one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::submission::FormMode;
use crate::core::submission::Submission;
use crate::core::submission::SubmissionPatch;
use crate::interfaces::FieldError;
use crate::interfaces::StepValidator;

// ============================================================================
// SECTION: Patch Policy
// ============================================================================

/// Validation policy applied to patch requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchPolicy {
    /// Accept any recognized-field subset; progressive saves are never
    /// rejected for incompleteness.
    #[default]
    Progressive,
    /// Re-check the mode's required fields against the merged record.
    Strict,
}

// ============================================================================
// SECTION: Mode Table Validator
// ============================================================================

/// Step validator driven by the per-mode required-field tables.
#[derive(Debug, Clone, Copy)]
pub struct ModeTableValidator {
    /// Active patch policy.
    policy: PatchPolicy,
}

impl ModeTableValidator {
    /// Creates a validator with the given patch policy.
    #[must_use]
    pub const fn new(policy: PatchPolicy) -> Self {
        Self {
            policy,
        }
    }

    /// Returns the active patch policy.
    #[must_use]
    pub const fn policy(&self) -> PatchPolicy {
        self.policy
    }
}

impl Default for ModeTableValidator {
    fn default() -> Self {
        Self::new(PatchPolicy::Progressive)
    }
}

impl StepValidator for ModeTableValidator {
    fn validate_create(
        &self,
        mode: FormMode,
        patch: &SubmissionPatch,
    ) -> Result<(), Vec<FieldError>> {
        let errors: Vec<FieldError> = mode
            .creation_required()
            .iter()
            .filter(|required| !required.in_patch(patch))
            .map(|required| FieldError {
                field: required.name.to_string(),
                message: "required field missing".to_string(),
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_patch(
        &self,
        merged: &Submission,
        _patch: &SubmissionPatch,
    ) -> Result<(), Vec<FieldError>> {
        match self.policy {
            PatchPolicy::Progressive => Ok(()),
            PatchPolicy::Strict => {
                let errors: Vec<FieldError> = merged
                    .mode
                    .creation_required()
                    .iter()
                    .filter(|required| !required.in_fields(&merged.fields))
                    .map(|required| FieldError {
                        field: required.name.to_string(),
                        message: "required field missing after merge".to_string(),
                    })
                    .collect();
                if errors.is_empty() {
                    Ok(())
                } else {
                    Err(errors)
                }
            }
        }
    }
}
