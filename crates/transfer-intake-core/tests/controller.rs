// crates/transfer-intake-core/tests/controller.rs
// ============================================================================
// Module: Lifecycle Controller Tests
// Description: Verify create-then-patch orchestration end to end.
// Purpose: Ensure identifier creation, merge-patch, gating, and notification
//          semantics hold over in-memory backends.
// Dependencies: transfer-intake-core
// ============================================================================

//! Submission lifecycle controller tests.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::use_debug,
    reason = "Test setup uses unwraps and panic-based assertions for clarity."
)]

use std::sync::Arc;
use std::sync::Mutex;

use transfer_intake_core::ClientInfo;
use transfer_intake_core::CounterCache;
use transfer_intake_core::CreateSubmission;
use transfer_intake_core::DispatchError;
use transfer_intake_core::EventSink;
use transfer_intake_core::FormMode;
use transfer_intake_core::HashSecret;
use transfer_intake_core::InMemoryRateLimitStore;
use transfer_intake_core::InMemorySubmissionStore;
use transfer_intake_core::InlineCounterWriteQueue;
use transfer_intake_core::InlineNotificationQueue;
use transfer_intake_core::IntakeError;
use transfer_intake_core::IntakeEvent;
use transfer_intake_core::ModeTableValidator;
use transfer_intake_core::NoopEventSink;
use transfer_intake_core::NotificationDispatcher;
use transfer_intake_core::RateLimitSettings;
use transfer_intake_core::RateLimiter;
use transfer_intake_core::SharedRateLimitStore;
use transfer_intake_core::SharedSubmissionStore;
use transfer_intake_core::StudyLevel;
use transfer_intake_core::SubmissionController;
use transfer_intake_core::SubmissionPatch;
use transfer_intake_core::SubmissionStore;
use transfer_intake_core::SubmissionSummary;
use transfer_intake_core::TraceId;

/// Dispatcher that retains every delivered summary.
struct RecordingDispatcher {
    /// Delivered summaries.
    delivered: Mutex<Vec<SubmissionSummary>>,
}

impl RecordingDispatcher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            delivered: Mutex::new(Vec::new()),
        })
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    fn dispatch(&self, summary: &SubmissionSummary) -> Result<(), DispatchError> {
        self.delivered.lock().expect("delivered lock").push(summary.clone());
        Ok(())
    }
}

/// Dispatcher that always fails.
struct FailingDispatcher;

impl NotificationDispatcher for FailingDispatcher {
    fn dispatch(&self, _summary: &SubmissionSummary) -> Result<(), DispatchError> {
        Err(DispatchError::DispatchFailed("smtp relay refused".to_string()))
    }
}

/// Event sink that retains every recorded event.
struct RecordingSink {
    /// Recorded events.
    events: Mutex<Vec<IntakeEvent>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            events: Mutex::new(Vec::new()),
        })
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &IntakeEvent) {
        self.events.lock().expect("events lock").push(event.clone());
    }
}

/// Test fixture bundling the controller with inspectable backends.
struct Fixture {
    /// Controller under test.
    controller: SubmissionController,
    /// Handle onto the shared submission store.
    submissions: InMemorySubmissionStore,
}

/// Builds a controller fixture with the given limiter ceiling, dispatcher,
/// and event sink.
fn fixture(
    max_requests: u32,
    dispatcher: Arc<dyn NotificationDispatcher>,
    events: Arc<dyn EventSink>,
) -> Fixture {
    let secret = HashSecret::new("controller-test-secret");
    let submissions = InMemorySubmissionStore::new();
    let counters = SharedRateLimitStore::from_store(InMemoryRateLimitStore::new());
    let queue = Arc::new(InlineCounterWriteQueue::new(counters.clone(), events.clone()));
    let limiter = RateLimiter::new(
        RateLimitSettings {
            window_ms: 600_000,
            max_requests,
        },
        secret.clone(),
        CounterCache::new(30_000, 1024),
        counters,
        queue,
        events.clone(),
    );
    let controller = SubmissionController::new(
        limiter,
        SharedSubmissionStore::from_store(submissions.clone()),
        Arc::new(ModeTableValidator::default()),
        Arc::new(InlineNotificationQueue::new(dispatcher, events.clone())),
        events,
        secret,
    );
    Fixture {
        controller,
        submissions,
    }
}

/// Returns a client with the given IP and a fixed user agent.
fn client(ip: &str) -> ClientInfo {
    ClientInfo {
        ip: ip.to_string(),
        user_agent: Some("intake-tests/1.0".to_string()),
    }
}

/// Returns a full-mode creation payload matching the first wizard step.
fn full_first_step() -> SubmissionPatch {
    SubmissionPatch {
        full_name: Some("Alice Example".to_string()),
        phone: Some("+15550100100".to_string()),
        address: Some("1 Campus Way, Springfield".to_string()),
        consent: Some(true),
        ..SubmissionPatch::default()
    }
}

#[test]
fn create_persists_exactly_one_record() {
    let fixture = fixture(1000, Arc::new(FailingDispatcher), Arc::new(NoopEventSink));
    let trace = TraceId::from("t-1");
    let receipt = fixture
        .controller
        .create(&trace, CreateSubmission {
            mode: FormMode::Full,
            fields: full_first_step(),
            client: client("203.0.113.7"),
        })
        .expect("create succeeds");

    assert_eq!(fixture.submissions.len().expect("store len"), 1);
    let stored =
        fixture.submissions.load(&receipt.id).expect("load").expect("record present");
    assert_eq!(stored.mode, FormMode::Full);
    assert_eq!(stored.fields.full_name.as_deref(), Some("Alice Example"));
    assert_eq!(stored.user_agent.as_deref(), Some("intake-tests/1.0"));
    assert_eq!(stored.ip_hash.len(), 64);
}

#[test]
fn patch_never_creates_a_second_record() {
    let fixture = fixture(1000, Arc::new(FailingDispatcher), Arc::new(NoopEventSink));
    let trace = TraceId::from("t-1");
    let receipt = fixture
        .controller
        .create(&trace, CreateSubmission {
            mode: FormMode::Full,
            fields: full_first_step(),
            client: client("203.0.113.7"),
        })
        .expect("create succeeds");

    let patch = SubmissionPatch {
        study_level: Some(StudyLevel::Undergraduate),
        ..SubmissionPatch::default()
    };
    fixture
        .controller
        .patch(&trace, &receipt.id, &patch, &client("203.0.113.7"))
        .expect("patch succeeds");

    assert_eq!(fixture.submissions.len().expect("store len"), 1);
}

#[test]
fn sequential_patches_accumulate_disjoint_fields() {
    let fixture = fixture(1000, Arc::new(FailingDispatcher), Arc::new(NoopEventSink));
    let trace = TraceId::from("t-1");
    let receipt = fixture
        .controller
        .create(&trace, CreateSubmission {
            mode: FormMode::Full,
            fields: full_first_step(),
            client: client("203.0.113.7"),
        })
        .expect("create succeeds");

    let study = SubmissionPatch {
        study_level: Some(StudyLevel::Undergraduate),
        ..SubmissionPatch::default()
    };
    let major = SubmissionPatch {
        major: Some("Computer Science".to_string()),
        ..SubmissionPatch::default()
    };
    fixture
        .controller
        .patch(&trace, &receipt.id, &study, &client("203.0.113.7"))
        .expect("first patch succeeds");
    fixture
        .controller
        .patch(&trace, &receipt.id, &major, &client("203.0.113.7"))
        .expect("second patch succeeds");

    let stored =
        fixture.submissions.load(&receipt.id).expect("load").expect("record present");
    assert_eq!(stored.fields.full_name.as_deref(), Some("Alice Example"));
    assert_eq!(stored.fields.phone.as_deref(), Some("+15550100100"));
    assert_eq!(stored.fields.address.as_deref(), Some("1 Campus Way, Springfield"));
    assert_eq!(stored.fields.consent, Some(true));
    assert_eq!(stored.fields.study_level, Some(StudyLevel::Undergraduate));
    assert_eq!(stored.fields.major.as_deref(), Some("Computer Science"));
    assert_eq!(stored.fields.previous_gpa, None);
}

#[test]
fn patch_against_unknown_identifier_is_not_found() {
    let fixture = fixture(1000, Arc::new(FailingDispatcher), Arc::new(NoopEventSink));
    let trace = TraceId::from("t-1");
    let result = fixture.controller.patch(
        &trace,
        &transfer_intake_core::SubmissionId::from("missing"),
        &SubmissionPatch::default(),
        &client("203.0.113.7"),
    );
    assert!(matches!(result, Err(IntakeError::NotFound)));
}

#[test]
fn creation_is_denied_once_the_ip_bucket_is_exhausted() {
    let fixture = fixture(2, Arc::new(FailingDispatcher), Arc::new(NoopEventSink));
    let trace = TraceId::from("t-1");
    for _ in 0..2 {
        fixture
            .controller
            .create(&trace, CreateSubmission {
                mode: FormMode::Partial,
                fields: SubmissionPatch {
                    email: Some("alice@example.com".to_string()),
                    ..full_first_step()
                },
                client: client("203.0.113.7"),
            })
            .expect("create under the ceiling succeeds");
    }

    let denied = fixture.controller.create(&trace, CreateSubmission {
        mode: FormMode::Partial,
        fields: SubmissionPatch {
            email: Some("alice@example.com".to_string()),
            ..full_first_step()
        },
        client: client("203.0.113.7"),
    });
    match denied {
        Err(IntakeError::RateLimitExceeded {
            retry_after_ms,
        }) => assert!(retry_after_ms > 0),
        other => panic!("expected rate limit denial, got {other:?}"),
    }
}

#[test]
fn creation_is_denied_once_the_email_bucket_is_exhausted() {
    let fixture = fixture(2, Arc::new(FailingDispatcher), Arc::new(NoopEventSink));
    let trace = TraceId::from("t-1");
    // Distinct IPs keep the IP bucket quiet; the shared email is the
    // limiting identifier.
    for index in 0..2 {
        fixture
            .controller
            .create(&trace, CreateSubmission {
                mode: FormMode::Partial,
                fields: SubmissionPatch {
                    email: Some("alice@example.com".to_string()),
                    ..full_first_step()
                },
                client: client(&format!("203.0.113.{index}")),
            })
            .expect("create under the ceiling succeeds");
    }

    let denied = fixture.controller.create(&trace, CreateSubmission {
        mode: FormMode::Partial,
        fields: SubmissionPatch {
            email: Some("alice@example.com".to_string()),
            ..full_first_step()
        },
        client: client("203.0.113.99"),
    });
    assert!(matches!(denied, Err(IntakeError::RateLimitExceeded { .. })));
}

#[test]
fn creation_with_missing_step_fields_is_rejected() {
    let fixture = fixture(1000, Arc::new(FailingDispatcher), Arc::new(NoopEventSink));
    let trace = TraceId::from("t-1");
    let result = fixture.controller.create(&trace, CreateSubmission {
        mode: FormMode::Initial,
        fields: SubmissionPatch::default(),
        client: client("203.0.113.7"),
    });
    match result {
        Err(IntakeError::ValidationFailed {
            errors,
        }) => assert!(errors.iter().any(|error| error.field == "studyLevel")),
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(fixture.submissions.is_empty().expect("store empty"));
}

#[test]
fn notification_failure_never_fails_the_creation() {
    let sink = RecordingSink::new();
    let fixture = fixture(1000, Arc::new(FailingDispatcher), sink.clone());
    let trace = TraceId::from("t-1");
    let receipt = fixture
        .controller
        .create(&trace, CreateSubmission {
            mode: FormMode::Full,
            fields: full_first_step(),
            client: client("203.0.113.7"),
        })
        .expect("create succeeds despite notification failure");

    let events = sink.events.lock().expect("events lock");
    assert!(events.iter().any(|event| matches!(
        event,
        IntakeEvent::NotificationFailure { submission_id, .. }
            if submission_id == receipt.id.as_str()
    )));
}

#[test]
fn successful_creation_notifies_with_the_record_summary() {
    let dispatcher = RecordingDispatcher::new();
    let fixture = fixture(1000, dispatcher.clone(), Arc::new(NoopEventSink));
    let trace = TraceId::from("t-1");
    let receipt = fixture
        .controller
        .create(&trace, CreateSubmission {
            mode: FormMode::Full,
            fields: full_first_step(),
            client: client("203.0.113.7"),
        })
        .expect("create succeeds");

    let delivered = dispatcher.delivered.lock().expect("delivered lock");
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].id, receipt.id);
    assert_eq!(delivered[0].mode, FormMode::Full);
    assert_eq!(delivered[0].full_name.as_deref(), Some("Alice Example"));
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(
        IntakeError::RateLimitExceeded {
            retry_after_ms: 0
        }
        .code(),
        "RATE_LIMIT_EXCEEDED"
    );
    assert_eq!(
        IntakeError::ValidationFailed {
            errors: Vec::new()
        }
        .code(),
        "VALIDATION_ERROR"
    );
    assert_eq!(IntakeError::NotFound.code(), "NOT_FOUND");
    assert_eq!(IntakeError::Internal("boom".to_string()).code(), "INTERNAL_ERROR");
}
