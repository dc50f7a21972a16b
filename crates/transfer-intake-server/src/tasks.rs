// crates/transfer-intake-server/src/tasks.rs
// ============================================================================
// Module: Intake Background Queues
// Description: Tokio-backed queues for fire-and-forget side effects.
// Purpose: Keep counter persistence and notifications off the request path.
// Dependencies: transfer-intake-core, tokio
// ============================================================================

//! ## Overview
//! These queues implement the write-behind contract with tokio: work is
//! handed to `spawn_blocking`, the caller returns immediately, and failures
//! are recorded to the event sink. Nothing here is ever awaited by a request
//! handler. Outside a runtime context (unit tests, shutdown paths) the work
//! runs inline instead of being dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use transfer_intake_core::CounterWrite;
use transfer_intake_core::CounterWriteQueue;
use transfer_intake_core::EventSink;
use transfer_intake_core::IntakeEvent;
use transfer_intake_core::NotificationDispatcher;
use transfer_intake_core::NotificationQueue;
use transfer_intake_core::RateLimitStore;
use transfer_intake_core::SharedRateLimitStore;
use transfer_intake_core::SubmissionSummary;
use transfer_intake_core::unix_millis;

// ============================================================================
// SECTION: Counter Write Queue
// ============================================================================

/// Counter write queue backed by tokio blocking tasks.
pub struct TokioCounterWriteQueue {
    /// Durable counter store.
    store: SharedRateLimitStore,
    /// Event sink for swallowed failures.
    events: Arc<dyn EventSink>,
}

impl TokioCounterWriteQueue {
    /// Creates a tokio-backed counter write queue.
    #[must_use]
    pub fn new(store: SharedRateLimitStore, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            events,
        }
    }
}

impl CounterWriteQueue for TokioCounterWriteQueue {
    fn enqueue(&self, write: CounterWrite) {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let store = self.store.clone();
            let events = self.events.clone();
            let _ = handle.spawn_blocking(move || perform_counter_write(&store, &events, &write));
        } else {
            perform_counter_write(&self.store, &self.events, &write);
        }
    }
}

/// Performs one durable counter write, recording failures.
fn perform_counter_write(
    store: &SharedRateLimitStore,
    events: &Arc<dyn EventSink>,
    write: &CounterWrite,
) {
    let result = match write {
        CounterWrite::Replace {
            key,
            counter,
        } => store.put(key, counter),
        CounterWrite::Increment {
            key,
        } => store.increment(key, unix_millis()).map(|_| ()),
    };
    if let Err(err) = result {
        events.record(&IntakeEvent::CounterPersistFailure {
            timestamp_ms: unix_millis(),
            detail: err.to_string(),
        });
    }
}

// ============================================================================
// SECTION: Notification Queue
// ============================================================================

/// Notification queue backed by tokio blocking tasks.
pub struct TokioNotificationQueue {
    /// Notification dispatcher.
    dispatcher: Arc<dyn NotificationDispatcher>,
    /// Event sink for swallowed failures.
    events: Arc<dyn EventSink>,
}

impl TokioNotificationQueue {
    /// Creates a tokio-backed notification queue.
    #[must_use]
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, events: Arc<dyn EventSink>) -> Self {
        Self {
            dispatcher,
            events,
        }
    }
}

impl NotificationQueue for TokioNotificationQueue {
    fn enqueue(&self, summary: SubmissionSummary) {
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let dispatcher = self.dispatcher.clone();
            let events = self.events.clone();
            let _ = handle.spawn_blocking(move || deliver(&*dispatcher, &events, &summary));
        } else {
            deliver(&*self.dispatcher, &self.events, &summary);
        }
    }
}

/// Attempts one notification delivery, recording failures.
fn deliver(
    dispatcher: &dyn NotificationDispatcher,
    events: &Arc<dyn EventSink>,
    summary: &SubmissionSummary,
) {
    if let Err(err) = dispatcher.dispatch(summary) {
        events.record(&IntakeEvent::NotificationFailure {
            timestamp_ms: unix_millis(),
            submission_id: summary.id.as_str().to_string(),
            detail: err.to_string(),
        });
    }
}
