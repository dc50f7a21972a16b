// crates/transfer-intake-core/src/runtime/queues.rs
// ============================================================================
// Module: Transfer Intake Inline Queues
// Description: Synchronous queue implementations for tests and demos.
// Purpose: Provide in-process write-through and notification delivery.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Inline queues perform their work synchronously on the calling thread
//! while honoring the queue contract: failures are reported to the event
//! sink and never surfaced to the caller. Deployments that want genuinely
//! asynchronous behavior supply runtime-backed queues instead; the limiter
//! and controller are indifferent to which is wired in.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use crate::core::counter::CounterWrite;
use crate::core::time::unix_millis;
use crate::interfaces::CounterWriteQueue;
use crate::interfaces::EventSink;
use crate::interfaces::IntakeEvent;
use crate::interfaces::NotificationDispatcher;
use crate::interfaces::NotificationQueue;
use crate::interfaces::RateLimitStore;
use crate::interfaces::SubmissionSummary;
use crate::runtime::store::SharedRateLimitStore;

// ============================================================================
// SECTION: Counter Write Queue
// ============================================================================

/// Counter write queue that persists on the calling thread.
pub struct InlineCounterWriteQueue {
    /// Durable counter store.
    store: SharedRateLimitStore,
    /// Event sink for swallowed failures.
    events: Arc<dyn EventSink>,
}

impl InlineCounterWriteQueue {
    /// Creates an inline counter write queue.
    #[must_use]
    pub fn new(store: SharedRateLimitStore, events: Arc<dyn EventSink>) -> Self {
        Self {
            store,
            events,
        }
    }
}

impl CounterWriteQueue for InlineCounterWriteQueue {
    fn enqueue(&self, write: CounterWrite) {
        let result = match &write {
            CounterWrite::Replace {
                key,
                counter,
            } => self.store.put(key, counter),
            CounterWrite::Increment {
                key,
            } => self.store.increment(key, unix_millis()).map(|_| ()),
        };
        if let Err(err) = result {
            self.events.record(&IntakeEvent::CounterPersistFailure {
                timestamp_ms: unix_millis(),
                detail: err.to_string(),
            });
        }
    }
}

// ============================================================================
// SECTION: Notification Queue
// ============================================================================

/// Notification queue that dispatches on the calling thread.
pub struct InlineNotificationQueue {
    /// Notification dispatcher.
    dispatcher: Arc<dyn NotificationDispatcher>,
    /// Event sink for swallowed failures.
    events: Arc<dyn EventSink>,
}

impl InlineNotificationQueue {
    /// Creates an inline notification queue.
    #[must_use]
    pub fn new(dispatcher: Arc<dyn NotificationDispatcher>, events: Arc<dyn EventSink>) -> Self {
        Self {
            dispatcher,
            events,
        }
    }
}

impl NotificationQueue for InlineNotificationQueue {
    fn enqueue(&self, summary: SubmissionSummary) {
        if let Err(err) = self.dispatcher.dispatch(&summary) {
            self.events.record(&IntakeEvent::NotificationFailure {
                timestamp_ms: unix_millis(),
                submission_id: summary.id.as_str().to_string(),
                detail: err.to_string(),
            });
        }
    }
}
