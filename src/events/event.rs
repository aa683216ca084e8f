//! # Events emitted by a line's call-settings context.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Change events**: a cached setting took a new value (`PropertyChanged`)
//! - **Request events**: admission and aggregate-fetch progress
//! - **Binding events**: control codes installed/removed on the router
//! - **Subscriber events**: overflow/panic reports from subscriber workers
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the line
//! path, the property name and its external value.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use callsettings::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::PropertyChanged)
//!     .with_line("/phonesim")
//!     .with_property("HideCallerId", "enabled");
//!
//! assert_eq!(ev.kind, EventKind::PropertyChanged);
//! assert_eq!(ev.line.as_deref(), Some("/phonesim"));
//! assert_eq!(ev.value, Some("enabled"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::line::{FetchStep, RequestKind};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of line events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Change events ===
    /// A cached setting changed its externally visible value.
    ///
    /// Sets:
    /// - `line`, `interface`
    /// - `property`: external property name
    /// - `value`: new external value
    PropertyChanged,

    // === Request events ===
    /// A request was turned away because another one is outstanding.
    ///
    /// Sets:
    /// - `line`
    /// - `request`: kind of the rejected request
    RequestRejected,

    /// A fetch step was skipped because the driver lacks the query.
    ///
    /// Sets:
    /// - `line`
    /// - `step`: skipped step
    FetchStepSkipped,

    /// A fetch step failed; the field keeps its cached value.
    ///
    /// Sets:
    /// - `line`
    /// - `step`: failed step
    /// - `reason`: driver error message
    FetchStepFailed,

    /// The aggregate fetch delivered its snapshot.
    ///
    /// Sets:
    /// - `line`
    /// - `reason`: `"cached"` when the snapshot was marked valid, `"partial"` otherwise
    FetchCompleted,

    /// The override was set but the confirming query failed; cache dropped.
    ///
    /// Sets:
    /// - `line`
    /// - `request`: kind of the request that set the override
    /// - `reason`: driver error message
    OverrideConfirmFailed,

    // === Binding events ===
    /// A control code was bound to this line's dispatcher.
    ///
    /// Sets:
    /// - `line`
    /// - `code`: service code
    ControlCodeRegistered,

    /// A control code binding was removed.
    ///
    /// Sets:
    /// - `line`
    /// - `code`: service code
    ControlCodeUnregistered,

    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `reason`: subscriber name and panic info
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `reason`: subscriber name and cause
    SubscriberOverflow,
}

/// Line event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Path of the line the event belongs to.
    pub line: Option<Arc<str>>,
    /// Interface the property belongs to.
    pub interface: Option<&'static str>,
    /// External property name.
    pub property: Option<&'static str>,
    /// External property value.
    pub value: Option<&'static str>,
    /// Service code for binding events.
    pub code: Option<&'static str>,
    /// Fetch step for fetch progress events.
    pub step: Option<FetchStep>,
    /// Request kind for admission events.
    pub request: Option<RequestKind>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            line: None,
            interface: None,
            property: None,
            value: None,
            code: None,
            step: None,
            request: None,
            reason: None,
        }
    }

    /// Attaches the line path.
    #[inline]
    pub fn with_line(mut self, line: impl Into<Arc<str>>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// Attaches the interface name.
    #[inline]
    pub fn with_interface(mut self, interface: &'static str) -> Self {
        self.interface = Some(interface);
        self
    }

    /// Attaches a property name and its external value.
    #[inline]
    pub fn with_property(mut self, property: &'static str, value: &'static str) -> Self {
        self.property = Some(property);
        self.value = Some(value);
        self
    }

    /// Attaches a service code.
    #[inline]
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Attaches a fetch step.
    #[inline]
    pub fn with_step(mut self, step: FetchStep) -> Self {
        self.step = Some(step);
        self
    }

    /// Attaches a request kind.
    #[inline]
    pub fn with_request(mut self, request: RequestKind) -> Self {
        self.request = Some(request);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_reason(format!("subscriber={subscriber} info={info}"))
    }

    #[inline]
    pub fn is_property_changed(&self) -> bool {
        matches!(self.kind, EventKind::PropertyChanged)
    }

    #[inline]
    pub fn is_subscriber_overflow(&self) -> bool {
        matches!(self.kind, EventKind::SubscriberOverflow)
    }
}
