//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom observers into a line
//! context. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue that is owned by the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching) – they do **not** block the
//!   request path nor other subscribers.
//! - [`Subscribe::accepts`] filters events before they are queued, so a subscriber
//!   interested only in property changes does not fill its queue with fetch chatter.
//! - If a queue overflows, events for that subscriber are **dropped** and a
//!   `SubscriberOverflow` event is published.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use callsettings::{Event, EventKind, Subscribe};
//!
//! struct SignalEmitter;
//!
//! #[async_trait]
//! impl Subscribe for SignalEmitter {
//!     async fn on_event(&self, ev: &Event) {
//!         // forward PropertyChanged(name, value) to the transport...
//!         let _ = (ev.property, ev.value);
//!     }
//!     fn accepts(&self, ev: &Event) -> bool {
//!         ev.kind == EventKind::PropertyChanged
//!     }
//!     fn name(&self) -> &'static str { "signal-emitter" }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Returns `false` for events this subscriber does not want queued.
    fn accepts(&self, _event: &Event) -> bool {
        true
    }

    /// Human-readable name (for logs/events).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        256
    }
}
