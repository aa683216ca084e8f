//! Line events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by a line's call-settings context.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `ChangeNotifier` (property changes), `CallSettings` request paths
//!   (admission, fetch progress, bindings), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the subscriber listener spawned by the builder (fans out to
//!   `SubscriberSet`) and any receiver obtained from `CallSettings::subscribe`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
