//! # Event subscribers for a line context.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out and
//! the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   ChangeNotifier ── publish(Event) ──► Bus ──► subscriber_listener ──► SubscriberSet
//!                                                                          │
//!                                                          ┌───────────────┼──────────┐
//!                                                          ▼               ▼          ▼
//!                                                      LogWriter    SignalEmitter   ...
//! ```

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
