//! # callsettings
//!
//! **callsettings** is the per-line core of a telephony daemon's caller-identification
//! settings: calling/called line presentation, called line restriction, and the user
//! override for hiding the outgoing caller ID.
//!
//! It caches what the modem driver reports, serves property reads and writes, answers
//! supplementary-service control codes (`*#30#`, `#31#`, ...), and announces every
//! externally visible change exactly once. Requests on a line are single-flight: while
//! one is outstanding, every other request is rejected with
//! [`SettingsError::Busy`].
//!
//! ## Architecture
//! ```text
//!   get_properties()      set_property()          ControlTable::route()
//!         │                     │                          │
//!         │                     │                 ControlRequest::parse("*#31#")
//!         ▼                     ▼                          ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  CallSettings (one per line)                                      │
//! │  - RequestArbiter (single-flight, RAII permit)                    │
//! │  - SettingsStore (cache + change gate)                            │
//! │  - Capabilities (what the driver provides)                        │
//! └──────┬──────────────────────────────┬─────────────────────────────┘
//!        ▼                              ▼
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │ CallSettingsDriver   │      │ ChangeNotifier       │
//! │ (async modem ops)    │      │ PropertyChanged only │
//! └──────────────────────┘      │ on real changes      │
//!                               └──────────┬───────────┘
//!                                          ▼
//!                      ┌──────────────────────────────────────┐
//!                      │  Bus (broadcast, Config::bus_capacity)│
//!                      └───────┬───────────────────┬──────────┘
//!                              ▼                   ▼
//!                   CallSettings::subscribe()   subscriber_listener
//!                                                  ▼
//!                                            SubscriberSet
//!                                       ┌─────────┼─────────┐
//!                                       ▼         ▼         ▼
//!                                  LogWriter  emitter    ...
//! ```
//!
//! ### Aggregate fetch
//! ```text
//! get_properties()
//!   ├─ busy?          ─► Err(Busy)
//!   ├─ cache valid?   ─► cached dictionary
//!   └─ for step in [called-restriction, called-presentation,
//!                   calling-presentation, calling-restriction]:
//!        ├─ unsupported ─► skip
//!        ├─ error       ─► keep old value, FetchStepFailed, continue
//!        └─ ok          ─► store (notifies on change)
//!      last step ok ─► cache valid
//! ```
//!
//! ## Features
//! | Area               | Description                                                   | Key types / traits                         |
//! |--------------------|---------------------------------------------------------------|--------------------------------------------|
//! | **Line context**   | Per-line cache, arbiter and request entry points.             | [`CallSettings`], [`CallSettingsBuilder`]  |
//! | **Driver**         | Optional async modem operations plus a capability set.        | [`CallSettingsDriver`], [`Capabilities`]   |
//! | **Control codes**  | Parsing, routing and answering service codes 30/31/76/77.     | [`ControlRequest`], [`ControlTable`]       |
//! | **Events**         | Property changes and diagnostics on a broadcast bus.          | [`Event`], [`EventKind`], [`Subscribe`]    |
//! | **Errors**         | Typed errors for requesters and drivers.                      | [`SettingsError`], [`DriverError`]         |
//! | **Configuration**  | Bus sizing and interface naming.                              | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use callsettings::{
//!     CallSettings, CallSettingsDriver, Capabilities, Capability, DriverError, ServiceStatus,
//! };
//!
//! struct Modem;
//!
//! #[async_trait]
//! impl CallSettingsDriver for Modem {
//!     fn capabilities(&self) -> Capabilities {
//!         Capabilities::empty().with(Capability::QueryCallingPresentation)
//!     }
//!     async fn query_calling_presentation(&self) -> Result<ServiceStatus, DriverError> {
//!         Ok(ServiceStatus::Provisioned)
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let line = CallSettings::builder("/modem0", Arc::new(Modem)).build();
//!
//!     let props = line.get_properties().await?;
//!     assert_eq!(props.get("CallingLinePresentation"), Some("enabled"));
//!     assert_eq!(props.get("HideCallerId"), Some("default"));
//!     Ok(())
//! }
//! ```
mod config;
mod control;
mod driver;
mod error;
mod events;
mod line;
mod settings;
mod subscribers;

#[cfg(test)]
mod testing;

// ---- Public re-exports ----

pub use config::{Config, DEFAULT_INTERFACE};
pub use control::{
    ControlHandler, ControlParseError, ControlReply, ControlRequest, ControlRouter, ControlTable,
    ControlType, Dispatch, ReplyHandle, ServiceCode,
};
pub use driver::{CallSettingsDriver, CallingRestriction, Capabilities, Capability, DriverRef};
pub use error::{DriverError, SettingsError};
pub use events::{Bus, Event, EventKind};
pub use line::{CallSettings, CallSettingsBuilder, FetchStep, PendingRequest, RequestKind};
pub use settings::values::property;
pub use settings::{
    LineSettings, OverrideMode, Properties, RestrictionStatus, ServiceStatus, StatusField,
    calling_restriction_value,
};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
