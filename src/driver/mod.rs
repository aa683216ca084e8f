//! Driver capability interface.
//!
//! - [`CallSettingsDriver`] - async operations performed by the modem driver
//! - [`Capabilities`] / [`Capability`] - which of those operations are present
//! - [`CallingRestriction`] - combined network + override reply

mod capability;
mod ops;

pub use capability::{Capabilities, Capability};
pub(crate) use ops::query_status;
pub use ops::{CallSettingsDriver, CallingRestriction};

/// Shared driver handle.
pub type DriverRef = std::sync::Arc<dyn CallSettingsDriver>;
