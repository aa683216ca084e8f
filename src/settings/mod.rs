//! Cached caller-identification settings of a line.
//!
//! - [`values`]: setting enums, external vocabulary and the composite restriction value;
//! - [`SettingsStore`]: the per-line cache and its change gate;
//! - `notify`: the `PropertyChanged` emitter, reachable only through the store.

mod notify;
mod properties;
mod store;
pub mod values;

pub(crate) use notify::ChangeNotifier;
pub use properties::{LineSettings, Properties};
pub(crate) use store::SettingsStore;
pub use values::{
    OverrideMode, RestrictionStatus, ServiceStatus, StatusField, calling_restriction_value,
};
