//! # Per-line runtime configuration.
//!
//! Provides [`Config`], the settings a line context is built with.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]

/// External interface name used when no other one is configured.
pub const DEFAULT_INTERFACE: &str = "org.ofono.CallSettings";

/// Configuration for a [`CallSettings`](crate::CallSettings) line context.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `interface`: Interface name stamped on every published event
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks (`0`) across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Slow receivers that lag behind more than `bus_capacity` messages will
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Interface name the property changes are reported under.
    pub interface: &'static str,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 256`
    /// - `interface = "org.ofono.CallSettings"`
    fn default() -> Self {
        Self {
            bus_capacity: 256,
            interface: DEFAULT_INTERFACE,
        }
    }
}
