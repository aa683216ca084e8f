use std::sync::Arc;

use crate::events::{Bus, Event, EventKind};

/// Publishes `PropertyChanged` for one line.
///
/// Only the [`SettingsStore`](super::SettingsStore) holds one, and it calls
/// [`notify`](Self::notify) exclusively for values that actually changed.
#[derive(Clone, Debug)]
pub(crate) struct ChangeNotifier {
    line: Arc<str>,
    interface: &'static str,
    bus: Bus,
}

impl ChangeNotifier {
    pub(crate) fn new(line: Arc<str>, interface: &'static str, bus: Bus) -> Self {
        Self {
            line,
            interface,
            bus,
        }
    }

    pub(super) fn notify(&self, property: &'static str, value: &'static str) {
        tracing::debug!(line = %self.line, property, value, "property changed");
        self.bus.publish(
            Event::new(EventKind::PropertyChanged)
                .with_line(Arc::clone(&self.line))
                .with_interface(self.interface)
                .with_property(property, value),
        );
    }
}
