use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::driver::DriverRef;
use crate::events::Bus;
use crate::settings::{ChangeNotifier, SettingsStore};
use crate::subscribers::{Subscribe, SubscriberSet};

use super::CallSettings;
use super::arbiter::RequestArbiter;

/// Builder for a [`CallSettings`] context.
pub struct CallSettingsBuilder {
    line: Arc<str>,
    driver: DriverRef,
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
}

impl CallSettingsBuilder {
    /// Creates a builder with the default configuration and no subscribers.
    pub fn new(line: impl Into<Arc<str>>, driver: DriverRef) -> Self {
        Self {
            line: line.into(),
            driver,
            cfg: Config::default(),
            subscribers: Vec::new(),
        }
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, cfg: Config) -> Self {
        self.cfg = cfg;
        self
    }

    /// Sets event subscribers.
    ///
    /// Subscribers receive this line's events through dedicated workers with bounded
    /// queues. With at least one subscriber, [`build`](Self::build) and
    /// [`CallSettings::activate`] must run inside a tokio runtime.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Builds the context.
    ///
    /// The driver's capabilities are read once here; a driver that changes them later
    /// is not observed until the line is rebuilt.
    pub fn build(self) -> Arc<CallSettings> {
        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        let notifier = ChangeNotifier::new(Arc::clone(&self.line), self.cfg.interface, bus.clone());
        let caps = self.driver.capabilities();

        tracing::debug!(line = %self.line, ?caps, "call settings context built");
        let cs = Arc::new(CallSettings {
            line: self.line,
            cfg: self.cfg,
            driver: self.driver,
            caps,
            store: SettingsStore::new(notifier),
            arbiter: RequestArbiter::new(),
            bus,
            bindings: Mutex::new(Vec::new()),
            subscribers: self.subscribers,
            listener: Mutex::new(None),
        });
        cs.start_listener();
        cs
    }
}

/// Forwards bus events to a fresh [`SubscriberSet`] until `token` is cancelled.
///
/// Cancellation wins over pending events, so nothing published after
/// [`CallSettings::deactivate`] reaches the subscribers of the stopped listener.
pub(super) fn subscriber_listener(
    line: &Arc<str>,
    bus: &Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    token: CancellationToken,
) {
    let set = SubscriberSet::new(subscribers, bus.clone());
    let mut rx = bus.subscribe();
    let line = Arc::clone(line);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                res = rx.recv() => match res {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(n)) => {
                        tracing::warn!(line = %line, skipped = n, "subscriber listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
        set.shutdown().await;
    });
}
