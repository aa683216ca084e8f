//! # Per-line call-settings context.
//!
//! [`CallSettings`] is the object the line manager owns for every active line. It
//! bundles the driver, the settings cache, the request arbiter and the event bus, and
//! is passed by reference into every handler; there is no process-wide state.
//!
//! ## Request flow
//! ```text
//! get_properties / set_property / dispatch
//!        │
//!        ▼
//!   RequestArbiter::try_acquire ──busy──► SettingsError::Busy (RequestRejected event)
//!        │ permit
//!        ▼
//!   driver (async, one call at a time) ──► SettingsStore::set_*() ──► PropertyChanged
//!        │
//!        ▼
//!   drop(permit) ──► reply
//! ```
//!
//! Submodules:
//! - [`arbiter`]: single-flight admission;
//! - [`fetch`]: aggregate fetch and `get_properties`;
//! - [`override_set`]: `set_property` and the set-then-confirm workflow;
//! - [`builder`]: construction and subscriber wiring.

mod arbiter;
mod builder;
mod fetch;
mod override_set;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::control::{ControlHandler, ControlRouter, ServiceCode};
use crate::driver::{CallingRestriction, Capabilities, Capability, DriverRef};
use crate::error::{DriverError, SettingsError};
use crate::events::{Bus, Event, EventKind};
use crate::settings::{LineSettings, Properties, SettingsStore};
use crate::subscribers::Subscribe;

pub(crate) use arbiter::RequestPermit;
pub use arbiter::{PendingRequest, RequestKind};
pub use builder::CallSettingsBuilder;
pub use fetch::FetchStep;

/// Call-settings context of one line.
pub struct CallSettings {
    line: Arc<str>,
    cfg: Config,
    driver: DriverRef,
    caps: Capabilities,
    store: SettingsStore,
    arbiter: arbiter::RequestArbiter,
    bus: Bus,
    bindings: Mutex<Vec<ServiceCode>>,
    subscribers: Vec<Arc<dyn Subscribe>>,
    /// Stop token of the running subscriber listener, `None` while stopped.
    listener: Mutex<Option<CancellationToken>>,
}

impl CallSettings {
    /// Starts building a context for the line at `line` (e.g. the modem path).
    pub fn builder(line: impl Into<Arc<str>>, driver: DriverRef) -> CallSettingsBuilder {
        CallSettingsBuilder::new(line, driver)
    }

    /// Line path.
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Configuration the context was built with.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Driver operations, as advertised when the context was built.
    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    /// Cached snapshot and whether it is valid, without touching the driver.
    pub fn snapshot(&self) -> (LineSettings, bool) {
        self.store.get()
    }

    /// Cached property dictionary, without touching the driver.
    pub fn cached_properties(&self) -> Properties {
        self.store.properties()
    }

    /// The request currently occupying the line.
    pub fn pending(&self) -> Option<PendingRequest> {
        self.arbiter.pending()
    }

    /// Receiver for this line's events (`PropertyChanged` and diagnostics).
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Installs the control-code bindings of this line on `router`.
    ///
    /// `"77"` is only bound when the driver can query called-line restriction.
    /// Activating an already active line is a no-op. Activating a deactivated line
    /// restarts the subscriber listener; events published while it was stopped are
    /// not replayed.
    pub fn activate(self: &Arc<Self>, router: &dyn ControlRouter) {
        self.start_listener();

        let mut bindings = self.bindings.lock().unwrap_or_else(PoisonError::into_inner);
        if !bindings.is_empty() {
            return;
        }

        let handler: Arc<dyn ControlHandler> = Arc::clone(self) as Arc<dyn ControlHandler>;
        for code in ServiceCode::ALL {
            if code == ServiceCode::CalledRestriction
                && !self.caps.contains(Capability::QueryCalledRestriction)
            {
                continue;
            }
            if router.register(code.as_str(), Arc::clone(&handler)) {
                bindings.push(code);
                self.publish(Event::new(EventKind::ControlCodeRegistered).with_code(code.as_str()));
            } else {
                tracing::warn!(line = %self.line, code = code.as_str(), "control code already bound");
            }
        }
    }

    /// Removes the bindings installed by [`activate`](Self::activate) and stops the
    /// subscriber listener.
    pub fn deactivate(self: &Arc<Self>, router: &dyn ControlRouter) {
        let codes: Vec<ServiceCode> = self
            .bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        let handler: Arc<dyn ControlHandler> = Arc::clone(self) as Arc<dyn ControlHandler>;
        for code in codes {
            router.unregister(code.as_str(), &handler);
            self.publish(Event::new(EventKind::ControlCodeUnregistered).with_code(code.as_str()));
        }
        self.stop_listener();
    }

    /// Codes currently bound by this line.
    pub fn bound_codes(&self) -> Vec<&'static str> {
        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| c.as_str())
            .collect()
    }

    /// Starts the subscriber listener unless it is running or there are no subscribers.
    fn start_listener(&self) {
        if self.subscribers.is_empty() {
            return;
        }
        let mut listener = self.listener.lock().unwrap_or_else(PoisonError::into_inner);
        if listener.is_some() {
            return;
        }
        let token = CancellationToken::new();
        builder::subscriber_listener(&self.line, &self.bus, self.subscribers.clone(), token.clone());
        *listener = Some(token);
    }

    fn stop_listener(&self) {
        let token = self.listener.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(token) = token {
            token.cancel();
        }
    }

    // ---------------------------
    // Shared request helpers
    // ---------------------------

    pub(crate) fn store(&self) -> &SettingsStore {
        &self.store
    }

    /// Admits a request or reports it as rejected.
    pub(crate) fn admit(&self, kind: RequestKind) -> Result<RequestPermit, SettingsError> {
        self.arbiter.try_acquire(kind).inspect_err(|_| {
            tracing::debug!(line = %self.line, request = kind.as_str(), "line busy");
            self.publish(Event::new(EventKind::RequestRejected).with_request(kind));
        })
    }

    /// Queries network restriction and override, recording both on success.
    pub(crate) async fn query_calling_restriction(
        &self,
        _permit: &RequestPermit,
    ) -> Result<CallingRestriction, DriverError> {
        let reply = self.driver.query_calling_restriction().await?;
        tracing::debug!(
            line = %self.line,
            network = reply.network.as_network_str(),
            mode = reply.mode.as_str(),
            "calling restriction reported"
        );
        self.record_calling_restriction(reply);
        Ok(reply)
    }

    fn record_calling_restriction(&self, reply: CallingRestriction) {
        self.store.set_calling_restriction(reply.network, reply.mode);
    }

    pub(crate) fn driver(&self) -> &DriverRef {
        &self.driver
    }

    pub(crate) fn publish(&self, ev: Event) {
        self.bus.publish(ev.with_line(Arc::clone(&self.line)));
    }
}

impl std::fmt::Debug for CallSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallSettings")
            .field("line", &self.line)
            .field("caps", &self.caps)
            .field("pending", &self.arbiter.pending())
            .finish_non_exhaustive()
    }
}
