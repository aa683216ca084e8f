//! Scripted driver shared by the unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::driver::{CallSettingsDriver, CallingRestriction, Capabilities, DriverRef};
use crate::error::DriverError;
use crate::line::CallSettings;
use crate::settings::{OverrideMode, RestrictionStatus, ServiceStatus};

/// Driver answering from canned results and recording every call.
///
/// A successful `set_override` updates the scripted restriction reply, the way a real
/// network would report the new override on the next query.
pub(crate) struct ScriptedDriver {
    caps: Capabilities,
    calling_presentation: Mutex<Result<ServiceStatus, DriverError>>,
    called_presentation: Mutex<Result<ServiceStatus, DriverError>>,
    called_restriction: Mutex<Result<ServiceStatus, DriverError>>,
    calling_restriction: Mutex<Result<CallingRestriction, DriverError>>,
    set_result: Mutex<Result<(), DriverError>>,
    calls: Mutex<Vec<&'static str>>,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedDriver {
    pub(crate) fn new(caps: Capabilities) -> Self {
        Self {
            caps,
            calling_presentation: Mutex::new(Ok(ServiceStatus::Unknown)),
            called_presentation: Mutex::new(Ok(ServiceStatus::Unknown)),
            called_restriction: Mutex::new(Ok(ServiceStatus::Unknown)),
            calling_restriction: Mutex::new(Ok(CallingRestriction {
                mode: OverrideMode::Default,
                network: RestrictionStatus::Unknown,
            })),
            set_result: Mutex::new(Ok(())),
            calls: Mutex::new(Vec::new()),
            gate: None,
        }
    }

    /// Every call waits for a permit released through [`open`](Self::open).
    pub(crate) fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Lets `n` gated calls through.
    pub(crate) fn open(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub(crate) fn answer_calling_presentation(&self, r: Result<ServiceStatus, DriverError>) {
        *self.calling_presentation.lock().unwrap() = r;
    }

    pub(crate) fn answer_called_presentation(&self, r: Result<ServiceStatus, DriverError>) {
        *self.called_presentation.lock().unwrap() = r;
    }

    pub(crate) fn answer_called_restriction(&self, r: Result<ServiceStatus, DriverError>) {
        *self.called_restriction.lock().unwrap() = r;
    }

    pub(crate) fn answer_calling_restriction(&self, r: Result<CallingRestriction, DriverError>) {
        *self.calling_restriction.lock().unwrap() = r;
    }

    pub(crate) fn answer_set(&self, r: Result<(), DriverError>) {
        *self.set_result.lock().unwrap() = r;
    }

    /// Operation names in call order.
    pub(crate) fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    async fn enter(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
    }
}

#[async_trait]
impl CallSettingsDriver for ScriptedDriver {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    async fn query_calling_presentation(&self) -> Result<ServiceStatus, DriverError> {
        self.enter("calling_presentation").await;
        self.calling_presentation.lock().unwrap().clone()
    }

    async fn query_called_presentation(&self) -> Result<ServiceStatus, DriverError> {
        self.enter("called_presentation").await;
        self.called_presentation.lock().unwrap().clone()
    }

    async fn query_called_restriction(&self) -> Result<ServiceStatus, DriverError> {
        self.enter("called_restriction").await;
        self.called_restriction.lock().unwrap().clone()
    }

    async fn query_calling_restriction(&self) -> Result<CallingRestriction, DriverError> {
        self.enter("calling_restriction").await;
        self.calling_restriction.lock().unwrap().clone()
    }

    async fn set_override(&self, mode: OverrideMode) -> Result<(), DriverError> {
        self.enter("set_override").await;
        let result = self.set_result.lock().unwrap().clone();
        if result.is_ok() {
            if let Ok(reply) = self.calling_restriction.lock().unwrap().as_mut() {
                reply.mode = mode;
            }
        }
        result
    }
}

/// Builds a line context around `driver`.
pub(crate) fn line(driver: &Arc<ScriptedDriver>) -> Arc<CallSettings> {
    let driver: DriverRef = driver.clone();
    CallSettings::builder("/phonesim", driver).build()
}

/// Collects the `(property, value)` pairs of every `PropertyChanged` received so far.
pub(crate) fn changes(
    rx: &mut tokio::sync::broadcast::Receiver<crate::events::Event>,
) -> Vec<(&'static str, &'static str)> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        if ev.is_property_changed() {
            out.push((ev.property.unwrap(), ev.value.unwrap()));
        }
    }
    out
}
