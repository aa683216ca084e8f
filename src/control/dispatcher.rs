//! # Control-code handling for one line.
//!
//! ## Codes
//! | code | setting                      | accepted types                    |
//! |------|------------------------------|-----------------------------------|
//! | 30   | calling-line presentation    | query                             |
//! | 76   | called-line presentation     | query                             |
//! | 77   | called-line restriction      | query (bound only if supported)   |
//! | 31   | calling-line restriction     | query, (de)activation, reg/erase  |
//!
//! ## Validation order
//! ```text
//! code not ours ─────────────────────────────────────► Declined
//! 31, not query, no sia/sib/sic, destination present ─► Declined (per-call form)
//! any argument (or non-query on 30/76/77) ────────────► InvalidFormat
//! operation not supported by the driver ─────────────► NotImplemented
//! line occupied ──────────────────────────────────────► Busy
//! otherwise: Handled; driver work runs on a spawned task and answers `reply`
//! ```
//!
//! The permit is released before the reply is sent, so a requester reacting to the
//! reply can issue its next request immediately.

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::driver::{Capability, query_status};
use crate::error::SettingsError;
use crate::line::{CallSettings, RequestKind, RequestPermit};
use crate::settings::{OverrideMode, StatusField, calling_restriction_value, values::property};

use super::request::{ControlRequest, ControlType};
use super::router::ControlHandler;

/// Service codes served by the call-settings core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceCode {
    CallingPresentation,
    CallingRestriction,
    CalledPresentation,
    CalledRestriction,
}

impl ServiceCode {
    /// Every code, in binding order.
    pub const ALL: [ServiceCode; 4] = [
        ServiceCode::CallingPresentation,
        ServiceCode::CallingRestriction,
        ServiceCode::CalledPresentation,
        ServiceCode::CalledRestriction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServiceCode::CallingPresentation => "30",
            ServiceCode::CallingRestriction => "31",
            ServiceCode::CalledPresentation => "76",
            ServiceCode::CalledRestriction => "77",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == code)
    }

    /// Single field queried by this code; `None` for the override code.
    pub fn field(self) -> Option<StatusField> {
        match self {
            ServiceCode::CallingPresentation => Some(StatusField::CallingPresentation),
            ServiceCode::CalledPresentation => Some(StatusField::CalledPresentation),
            ServiceCode::CalledRestriction => Some(StatusField::CalledRestriction),
            ServiceCode::CallingRestriction => None,
        }
    }
}

/// Successful answer to a control request: `(property, (tag, value))` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlReply {
    /// Property the answer is about.
    pub property: &'static str,
    /// Control type the answer is reported under.
    pub control_type: ControlType,
    /// Externally visible value.
    pub value: &'static str,
}

impl ControlReply {
    /// Control-type tag carried in the reply.
    pub fn tag(&self) -> &'static str {
        self.control_type.reply_tag()
    }
}

/// One-shot channel a control request is answered on.
pub type ReplyHandle = oneshot::Sender<Result<ControlReply, SettingsError>>;

/// Outcome of offering a request to a handler.
#[derive(Debug)]
#[must_use]
pub enum Dispatch {
    /// The handler owns the reply and will answer it.
    Handled,
    /// The handler did not take the request; the reply handle is returned unused.
    Declined(ReplyHandle),
}

impl Dispatch {
    pub fn is_handled(&self) -> bool {
        matches!(self, Dispatch::Handled)
    }
}

/// What an accepted request will do.
#[derive(Debug, Clone, Copy)]
enum Plan {
    Field(StatusField),
    OverrideQuery,
    OverrideSet(OverrideMode),
}

impl Plan {
    fn capability(self) -> Capability {
        match self {
            Plan::Field(field) => Capability::query_for(field),
            Plan::OverrideQuery => Capability::QueryCallingRestriction,
            Plan::OverrideSet(_) => Capability::SetOverride,
        }
    }

    fn request_kind(self) -> RequestKind {
        match self {
            Plan::Field(_) => RequestKind::FieldQuery,
            Plan::OverrideQuery => RequestKind::OverrideQuery,
            Plan::OverrideSet(_) => RequestKind::OverrideSet,
        }
    }
}

/// Per-call form of the override code (`#31#<number>`), served by call setup.
fn is_per_call_override(request: &ControlRequest) -> bool {
    !request.control_type.is_query() && !request.has_supplementary() && !request.dn.is_empty()
}

impl CallSettings {
    /// Offers a control request to this line.
    ///
    /// Returns [`Dispatch::Declined`] for codes this line does not serve and for the
    /// per-call override form. Everything else is [`Dispatch::Handled`]: validation
    /// failures are answered right away, accepted requests are answered from a spawned
    /// task once the driver has replied. Outside a tokio runtime an accepted request
    /// is answered with [`SettingsError::Failed`] and the line is released.
    pub fn dispatch(self: &Arc<Self>, request: &ControlRequest, reply: ReplyHandle) -> Dispatch {
        let Some(code) = ServiceCode::from_code(&request.code) else {
            return Dispatch::Declined(reply);
        };
        if code == ServiceCode::CallingRestriction && is_per_call_override(request) {
            tracing::debug!(line = %self.line(), "per-call override declined");
            return Dispatch::Declined(reply);
        }

        let accepted = self
            .plan(code, request)
            .and_then(|plan| self.admit(plan.request_kind()).map(|permit| (plan, permit)));

        match accepted {
            Err(e) => {
                tracing::debug!(
                    line = %self.line(),
                    code = code.as_str(),
                    control_type = request.control_type.as_str(),
                    error = e.as_label(),
                    "control request refused"
                );
                let _ = reply.send(Err(e));
            }
            Ok((plan, permit)) => {
                let Ok(runtime) = tokio::runtime::Handle::try_current() else {
                    drop(permit);
                    tracing::error!(line = %self.line(), code = code.as_str(), "control request outside a tokio runtime");
                    let _ = reply.send(Err(SettingsError::Failed {
                        reason: "no async runtime".to_owned(),
                    }));
                    return Dispatch::Handled;
                };
                let this = Arc::clone(self);
                let control_type = request.control_type;
                runtime.spawn(async move {
                    let result = this.serve(plan, control_type, &permit).await;
                    drop(permit);
                    if reply.send(result).is_err() {
                        tracing::debug!(line = %this.line(), "control requester went away");
                    }
                });
            }
        }
        Dispatch::Handled
    }

    /// Validates `request` against `code` and the driver's capabilities.
    fn plan(&self, code: ServiceCode, request: &ControlRequest) -> Result<Plan, SettingsError> {
        if request.has_arguments() {
            return Err(SettingsError::InvalidFormat);
        }

        let plan = match (code.field(), request.control_type) {
            (Some(field), ControlType::Query) => Plan::Field(field),
            (Some(_), _) => return Err(SettingsError::InvalidFormat),
            (None, ControlType::Query) => Plan::OverrideQuery,
            (None, ControlType::Activation | ControlType::Registration) => {
                Plan::OverrideSet(OverrideMode::Invocation)
            }
            (None, ControlType::Deactivation | ControlType::Erasure) => {
                Plan::OverrideSet(OverrideMode::Suppression)
            }
        };

        if !self.capabilities().contains(plan.capability()) {
            return Err(SettingsError::NotImplemented);
        }
        Ok(plan)
    }

    async fn serve(
        &self,
        plan: Plan,
        control_type: ControlType,
        permit: &RequestPermit,
    ) -> Result<ControlReply, SettingsError> {
        match plan {
            Plan::Field(field) => {
                let status = query_status(self.driver().as_ref(), field)
                    .await
                    .map_err(|e| SettingsError::failed(&e))?;
                self.store().set_status(field, status);
                Ok(ControlReply {
                    property: field.property(),
                    control_type: ControlType::Query,
                    value: status.as_str(),
                })
            }
            Plan::OverrideQuery => {
                let reply = self
                    .query_calling_restriction(permit)
                    .await
                    .map_err(|e| SettingsError::failed(&e))?;
                Ok(ControlReply {
                    property: property::CALLING_LINE_RESTRICTION,
                    control_type: ControlType::Query,
                    value: calling_restriction_value(reply.network, reply.mode),
                })
            }
            Plan::OverrideSet(mode) => {
                let confirmed = self.set_and_confirm(permit, mode).await?;
                let control_type = match control_type {
                    ControlType::Registration => ControlType::Activation,
                    ControlType::Erasure => ControlType::Deactivation,
                    other => other,
                };
                Ok(ControlReply {
                    property: property::CALLING_LINE_RESTRICTION,
                    control_type,
                    value: calling_restriction_value(confirmed.network, confirmed.mode),
                })
            }
        }
    }
}

impl ControlHandler for CallSettings {
    fn handle(self: Arc<Self>, request: &ControlRequest, reply: ReplyHandle) -> Dispatch {
        self.dispatch(request, reply)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::control::{ControlRouter, ControlTable};
    use crate::driver::{CallingRestriction, Capabilities};
    use crate::error::DriverError;
    use crate::settings::{RestrictionStatus, ServiceStatus};
    use crate::testing::{ScriptedDriver, changes, line};

    type ReplyRx = oneshot::Receiver<Result<ControlReply, SettingsError>>;

    fn send(cs: &Arc<CallSettings>, request: &ControlRequest) -> (Dispatch, ReplyRx) {
        let (tx, rx) = oneshot::channel();
        (cs.dispatch(request, tx), rx)
    }

    fn scripted(caps: Capabilities) -> Arc<ScriptedDriver> {
        let driver = ScriptedDriver::new(caps);
        driver.answer_calling_presentation(Ok(ServiceStatus::Provisioned));
        driver.answer_called_restriction(Ok(ServiceStatus::NotProvisioned));
        driver.answer_calling_restriction(Ok(CallingRestriction {
            mode: OverrideMode::Default,
            network: RestrictionStatus::TemporarilyAllowed,
        }));
        Arc::new(driver)
    }

    #[rstest]
    #[case::full(Capabilities::all())]
    #[case::none(Capabilities::empty())]
    #[tokio::test]
    async fn per_call_override_is_declined(#[case] caps: Capabilities) {
        let driver = scripted(caps);
        let cs = line(&driver);

        for ty in [ControlType::Activation, ControlType::Deactivation] {
            let req = ControlRequest::new(ty, "31").with_destination("0123456");
            let (d, _rx) = send(&cs, &req);
            assert!(!d.is_handled());
        }
        assert!(driver.calls().is_empty());
    }

    #[rstest]
    #[case("30", ControlType::Query, ["1", "", "", ""])]
    #[case("30", ControlType::Query, ["", "1", "", ""])]
    #[case("30", ControlType::Query, ["", "", "1", ""])]
    #[case("30", ControlType::Query, ["", "", "", "0123"])]
    #[case("31", ControlType::Query, ["1", "", "", ""])]
    #[case("31", ControlType::Activation, ["1", "", "", ""])]
    #[case("31", ControlType::Registration, ["", "1", "", ""])]
    #[case("31", ControlType::Erasure, ["", "", "1", "0123"])]
    #[case("76", ControlType::Query, ["", "1", "", ""])]
    #[case("76", ControlType::Query, ["", "", "1", ""])]
    #[case("76", ControlType::Query, ["", "", "", "0123"])]
    #[case("76", ControlType::Deactivation, ["1", "", "", ""])]
    #[case("77", ControlType::Query, ["1", "", "", ""])]
    #[case("77", ControlType::Query, ["", "1", "", ""])]
    #[case("77", ControlType::Query, ["", "", "1", ""])]
    #[case("77", ControlType::Query, ["", "", "", "0123"])]
    #[case("77", ControlType::Erasure, ["1", "", "", ""])]
    #[tokio::test]
    async fn any_argument_is_invalid_format(
        #[case] code: &str,
        #[case] ty: ControlType,
        #[case] args: [&str; 4],
    ) {
        let [sia, sib, sic, dn] = args;
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);

        let req = ControlRequest::new(ty, code)
            .with_supplementary(sia, sib, sic)
            .with_destination(dn);
        let (d, rx) = send(&cs, &req);

        assert!(d.is_handled());
        assert_eq!(rx.await.unwrap().unwrap_err(), SettingsError::InvalidFormat);
        assert!(driver.calls().is_empty());
    }

    #[test]
    fn accepted_request_outside_runtime_fails() {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);

        let (d, mut rx) = send(&cs, &ControlRequest::new(ControlType::Query, "30"));

        assert!(d.is_handled());
        assert!(matches!(rx.try_recv().unwrap(), Err(SettingsError::Failed { .. })));
        assert!(cs.pending().is_none());
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn query_with_destination_is_invalid_format() {
        let cs = line(&scripted(Capabilities::all()));
        let req = ControlRequest::new(ControlType::Query, "31").with_destination("0123");
        let (d, rx) = send(&cs, &req);
        assert!(d.is_handled());
        assert_eq!(rx.await.unwrap().unwrap_err(), SettingsError::InvalidFormat);
    }

    #[tokio::test]
    async fn single_field_code_only_takes_queries() {
        let cs = line(&scripted(Capabilities::all()));
        let (_, rx) = send(&cs, &ControlRequest::new(ControlType::Activation, "30"));
        assert_eq!(rx.await.unwrap().unwrap_err(), SettingsError::InvalidFormat);
    }

    #[rstest]
    #[case("30", ControlType::Query, Capability::QueryCallingPresentation)]
    #[case("31", ControlType::Query, Capability::QueryCallingRestriction)]
    #[case("31", ControlType::Registration, Capability::SetOverride)]
    #[tokio::test]
    async fn missing_operation_is_not_implemented(
        #[case] code: &str,
        #[case] ty: ControlType,
        #[case] missing: Capability,
    ) {
        let driver = scripted(Capabilities::all().without(missing));
        let cs = line(&driver);

        let (d, rx) = send(&cs, &ControlRequest::new(ty, code));

        assert!(d.is_handled());
        assert_eq!(rx.await.unwrap().unwrap_err(), SettingsError::NotImplemented);
        assert!(cs.pending().is_none());
    }

    #[tokio::test]
    async fn field_query_updates_store_and_replies() {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);
        let mut events = cs.subscribe();

        let (d, rx) = send(&cs, &ControlRequest::new(ControlType::Query, "77"));
        assert!(d.is_handled());
        let reply = rx.await.unwrap().unwrap();

        assert_eq!(reply.property, "CalledLineRestriction");
        assert_eq!(reply.tag(), "interrogation");
        assert_eq!(reply.value, "disabled");
        assert_eq!(changes(&mut events), vec![("CalledLineRestriction", "disabled")]);
        assert_eq!(driver.calls(), vec!["called_restriction"]);
        assert!(cs.pending().is_none());
    }

    #[tokio::test]
    async fn field_query_failure_is_failed() {
        let driver = scripted(Capabilities::all());
        driver.answer_calling_presentation(Err(DriverError::modem("+CME ERROR: 30")));
        let cs = line(&driver);

        let (_, rx) = send(&cs, &ControlRequest::new(ControlType::Query, "30"));

        assert!(matches!(rx.await.unwrap(), Err(SettingsError::Failed { .. })));
        assert_eq!(cs.cached_properties().get("CallingLinePresentation"), Some("unknown"));
    }

    #[tokio::test]
    async fn override_query_replies_with_composite() {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);

        let (_, rx) = send(&cs, &ControlRequest::new(ControlType::Query, "31"));
        let reply = rx.await.unwrap().unwrap();

        assert_eq!(reply.property, "CallingLineRestriction");
        assert_eq!(reply.value, "disabled");
        assert_eq!(reply.tag(), "interrogation");
    }

    #[rstest]
    #[case(ControlType::Activation, "activation", "enabled", "enabled")]
    #[case(ControlType::Registration, "activation", "enabled", "enabled")]
    #[case(ControlType::Deactivation, "deactivation", "disabled", "disabled")]
    #[case(ControlType::Erasure, "deactivation", "disabled", "disabled")]
    #[tokio::test]
    async fn override_set_reports_confirmed_value(
        #[case] ty: ControlType,
        #[case] tag: &str,
        #[case] value: &str,
        #[case] hide_caller_id: &str,
    ) {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);

        let (d, rx) = send(&cs, &ControlRequest::new(ty, "31"));
        assert!(d.is_handled());
        let reply = rx.await.unwrap().unwrap();

        assert_eq!(reply.tag(), tag);
        assert_eq!(reply.value, value);
        assert_eq!(cs.cached_properties().get("HideCallerId"), Some(hide_caller_id));
        assert_eq!(driver.calls(), vec!["set_override", "calling_restriction"]);
    }

    #[tokio::test]
    async fn override_confirm_failure_invalidates_cache() {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);
        cs.get_properties().await.unwrap();

        driver.answer_calling_restriction(Err(DriverError::modem("timeout")));
        let (_, rx) = send(&cs, &ControlRequest::new(ControlType::Activation, "31"));

        assert!(matches!(rx.await.unwrap(), Err(SettingsError::Failed { .. })));
        assert!(!cs.snapshot().1);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn second_request_on_busy_line_is_refused() {
        let driver = Arc::new(ScriptedDriver::new(Capabilities::all()).gated());
        let cs = line(&driver);

        let (first, first_rx) = send(&cs, &ControlRequest::new(ControlType::Query, "30"));
        assert!(first.is_handled());
        assert_eq!(cs.pending().map(|p| p.kind), Some(RequestKind::FieldQuery));

        let (second, second_rx) = send(&cs, &ControlRequest::new(ControlType::Query, "31"));
        assert!(second.is_handled());
        assert_eq!(second_rx.await.unwrap().unwrap_err(), SettingsError::Busy);
        assert_eq!(cs.get_properties().await.unwrap_err(), SettingsError::Busy);

        driver.open(1);
        assert_eq!(first_rx.await.unwrap().unwrap().value, "unknown");
        assert!(cs.pending().is_none());
    }

    #[tokio::test]
    async fn unknown_code_is_declined() {
        let cs = line(&scripted(Capabilities::all()));
        let (d, _rx) = send(&cs, &ControlRequest::new(ControlType::Query, "21"));
        assert!(!d.is_handled());
    }

    #[tokio::test]
    async fn parsed_string_through_router() {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);
        let table = ControlTable::new();
        cs.activate(&table);

        let (tx, rx) = oneshot::channel();
        let d = table.route(&ControlRequest::parse("*#30#").unwrap(), tx);
        assert!(d.is_handled());
        let reply = rx.await.unwrap().unwrap();
        assert_eq!((reply.property, reply.value), ("CallingLinePresentation", "enabled"));

        let (tx, _rx) = oneshot::channel();
        let d = table.route(&ControlRequest::parse("#31#0123456").unwrap(), tx);
        assert!(!d.is_handled());

        cs.deactivate(&table);
        let (tx, _rx) = oneshot::channel();
        assert!(!table.route(&ControlRequest::parse("*#30#").unwrap(), tx).is_handled());
        assert!(!table.unregister("30", &(Arc::clone(&cs) as Arc<dyn ControlHandler>)));
    }
}
