//! # Aggregate fetch behind `GetProperties`.
//!
//! ## Order
//! ```text
//! CalledRestriction ─► CalledPresentation ─► CallingPresentation ─► CallingRestriction
//!   (skip if absent)     (skip if absent)      (skip if absent)      (network + override)
//! ```
//!
//! ## Rules
//! - One driver call at a time, strictly in [`FetchStep::ORDER`]
//! - Absent capability → step skipped, field untouched, no error
//! - Driver error → field untouched, chain continues (logged + `FetchStepFailed`)
//! - Only a successful final step marks the cache valid
//! - The chain always ends with a snapshot; with no capability at all that snapshot is
//!   whatever is cached (all `unknown`/`default` on a fresh line) and the cache stays invalid

use crate::driver::{Capability, query_status};
use crate::error::{DriverError, SettingsError};
use crate::events::{Event, EventKind};
use crate::settings::{Properties, StatusField, calling_restriction_value};

use super::{CallSettings, RequestKind, RequestPermit};

/// One step of the aggregate fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStep {
    CalledRestriction,
    CalledPresentation,
    CallingPresentation,
    CallingRestriction,
}

impl FetchStep {
    /// The fixed execution order.
    pub const ORDER: [FetchStep; 4] = [
        FetchStep::CalledRestriction,
        FetchStep::CalledPresentation,
        FetchStep::CallingPresentation,
        FetchStep::CallingRestriction,
    ];

    /// Driver operation this step needs.
    pub fn capability(self) -> Capability {
        match self {
            FetchStep::CalledRestriction => Capability::QueryCalledRestriction,
            FetchStep::CalledPresentation => Capability::QueryCalledPresentation,
            FetchStep::CallingPresentation => Capability::QueryCallingPresentation,
            FetchStep::CallingRestriction => Capability::QueryCallingRestriction,
        }
    }

    /// Single field written by this step; `None` for the combined restriction step.
    fn field(self) -> Option<StatusField> {
        match self {
            FetchStep::CalledRestriction => Some(StatusField::CalledRestriction),
            FetchStep::CalledPresentation => Some(StatusField::CalledPresentation),
            FetchStep::CallingPresentation => Some(StatusField::CallingPresentation),
            FetchStep::CallingRestriction => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FetchStep::CalledRestriction => "called-restriction",
            FetchStep::CalledPresentation => "called-presentation",
            FetchStep::CallingPresentation => "calling-presentation",
            FetchStep::CallingRestriction => "calling-restriction",
        }
    }
}

impl CallSettings {
    /// Returns the five properties of this line.
    ///
    /// A valid cache is served as is; otherwise the aggregate fetch runs first. Fails
    /// only with [`SettingsError::Busy`].
    pub async fn get_properties(&self) -> Result<Properties, SettingsError> {
        let permit = self.admit(RequestKind::FullFetch)?;
        if self.store.is_valid() {
            return Ok(self.store.properties());
        }
        Ok(self.fetch(&permit).await)
    }

    /// Runs every supported query in order and returns the resulting snapshot.
    pub(crate) async fn fetch(&self, permit: &RequestPermit) -> Properties {
        for step in FetchStep::ORDER {
            if !self.caps.contains(step.capability()) {
                tracing::debug!(line = %self.line, step = step.as_str(), "fetch step skipped");
                self.publish(Event::new(EventKind::FetchStepSkipped).with_step(step));
                continue;
            }

            match step.field() {
                Some(field) => match query_status(self.driver.as_ref(), field).await {
                    Ok(status) => self.store.set_status(field, status),
                    Err(e) => self.step_failed(step, &e),
                },
                None => match self.query_calling_restriction(permit).await {
                    Ok(_) => self.store.mark_valid(),
                    Err(e) => self.step_failed(step, &e),
                },
            }
        }

        let (_, valid) = self.store.get();
        self.publish(
            Event::new(EventKind::FetchCompleted).with_reason(if valid { "cached" } else { "partial" }),
        );
        self.store.properties()
    }

    fn step_failed(&self, step: FetchStep, err: &DriverError) {
        let (settings, _) = self.store().get();
        let kept = match step.field() {
            Some(field) => settings.status(field).as_str(),
            None => calling_restriction_value(settings.calling_restriction, settings.override_mode),
        };
        tracing::debug!(line = %self.line, step = step.as_str(), error = %err, kept, "fetch step failed");
        self.publish(
            Event::new(EventKind::FetchStepFailed)
                .with_step(step)
                .with_reason(err.to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::driver::{CallingRestriction, Capabilities};
    use crate::error::DriverError;
    use crate::settings::{OverrideMode, RestrictionStatus, ServiceStatus};
    use crate::testing::{ScriptedDriver, changes, line};

    use super::*;

    fn scripted(caps: Capabilities) -> Arc<ScriptedDriver> {
        let driver = ScriptedDriver::new(caps);
        driver.answer_called_restriction(Ok(ServiceStatus::NotProvisioned));
        driver.answer_called_presentation(Ok(ServiceStatus::Provisioned));
        driver.answer_calling_presentation(Ok(ServiceStatus::Unknown));
        driver.answer_calling_restriction(Ok(CallingRestriction {
            mode: OverrideMode::Suppression,
            network: RestrictionStatus::TemporarilyRestricted,
        }));
        Arc::new(driver)
    }

    #[tokio::test]
    async fn full_fetch_aggregates_in_order() {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);

        let props = cs.get_properties().await.unwrap();

        assert_eq!(props.get("CalledLineRestriction"), Some("disabled"));
        assert_eq!(props.get("CalledLinePresentation"), Some("enabled"));
        assert_eq!(props.get("CallingLinePresentation"), Some("unknown"));
        assert_eq!(props.get("CallingLineRestriction"), Some("enabled"));
        assert_eq!(props.get("HideCallerId"), Some("disabled"));
        assert_eq!(
            driver.calls(),
            vec![
                "called_restriction",
                "called_presentation",
                "calling_presentation",
                "calling_restriction"
            ]
        );
        assert!(cs.snapshot().1);
        assert!(cs.pending().is_none());
    }

    #[tokio::test]
    async fn valid_cache_is_served_without_driver() {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);

        let first = cs.get_properties().await.unwrap();
        driver.clear_calls();
        let second = cs.get_properties().await.unwrap();

        assert_eq!(first, second);
        assert!(driver.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_called_presentation_is_skipped() {
        let driver = scripted(Capabilities::all().without(Capability::QueryCalledPresentation));
        let cs = line(&driver);
        let mut rx = cs.subscribe();

        let props = cs.get_properties().await.unwrap();

        assert!(!driver.calls().contains(&"called_presentation"));
        assert_eq!(props.get("CalledLinePresentation"), Some("unknown"));
        assert!(cs.snapshot().1);

        let skipped: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter(|ev| ev.kind == EventKind::FetchStepSkipped)
            .map(|ev| ev.step)
            .collect();
        assert_eq!(skipped, vec![Some(FetchStep::CalledPresentation)]);
    }

    #[tokio::test]
    async fn step_failure_keeps_field_and_continues() {
        let driver = scripted(Capabilities::all());
        driver.answer_called_restriction(Err(DriverError::modem("+CME ERROR: 100")));
        let cs = line(&driver);
        let mut rx = cs.subscribe();

        let props = cs.get_properties().await.unwrap();

        assert_eq!(props.get("CalledLineRestriction"), Some("unknown"));
        assert_eq!(props.get("CalledLinePresentation"), Some("enabled"));
        assert_eq!(driver.calls().len(), 4);
        assert!(cs.snapshot().1);
        assert!(!changes(&mut rx).contains(&("CalledLineRestriction", "disabled")));
    }

    #[tokio::test]
    async fn final_step_failure_leaves_cache_invalid() {
        let driver = scripted(Capabilities::all());
        driver.answer_calling_restriction(Err(DriverError::modem("timeout")));
        let cs = line(&driver);

        let props = cs.get_properties().await.unwrap();
        assert_eq!(props.get("CallingLineRestriction"), Some("unknown"));
        assert_eq!(props.get("HideCallerId"), Some("default"));
        assert!(!cs.snapshot().1);

        driver.clear_calls();
        cs.get_properties().await.unwrap();
        assert_eq!(driver.calls().len(), 4);
    }

    #[tokio::test]
    async fn missing_final_query_delivers_cached_values() {
        let driver = scripted(Capabilities::all().without(Capability::QueryCallingRestriction));
        let cs = line(&driver);

        let props = cs.get_properties().await.unwrap();

        assert_eq!(props.get("CalledLinePresentation"), Some("enabled"));
        assert_eq!(props.get("CallingLineRestriction"), Some("unknown"));
        assert!(!cs.snapshot().1);
    }

    #[tokio::test]
    async fn no_capability_at_all_still_replies() {
        let driver = scripted(Capabilities::empty());
        let cs = line(&driver);

        let props = cs.get_properties().await.unwrap();

        assert!(driver.calls().is_empty());
        assert_eq!(props, crate::settings::LineSettings::default().properties());
        assert!(cs.pending().is_none());
    }

    #[tokio::test]
    async fn fetch_announces_changes_once() {
        let driver = scripted(Capabilities::all());
        let cs = line(&driver);
        let mut rx = cs.subscribe();

        cs.get_properties().await.unwrap();
        assert_eq!(
            changes(&mut rx),
            vec![
                ("CalledLineRestriction", "disabled"),
                ("CalledLinePresentation", "enabled"),
                ("CallingLineRestriction", "enabled"),
                ("HideCallerId", "disabled"),
            ]
        );
    }

    #[tokio::test(flavor = "current_thread")]
    async fn concurrent_fetch_is_busy() {
        let driver = Arc::new(ScriptedDriver::new(Capabilities::all()).gated());
        let cs = line(&driver);

        let first = tokio::spawn({
            let cs = Arc::clone(&cs);
            async move { cs.get_properties().await }
        });
        tokio::task::yield_now().await;
        assert_eq!(cs.pending().map(|p| p.kind), Some(RequestKind::FullFetch));

        assert_eq!(cs.get_properties().await.unwrap_err(), SettingsError::Busy);
        assert_eq!(
            cs.set_property("HideCallerId", "enabled").await.unwrap_err(),
            SettingsError::Busy
        );

        driver.open(4);
        assert!(first.await.unwrap().is_ok());
        assert!(cs.pending().is_none());
    }
}
