//! # Set-then-confirm for the caller-ID override.
//!
//! ```text
//! set_property("HideCallerId", v)
//!   ├─ parse v            ── bad literal ──► InvalidFormat
//!   ├─ SetOverride cap?   ── absent ───────► NotImplemented
//!   ├─ admit(OverrideSet) ── occupied ─────► Busy
//!   ├─ driver.set_override(mode) ── err ───► Failed
//!   └─ confirming query ── err ──► invalidate cache, OverrideConfirmFailed, Failed
//!                          ok  ──► store updated from the query, reply Ok
//! ```
//!
//! The reply and the store only ever reflect what the network confirmed, never the
//! requested mode.

use crate::driver::{CallingRestriction, Capability};
use crate::error::{DriverError, SettingsError};
use crate::events::{Event, EventKind};
use crate::settings::{OverrideMode, values::property};

use super::{CallSettings, RequestKind, RequestPermit};

impl CallSettings {
    /// Writes one property. `HideCallerId` is the only writable one; any other name
    /// fails with [`SettingsError::InvalidArgs`].
    pub async fn set_property(&self, name: &str, value: &str) -> Result<(), SettingsError> {
        if name != property::HIDE_CALLER_ID {
            return Err(SettingsError::InvalidArgs);
        }
        self.set_hide_caller_id(value).await.map(|_| ())
    }

    /// Sets the override from its property literal (`"default"`, `"enabled"`,
    /// `"disabled"`) and returns the confirmed restriction state.
    pub async fn set_hide_caller_id(&self, value: &str) -> Result<CallingRestriction, SettingsError> {
        let mode = OverrideMode::from_property(value).ok_or(SettingsError::InvalidFormat)?;
        if !self.caps.contains(Capability::SetOverride) {
            return Err(SettingsError::NotImplemented);
        }
        let permit = self.admit(RequestKind::OverrideSet)?;
        self.set_and_confirm(&permit, mode).await
    }

    /// Sets `mode` and re-queries network state and override.
    pub(crate) async fn set_and_confirm(
        &self,
        permit: &RequestPermit,
        mode: OverrideMode,
    ) -> Result<CallingRestriction, SettingsError> {
        if let Err(e) = self.driver.set_override(mode).await {
            tracing::debug!(line = %self.line, mode = mode.as_str(), error = %e, "setting override failed");
            return Err(SettingsError::failed(&e));
        }

        let confirmed = if self.caps.contains(Capability::QueryCallingRestriction) {
            self.query_calling_restriction(permit).await
        } else {
            Err(DriverError::Unsupported)
        };

        confirmed.map_err(|e| {
            self.store.invalidate();
            tracing::error!(
                line = %self.line,
                mode = mode.as_str(),
                error = %e,
                "override set but confirming query failed"
            );
            self.publish(
                Event::new(EventKind::OverrideConfirmFailed)
                    .with_request(permit.kind())
                    .with_reason(e.to_string()),
            );
            SettingsError::failed(&e)
        })
    }
}
