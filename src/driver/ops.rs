//! # Driver operations consumed by the core.
//!
//! A driver advertises what it can do through [`CallSettingsDriver::capabilities`];
//! the core checks that set before every call and never invokes an operation the
//! driver did not advertise. The default method bodies exist so a driver only has to
//! implement what it advertises.
//!
//! The channel to the modem carries one transaction at a time; the core never
//! issues two operations on the same driver concurrently.

use async_trait::async_trait;

use super::capability::Capabilities;
use crate::error::DriverError;
use crate::settings::{OverrideMode, RestrictionStatus, ServiceStatus, StatusField};

/// Network reply of the calling-restriction query: the override currently in force and
/// the network provisioning state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallingRestriction {
    pub mode: OverrideMode,
    pub network: RestrictionStatus,
}

/// # Modem driver for the call-settings service.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use callsettings::{
///     Capabilities, Capability, CallSettingsDriver, CallingRestriction, DriverError,
///     OverrideMode, RestrictionStatus,
/// };
///
/// struct ClirOnly;
///
/// #[async_trait]
/// impl CallSettingsDriver for ClirOnly {
///     fn capabilities(&self) -> Capabilities {
///         Capabilities::empty().with(Capability::QueryCallingRestriction)
///     }
///
///     async fn query_calling_restriction(&self) -> Result<CallingRestriction, DriverError> {
///         Ok(CallingRestriction {
///             mode: OverrideMode::Default,
///             network: RestrictionStatus::NotProvisioned,
///         })
///     }
/// }
/// ```
#[async_trait]
pub trait CallSettingsDriver: Send + Sync + 'static {
    /// Operations this driver provides.
    fn capabilities(&self) -> Capabilities;

    /// Queries calling-line presentation.
    async fn query_calling_presentation(&self) -> Result<ServiceStatus, DriverError> {
        Err(DriverError::Unsupported)
    }

    /// Queries called-line presentation.
    async fn query_called_presentation(&self) -> Result<ServiceStatus, DriverError> {
        Err(DriverError::Unsupported)
    }

    /// Queries called-line restriction.
    async fn query_called_restriction(&self) -> Result<ServiceStatus, DriverError> {
        Err(DriverError::Unsupported)
    }

    /// Queries calling-line restriction: network state plus the current override.
    async fn query_calling_restriction(&self) -> Result<CallingRestriction, DriverError> {
        Err(DriverError::Unsupported)
    }

    /// Sets the calling-line restriction override.
    async fn set_override(&self, _mode: OverrideMode) -> Result<(), DriverError> {
        Err(DriverError::Unsupported)
    }
}

/// Routes a single-field query to the matching driver method.
pub(crate) async fn query_status(
    driver: &dyn CallSettingsDriver,
    field: StatusField,
) -> Result<ServiceStatus, DriverError> {
    match field {
        StatusField::CallingPresentation => driver.query_calling_presentation().await,
        StatusField::CalledPresentation => driver.query_called_presentation().await,
        StatusField::CalledRestriction => driver.query_called_restriction().await,
    }
}
