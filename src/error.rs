//! Error types used by the call-settings core and its drivers.
//!
//! This module defines two main error enums:
//!
//! - [`SettingsError`] - errors delivered to the caller of a property or control-code request.
//! - [`DriverError`] - failures reported by the modem driver for a single query or set.
//!
//! Both types provide `as_label` for logging/events; [`SettingsError`] additionally maps
//! onto the error names used by the property transport ([`SettingsError::as_error_name`]).

use thiserror::Error;

/// # Errors delivered to the requester.
///
/// Every request either gets a reply or exactly one of these. Nothing in the core retries;
/// a caller that wants another attempt has to issue a new request.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    /// The driver does not provide the operation this request needs.
    #[error("operation not implemented by the driver")]
    NotImplemented,

    /// The control string carried arguments the service code does not accept,
    /// or a property value outside its vocabulary.
    #[error("invalid format")]
    InvalidFormat,

    /// The request named something this interface does not expose.
    #[error("invalid arguments")]
    InvalidArgs,

    /// Another request is already outstanding on this line.
    #[error("operation already in progress")]
    Busy,

    /// The driver reported an error while serving the request.
    #[error("operation failed: {reason}")]
    Failed {
        /// Driver-supplied failure description.
        reason: String,
    },
}

impl SettingsError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    ///
    /// # Example
    /// ```
    /// use callsettings::SettingsError;
    ///
    /// assert_eq!(SettingsError::Busy.as_label(), "busy");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            SettingsError::NotImplemented => "not_implemented",
            SettingsError::InvalidFormat => "invalid_format",
            SettingsError::InvalidArgs => "invalid_args",
            SettingsError::Busy => "busy",
            SettingsError::Failed { .. } => "failed",
        }
    }

    /// Returns the external error name the property transport replies with.
    pub fn as_error_name(&self) -> &'static str {
        match self {
            SettingsError::NotImplemented => "org.ofono.Error.NotImplemented",
            SettingsError::InvalidFormat => "org.ofono.Error.InvalidFormat",
            SettingsError::InvalidArgs => "org.ofono.Error.InvalidArguments",
            SettingsError::Busy => "org.ofono.Error.InProgress",
            SettingsError::Failed { .. } => "org.ofono.Error.Failed",
        }
    }

    /// Wraps a driver failure.
    pub(crate) fn failed(err: &DriverError) -> Self {
        SettingsError::Failed {
            reason: err.to_string(),
        }
    }
}

/// # Failure reported by a driver operation.
///
/// Drivers build these from whatever the modem answered (CME error, timeout on the AT
/// channel, ...); the core only forwards the message.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// The modem answered with an error.
    #[error("modem error: {message}")]
    Modem {
        /// Error text as reported by the modem.
        message: String,
    },

    /// The operation is not provided by this driver.
    #[error("operation not supported")]
    Unsupported,
}

impl DriverError {
    /// Convenience constructor for [`DriverError::Modem`].
    pub fn modem(message: impl Into<String>) -> Self {
        DriverError::Modem {
            message: message.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            DriverError::Modem { .. } => "driver_modem_error",
            DriverError::Unsupported => "driver_unsupported",
        }
    }
}
