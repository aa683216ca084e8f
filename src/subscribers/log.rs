//! # LogWriter: event renderer
//!
//! A subscriber that turns incoming [`Event`]s into `tracing` records.
//!
//! ## Example output (fmt subscriber)
//! ```text
//! DEBUG line="/phonesim" property="CallingLinePresentation" value="enabled" property changed
//! DEBUG line="/phonesim" step="called-presentation" fetch step skipped
//!  WARN line="/phonesim" step="calling-restriction" reason="modem error: timeout" fetch step failed
//!  INFO line="/phonesim" request="override-set" request rejected: busy
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let line = e.line.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("");
        match e.kind {
            EventKind::PropertyChanged => {
                debug!(line, property = ?e.property, value = ?e.value, "property changed");
            }
            EventKind::RequestRejected => {
                info!(line, request = ?e.request.map(|r| r.as_str()), "request rejected: busy");
            }
            EventKind::FetchStepSkipped => {
                debug!(line, step = ?e.step.map(|s| s.as_str()), "fetch step skipped");
            }
            EventKind::FetchStepFailed => {
                warn!(line, step = ?e.step.map(|s| s.as_str()), reason, "fetch step failed");
            }
            EventKind::FetchCompleted => {
                debug!(line, reason, "fetch completed");
            }
            EventKind::OverrideConfirmFailed => {
                error!(line, reason, "override set but confirming query failed");
            }
            EventKind::ControlCodeRegistered => {
                debug!(line, code = ?e.code, "control code registered");
            }
            EventKind::ControlCodeUnregistered => {
                debug!(line, code = ?e.code, "control code unregistered");
            }
            EventKind::SubscriberOverflow => {
                warn!(reason, "subscriber overflow");
            }
            EventKind::SubscriberPanicked => {
                error!(reason, "subscriber panicked");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
