//! # Single-flight admission per line
//!
//! The arbiter treats a line as one **slot**: at any given time at most one request
//! may be outstanding. A request arriving while the slot is occupied is turned away
//! with [`SettingsError::Busy`]; there is no queue and nothing is retried.
//!
//! ## Invariants
//! - `try_acquire` never waits.
//! - A [`RequestPermit`] frees the slot exactly once, when it is dropped. Every path
//!   that obtained a permit (success reply, error reply, panic unwinding) releases it;
//!   paths that were rejected before acquiring have nothing to release.
//! - A driver call that never completes keeps its permit alive and the line busy.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::error::SettingsError;

/// Logical operation occupying the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Aggregate fetch behind `GetProperties`.
    FullFetch,
    /// Single-field control-code query.
    FieldQuery,
    /// Calling-restriction control-code query.
    OverrideQuery,
    /// Override set (property or control code), including its confirming query.
    OverrideSet,
}

impl RequestKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestKind::FullFetch => "full-fetch",
            RequestKind::FieldQuery => "field-query",
            RequestKind::OverrideQuery => "override-query",
            RequestKind::OverrideSet => "override-set",
        }
    }
}

/// The outstanding request of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// Which operation is running.
    pub kind: RequestKind,
    /// When it was admitted.
    pub started_at: Instant,
}

type Slot = Arc<Mutex<Option<PendingRequest>>>;

fn lock(slot: &Slot) -> MutexGuard<'_, Option<PendingRequest>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Non-blocking try-lock guarding one line.
#[derive(Debug, Default)]
pub(crate) struct RequestArbiter {
    slot: Slot,
}

impl RequestArbiter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Admits `kind` if the line is idle.
    pub(crate) fn try_acquire(&self, kind: RequestKind) -> Result<RequestPermit, SettingsError> {
        let mut slot = lock(&self.slot);
        if slot.is_some() {
            return Err(SettingsError::Busy);
        }
        *slot = Some(PendingRequest {
            kind,
            started_at: Instant::now(),
        });
        Ok(RequestPermit {
            slot: Arc::clone(&self.slot),
            kind,
        })
    }

    /// The currently outstanding request, if any.
    pub(crate) fn pending(&self) -> Option<PendingRequest> {
        *lock(&self.slot)
    }
}

/// Proof of admission; the line stays busy for as long as this lives.
#[derive(Debug)]
pub(crate) struct RequestPermit {
    slot: Slot,
    kind: RequestKind,
}

impl RequestPermit {
    pub(crate) fn kind(&self) -> RequestKind {
        self.kind
    }
}

impl Drop for RequestPermit {
    fn drop(&mut self) {
        lock(&self.slot).take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_is_busy_for_every_kind() {
        let arbiter = RequestArbiter::new();
        let permit = arbiter.try_acquire(RequestKind::FullFetch).unwrap();
        assert_eq!(permit.kind(), RequestKind::FullFetch);

        for kind in [
            RequestKind::FullFetch,
            RequestKind::FieldQuery,
            RequestKind::OverrideQuery,
            RequestKind::OverrideSet,
        ] {
            assert_eq!(arbiter.try_acquire(kind).unwrap_err(), SettingsError::Busy);
        }
        assert_eq!(arbiter.pending().map(|p| p.kind), Some(RequestKind::FullFetch));
    }

    #[test]
    fn drop_releases_the_line() {
        let arbiter = RequestArbiter::new();
        drop(arbiter.try_acquire(RequestKind::OverrideSet).unwrap());
        assert!(arbiter.pending().is_none());

        let again = arbiter.try_acquire(RequestKind::FieldQuery);
        assert!(again.is_ok());
    }
}
