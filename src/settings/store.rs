//! # Cached settings of one line with change-gated notification.
//!
//! ## Architecture
//! ```text
//! driver reply ──► SettingsStore::set_*() ──► compare rendered properties
//!                                                 │ changed?
//!                                                 ▼
//!                                          ChangeNotifier::notify() ──► Bus (PropertyChanged)
//! ```
//!
//! ## Rules
//! - Every mutation goes through [`SettingsStore::apply`]; it renders the property
//!   dictionary before and after and notifies once per property whose value changed
//! - Reasserting a value never notifies
//! - `CallingLineRestriction` is derived on render, never stored
//! - `invalidate()` clears the cache flag only; values stay as last observed

use std::sync::{Mutex, MutexGuard, PoisonError};

use super::notify::ChangeNotifier;
use super::properties::{LineSettings, Properties};
use super::values::{OverrideMode, RestrictionStatus, ServiceStatus, StatusField};

struct Inner {
    settings: LineSettings,
    cache_valid: bool,
}

/// Per-line settings cache.
pub struct SettingsStore {
    inner: Mutex<Inner>,
    notifier: ChangeNotifier,
}

impl SettingsStore {
    /// Creates a store with every setting unknown, override `default` and no valid cache.
    pub(crate) fn new(notifier: ChangeNotifier) -> Self {
        Self {
            inner: Mutex::new(Inner {
                settings: LineSettings::default(),
                cache_valid: false,
            }),
            notifier,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the current snapshot and whether it reflects a completed fetch.
    pub fn get(&self) -> (LineSettings, bool) {
        let inner = self.lock();
        (inner.settings, inner.cache_valid)
    }

    /// Renders the current property dictionary.
    pub fn properties(&self) -> Properties {
        self.lock().settings.properties()
    }

    /// True if the cached snapshot can be served without querying the driver.
    pub fn is_valid(&self) -> bool {
        self.lock().cache_valid
    }

    pub(crate) fn set_status(&self, field: StatusField, status: ServiceStatus) {
        self.apply(|s| *s.status_mut(field) = status);
    }

    /// Records network restriction and override together, so the derived
    /// `CallingLineRestriction` is announced once with its final value.
    pub(crate) fn set_calling_restriction(&self, network: RestrictionStatus, mode: OverrideMode) {
        self.apply(|s| {
            s.calling_restriction = network;
            s.override_mode = mode;
        });
    }

    pub(crate) fn mark_valid(&self) {
        self.lock().cache_valid = true;
    }

    pub(crate) fn invalidate(&self) {
        self.lock().cache_valid = false;
    }

    /// Mutates the snapshot and notifies every property whose rendered value changed.
    fn apply(&self, mutate: impl FnOnce(&mut LineSettings)) {
        let (before, after) = {
            let mut inner = self.lock();
            let before = inner.settings.properties();
            mutate(&mut inner.settings);
            (before, inner.settings.properties())
        };

        for (property, value) in before.changed_in(&after) {
            self.notifier.notify(property, value);
        }
    }
}
