use super::values::{
    OverrideMode, RestrictionStatus, ServiceStatus, StatusField, calling_restriction_value,
    property,
};

/// Typed snapshot of one line's cached settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineSettings {
    pub calling_presentation: ServiceStatus,
    pub called_presentation: ServiceStatus,
    pub called_restriction: ServiceStatus,
    pub calling_restriction: RestrictionStatus,
    pub override_mode: OverrideMode,
}

impl LineSettings {
    /// Returns the status of a single-field setting.
    pub fn status(&self, field: StatusField) -> ServiceStatus {
        match field {
            StatusField::CallingPresentation => self.calling_presentation,
            StatusField::CalledPresentation => self.called_presentation,
            StatusField::CalledRestriction => self.called_restriction,
        }
    }

    pub(crate) fn status_mut(&mut self, field: StatusField) -> &mut ServiceStatus {
        match field {
            StatusField::CallingPresentation => &mut self.calling_presentation,
            StatusField::CalledPresentation => &mut self.called_presentation,
            StatusField::CalledRestriction => &mut self.called_restriction,
        }
    }

    /// Renders the five external properties.
    pub fn properties(&self) -> Properties {
        Properties {
            entries: [
                (
                    property::CALLING_LINE_PRESENTATION,
                    self.calling_presentation.as_str(),
                ),
                (
                    property::CALLED_LINE_PRESENTATION,
                    self.called_presentation.as_str(),
                ),
                (
                    property::CALLED_LINE_RESTRICTION,
                    self.called_restriction.as_str(),
                ),
                (
                    property::CALLING_LINE_RESTRICTION,
                    calling_restriction_value(self.calling_restriction, self.override_mode),
                ),
                (property::HIDE_CALLER_ID, self.override_mode.as_str()),
            ],
        }
    }
}

/// The externally visible property dictionary, in a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Properties {
    entries: [(&'static str, &'static str); 5],
}

impl Properties {
    /// Looks up a property value by external name.
    pub fn get(&self, name: &str) -> Option<&'static str> {
        self.entries
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    /// Iterates `(name, value)` pairs in reply order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.entries.iter().copied()
    }

    /// Pairs whose value differs between `self` and `newer`, with the newer value.
    pub(crate) fn changed_in<'a>(
        &'a self,
        newer: &'a Properties,
    ) -> impl Iterator<Item = (&'static str, &'static str)> + 'a {
        self.entries
            .iter()
            .zip(newer.entries.iter())
            .filter(|(old, new)| old.1 != new.1)
            .map(|(_, new)| *new)
    }
}
