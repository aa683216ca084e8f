use crate::settings::StatusField;

/// One optional driver operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    QueryCallingPresentation,
    QueryCalledPresentation,
    QueryCalledRestriction,
    QueryCallingRestriction,
    SetOverride,
}

impl Capability {
    /// Every capability, in declaration order.
    pub const ALL: [Capability; 5] = [
        Capability::QueryCallingPresentation,
        Capability::QueryCalledPresentation,
        Capability::QueryCalledRestriction,
        Capability::QueryCallingRestriction,
        Capability::SetOverride,
    ];

    /// The query backing a single-field setting.
    pub fn query_for(field: StatusField) -> Self {
        match field {
            StatusField::CallingPresentation => Capability::QueryCallingPresentation,
            StatusField::CalledPresentation => Capability::QueryCalledPresentation,
            StatusField::CalledRestriction => Capability::QueryCalledRestriction,
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// Set of operations a driver provides.
///
/// ```
/// use callsettings::{Capabilities, Capability};
///
/// let caps = Capabilities::empty()
///     .with(Capability::QueryCallingRestriction)
///     .with(Capability::SetOverride);
/// assert!(caps.contains(Capability::SetOverride));
/// assert!(!caps.contains(Capability::QueryCalledRestriction));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities(u8);

impl Capabilities {
    /// No operation at all.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every operation.
    pub fn all() -> Self {
        Capability::ALL
            .into_iter()
            .fold(Self::empty(), Capabilities::with)
    }

    /// Adds `cap` to the set.
    #[must_use]
    pub fn with(self, cap: Capability) -> Self {
        Self(self.0 | cap.bit())
    }

    /// Removes `cap` from the set.
    #[must_use]
    pub fn without(self, cap: Capability) -> Self {
        Self(self.0 & !cap.bit())
    }

    /// True if `cap` is present.
    #[inline]
    pub fn contains(self, cap: Capability) -> bool {
        self.0 & cap.bit() != 0
    }

    /// True if no operation is present.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<Capability> for Capabilities {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Capabilities::with)
    }
}
