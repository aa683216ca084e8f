//! # Setting values and their external vocabulary.
//!
//! Drivers report network states as the enums below (or as raw 3GPP codes, see the
//! `from_code` constructors); the property interface only ever sees the strings
//! produced by `as_str` and [`calling_restriction_value`].

/// External property names.
pub mod property {
    pub const CALLING_LINE_PRESENTATION: &str = "CallingLinePresentation";
    pub const CALLED_LINE_PRESENTATION: &str = "CalledLinePresentation";
    pub const CALLED_LINE_RESTRICTION: &str = "CalledLineRestriction";
    pub const CALLING_LINE_RESTRICTION: &str = "CallingLineRestriction";
    pub const HIDE_CALLER_ID: &str = "HideCallerId";
}

/// Provisioning state of a presentation/restriction service
/// (calling-presentation, called-presentation, called-restriction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceStatus {
    NotProvisioned,
    Provisioned,
    #[default]
    Unknown,
}

impl ServiceStatus {
    /// Maps a raw `<m>` status (0 not provisioned, 1 provisioned); anything else is unknown.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => ServiceStatus::NotProvisioned,
            1 => ServiceStatus::Provisioned,
            _ => ServiceStatus::Unknown,
        }
    }

    /// External value: `"enabled"`, `"disabled"` or `"unknown"`.
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Provisioned => "enabled",
            ServiceStatus::NotProvisioned => "disabled",
            ServiceStatus::Unknown => "unknown",
        }
    }
}

/// Network-side state of calling-line restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RestrictionStatus {
    #[default]
    Unknown,
    ProvisionedPermanent,
    NotProvisioned,
    TemporarilyRestricted,
    TemporarilyAllowed,
}

impl RestrictionStatus {
    /// Every network state, in declaration order.
    pub const ALL: [RestrictionStatus; 5] = [
        RestrictionStatus::Unknown,
        RestrictionStatus::ProvisionedPermanent,
        RestrictionStatus::NotProvisioned,
        RestrictionStatus::TemporarilyRestricted,
        RestrictionStatus::TemporarilyAllowed,
    ];

    /// Maps a raw `<m>` status of the restriction query.
    ///
    /// 0 not provisioned, 1 permanent, 2 unknown, 3 temporarily restricted,
    /// 4 temporarily allowed; anything else is unknown.
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RestrictionStatus::NotProvisioned,
            1 => RestrictionStatus::ProvisionedPermanent,
            3 => RestrictionStatus::TemporarilyRestricted,
            4 => RestrictionStatus::TemporarilyAllowed,
            _ => RestrictionStatus::Unknown,
        }
    }

    /// Raw network rendering for diagnostics. Not a property value.
    pub fn as_network_str(self) -> &'static str {
        match self {
            RestrictionStatus::Unknown => "unknown",
            RestrictionStatus::ProvisionedPermanent => "permanent",
            RestrictionStatus::NotProvisioned => "disabled",
            RestrictionStatus::TemporarilyRestricted => "on",
            RestrictionStatus::TemporarilyAllowed => "off",
        }
    }
}

/// Per-line user override for outgoing caller-ID hiding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OverrideMode {
    /// Follow the network subscription.
    #[default]
    Default,
    /// Restrict presentation (hide caller ID).
    Invocation,
    /// Allow presentation (show caller ID).
    Suppression,
}

impl OverrideMode {
    /// Every override mode, in declaration order.
    pub const ALL: [OverrideMode; 3] = [
        OverrideMode::Default,
        OverrideMode::Invocation,
        OverrideMode::Suppression,
    ];

    /// Maps a raw `<n>` setting (0 default, 1 invocation, 2 suppression).
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(OverrideMode::Default),
            1 => Some(OverrideMode::Invocation),
            2 => Some(OverrideMode::Suppression),
            _ => None,
        }
    }

    /// Parses the `HideCallerId` property literal.
    pub fn from_property(value: &str) -> Option<Self> {
        match value {
            "default" => Some(OverrideMode::Default),
            "enabled" => Some(OverrideMode::Invocation),
            "disabled" => Some(OverrideMode::Suppression),
            _ => None,
        }
    }

    /// External `HideCallerId` value.
    pub fn as_str(self) -> &'static str {
        match self {
            OverrideMode::Default => "default",
            OverrideMode::Invocation => "enabled",
            OverrideMode::Suppression => "disabled",
        }
    }
}

/// Derives the externally reported calling-line restriction from the network state
/// and the override.
///
/// The override only matters for the two temporary modes: the restriction is in effect
/// when the override flips the network default.
pub fn calling_restriction_value(network: RestrictionStatus, mode: OverrideMode) -> &'static str {
    match network {
        RestrictionStatus::Unknown => "unknown",
        RestrictionStatus::ProvisionedPermanent => "enabled",
        RestrictionStatus::NotProvisioned => "disabled",
        RestrictionStatus::TemporarilyRestricted if mode == OverrideMode::Suppression => "enabled",
        RestrictionStatus::TemporarilyRestricted => "disabled",
        RestrictionStatus::TemporarilyAllowed if mode == OverrideMode::Invocation => "enabled",
        RestrictionStatus::TemporarilyAllowed => "disabled",
    }
}

/// Single-field settings, each backed by its own driver query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    CallingPresentation,
    CalledPresentation,
    CalledRestriction,
}

impl StatusField {
    /// External property name.
    pub fn property(self) -> &'static str {
        match self {
            StatusField::CallingPresentation => property::CALLING_LINE_PRESENTATION,
            StatusField::CalledPresentation => property::CALLED_LINE_PRESENTATION,
            StatusField::CalledRestriction => property::CALLED_LINE_RESTRICTION,
        }
    }
}
