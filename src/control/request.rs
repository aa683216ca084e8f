//! # Supplementary-service control strings
//!
//! A control string is what a user keys in to query or change a network service:
//!
//! ```text
//!   *#31#          query, code 31
//!   **21*0123#     registration, code 21, sia "0123"
//!   #31#0123456    deactivation, code 31, destination "0123456"
//!   │ │  │    │
//!   │ │  │    └── '#' ends the service part; anything after it is the destination
//!   │ │  └─────── up to three '*'-separated supplementary arguments (sia, sib, sic)
//!   │ └────────── service code
//!   └──────────── prefix: "**" "##" "*#" "*" "#"
//! ```
//!
//! [`ControlRequest::parse`] accepts exactly this shape. Anything else (a plain number,
//! a string without the closing `#`, letters) is a [`ControlParseError`].

use thiserror::Error;

/// What the request asks the network to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlType {
    Activation,
    Registration,
    Query,
    Deactivation,
    Erasure,
}

impl ControlType {
    /// Prefixes, longest first so `**` is not read as `*`.
    const PREFIXES: [(&'static str, ControlType); 5] = [
        ("**", ControlType::Registration),
        ("##", ControlType::Erasure),
        ("*#", ControlType::Query),
        ("*", ControlType::Activation),
        ("#", ControlType::Deactivation),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ControlType::Activation => "activation",
            ControlType::Registration => "registration",
            ControlType::Query => "interrogation",
            ControlType::Deactivation => "deactivation",
            ControlType::Erasure => "erasure",
        }
    }

    /// Tag a reply carries: registration answers as activation, erasure as deactivation.
    pub fn reply_tag(self) -> &'static str {
        match self {
            ControlType::Activation | ControlType::Registration => "activation",
            ControlType::Query => "interrogation",
            ControlType::Deactivation | ControlType::Erasure => "deactivation",
        }
    }

    pub fn is_query(self) -> bool {
        self == ControlType::Query
    }
}

/// Rejection reasons of [`ControlRequest::parse`].
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlParseError {
    #[error("control string is empty")]
    Empty,

    #[error("control string must start with '*' or '#'")]
    MissingPrefix,

    #[error("control string is not terminated by '#'")]
    MissingTerminator,

    #[error("service code is missing")]
    MissingServiceCode,

    #[error("too many supplementary arguments (at most three)")]
    TooManyArguments,

    #[error("unexpected character {0:?}")]
    InvalidCharacter(char),
}

impl ControlParseError {
    /// Returns a short stable label (snake_case) for use in logs/events.
    pub fn as_label(&self) -> &'static str {
        match self {
            ControlParseError::Empty => "empty",
            ControlParseError::MissingPrefix => "missing_prefix",
            ControlParseError::MissingTerminator => "missing_terminator",
            ControlParseError::MissingServiceCode => "missing_service_code",
            ControlParseError::TooManyArguments => "too_many_arguments",
            ControlParseError::InvalidCharacter(_) => "invalid_character",
        }
    }
}

/// A parsed control string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRequest {
    pub control_type: ControlType,
    /// Service code, e.g. `"31"`.
    pub code: String,
    pub sia: String,
    pub sib: String,
    pub sic: String,
    /// Destination number following the control part, if any.
    pub dn: String,
}

impl ControlRequest {
    /// A request without arguments.
    pub fn new(control_type: ControlType, code: impl Into<String>) -> Self {
        Self {
            control_type,
            code: code.into(),
            sia: String::new(),
            sib: String::new(),
            sic: String::new(),
            dn: String::new(),
        }
    }

    pub fn with_supplementary(
        mut self,
        sia: impl Into<String>,
        sib: impl Into<String>,
        sic: impl Into<String>,
    ) -> Self {
        self.sia = sia.into();
        self.sib = sib.into();
        self.sic = sic.into();
        self
    }

    pub fn with_destination(mut self, dn: impl Into<String>) -> Self {
        self.dn = dn.into();
        self
    }

    /// True if any of sia/sib/sic is non-empty.
    pub fn has_supplementary(&self) -> bool {
        !(self.sia.is_empty() && self.sib.is_empty() && self.sic.is_empty())
    }

    /// True if any argument, destination included, is non-empty.
    pub fn has_arguments(&self) -> bool {
        self.has_supplementary() || !self.dn.is_empty()
    }

    /// Parses a control string.
    ///
    /// # Example
    /// ```
    /// use callsettings::{ControlRequest, ControlType};
    ///
    /// let req = ControlRequest::parse("*#31#").unwrap();
    /// assert_eq!(req.control_type, ControlType::Query);
    /// assert_eq!(req.code, "31");
    /// assert!(!req.has_arguments());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ControlParseError> {
        Self::parse_fields(input).inspect_err(|e| {
            tracing::debug!(input, error = e.as_label(), "control string rejected");
        })
    }

    fn parse_fields(input: &str) -> Result<Self, ControlParseError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ControlParseError::Empty);
        }

        let (control_type, rest) = ControlType::PREFIXES
            .iter()
            .find_map(|(prefix, ty)| input.strip_prefix(prefix).map(|rest| (*ty, rest)))
            .ok_or(ControlParseError::MissingPrefix)?;

        let (body, dn) = rest
            .split_once('#')
            .ok_or(ControlParseError::MissingTerminator)?;

        let mut fields = body.split('*');
        let code = fields.next().unwrap_or_default();
        if code.is_empty() {
            return Err(ControlParseError::MissingServiceCode);
        }
        if let Some(c) = code.chars().find(|c| !c.is_ascii_digit()) {
            return Err(ControlParseError::InvalidCharacter(c));
        }

        let mut args: [&str; 3] = [""; 3];
        for (i, field) in fields.enumerate() {
            let slot = args.get_mut(i).ok_or(ControlParseError::TooManyArguments)?;
            if let Some(c) = field.chars().find(|c| !is_dial_char(*c)) {
                return Err(ControlParseError::InvalidCharacter(c));
            }
            *slot = field;
        }

        if let Some(c) = dn.chars().find(|c| !is_dial_char(*c)) {
            return Err(ControlParseError::InvalidCharacter(c));
        }

        let [sia, sib, sic] = args;
        Ok(ControlRequest::new(control_type, code)
            .with_supplementary(sia, sib, sic)
            .with_destination(dn))
    }
}

fn is_dial_char(c: char) -> bool {
    c.is_ascii_digit() || c == '+'
}
