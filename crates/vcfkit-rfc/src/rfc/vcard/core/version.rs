//! vCard version tag.

use std::fmt;
use std::str::FromStr;

use crate::error::RfcError;

/// The vCard standard a record is read from or written to.
///
/// Ordered by age so that `version < VCardVersion::V4_0` reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum VCardVersion {
    /// vCard 2.1 (versit consortium). Assumed when a record has no VERSION row.
    #[default]
    V2_1,
    /// vCard 3.0 (RFC 2426).
    V3_0,
    /// vCard 4.0 (RFC 6350).
    V4_0,
}

impl VCardVersion {
    /// Returns the value written in the VERSION property.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::V2_1 => "2.1",
            Self::V3_0 => "3.0",
            Self::V4_0 => "4.0",
        }
    }

    /// Reads the value of a VERSION row.
    ///
    /// Only the major version is significant: `4`, `4.0` and ` 4.0 ` are all
    /// vCard 4.0. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let major = value.trim().split('.').next()?;
        match major {
            "2" => Some(Self::V2_1),
            "3" => Some(Self::V3_0),
            "4" => Some(Self::V4_0),
            _ => None,
        }
    }
}

impl FromStr for VCardVersion {
    type Err = RfcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RfcError::ParseError(format!("unsupported vCard version: {s}")))
    }
}

impl fmt::Display for VCardVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
