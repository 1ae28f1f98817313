//! Serialization options.
//!
//! [`VcfOptions`] is an open flag set: every flag toggles one optional
//! behavior of the serializer. Unset flags fall back to the most compatible
//! behavior.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use crate::error::CoreError;

/// Flags controlling optional serializer behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VcfOptions(u32);

impl VcfOptions {
    /// No optional behavior.
    pub const NONE: Self = Self(0);

    /// Write `group.` prefixes of grouped properties.
    pub const WRITE_GROUPS: Self = Self(1);

    /// Write properties with `X-` names that have no standard counterpart.
    pub const WRITE_NON_STANDARD_PROPERTIES: Self = Self(1 << 1);

    /// Write properties whose value is empty.
    pub const WRITE_EMPTY_PROPERTIES: Self = Self(1 << 2);

    /// Write embedded AGENT vCards as separate records referenced by UUID.
    pub const INCLUDE_AGENT_AS_SEPARATE_VCARD: Self = Self(1 << 3);

    /// Keep every ADR and LABEL in vCard 2.1 output instead of only the
    /// most preferred one.
    pub const ALLOW_MULTIPLE_ADR_AND_LABEL_IN_VCARD21: Self = Self(1 << 4);

    /// Write spouse relations as `X-SPOUSE` in vCard 2.1 and 3.0 output.
    pub const WRITE_RELATION_EXTENSIONS: Self = Self(1 << 5);

    /// Every known flag.
    pub const ALL: Self = Self(0b11_1111);

    /// The flags used when the caller does not choose any.
    pub const DEFAULT: Self = Self(
        Self::WRITE_GROUPS.0
            | Self::ALLOW_MULTIPLE_ADR_AND_LABEL_IN_VCARD21.0
            | Self::WRITE_RELATION_EXTENSIONS.0,
    );

    const NAMES: [(&'static str, Self); 6] = [
        ("write-groups", Self::WRITE_GROUPS),
        (
            "write-non-standard-properties",
            Self::WRITE_NON_STANDARD_PROPERTIES,
        ),
        ("write-empty-properties", Self::WRITE_EMPTY_PROPERTIES),
        (
            "include-agent-as-separate-vcard",
            Self::INCLUDE_AGENT_AS_SEPARATE_VCARD,
        ),
        (
            "allow-multiple-adr-and-label-in-vcard21",
            Self::ALLOW_MULTIPLE_ADR_AND_LABEL_IN_VCARD21,
        ),
        ("write-relation-extensions", Self::WRITE_RELATION_EXTENSIONS),
    ];

    /// Returns the raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns whether every flag in `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns a copy with the flags in `other` set.
    #[must_use]
    pub const fn set(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns a copy with the flags in `other` cleared.
    #[must_use]
    pub const fn unset(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Builds a flag set from a list of kebab-case flag names.
    ///
    /// ## Errors
    /// Returns [`CoreError::ConfigError`] for an unknown name.
    pub fn from_names<I, S>(names: I) -> Result<Self, CoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .try_fold(Self::NONE, |acc, name| Ok(acc | name.as_ref().parse()?))
    }

    /// Returns the kebab-case names of the flags that are set.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

impl Default for VcfOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl BitOr for VcfOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.set(rhs)
    }
}

impl BitOrAssign for VcfOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = self.set(rhs);
    }
}

impl FromStr for VcfOptions {
    type Err = CoreError;

    /// Parses a single flag name (`write-groups`, `none`, `all`, `default`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase().replace('_', "-");
        match name.as_str() {
            "none" => return Ok(Self::NONE),
            "all" => return Ok(Self::ALL),
            "default" => return Ok(Self::DEFAULT),
            _ => {}
        }

        Self::NAMES
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, flag)| *flag)
            .ok_or_else(|| CoreError::ConfigError(format!("unknown serializer option: {s}")))
    }
}

impl fmt::Display for VcfOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names().join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_flags() {
        let options = VcfOptions::default();
        assert!(options.contains(VcfOptions::WRITE_GROUPS));
        assert!(options.contains(VcfOptions::ALLOW_MULTIPLE_ADR_AND_LABEL_IN_VCARD21));
        assert!(!options.contains(VcfOptions::INCLUDE_AGENT_AS_SEPARATE_VCARD));
        assert!(!options.contains(VcfOptions::WRITE_NON_STANDARD_PROPERTIES));
    }

    #[test]
    fn set_and_unset() {
        let options = VcfOptions::NONE.set(VcfOptions::WRITE_EMPTY_PROPERTIES);
        assert!(options.contains(VcfOptions::WRITE_EMPTY_PROPERTIES));

        let options = options.unset(VcfOptions::WRITE_EMPTY_PROPERTIES);
        assert_eq!(options, VcfOptions::NONE);
    }

    #[test]
    fn all_contains_every_named_flag() {
        for (_, flag) in VcfOptions::NAMES {
            assert!(VcfOptions::ALL.contains(flag));
        }
        assert_eq!(VcfOptions::ALL.names().len(), VcfOptions::NAMES.len());
    }

    #[test]
    fn parse_flag_names() {
        let options =
            VcfOptions::from_names(["write-groups", "INCLUDE_AGENT_AS_SEPARATE_VCARD"]).unwrap();
        assert_eq!(
            options,
            VcfOptions::WRITE_GROUPS | VcfOptions::INCLUDE_AGENT_AS_SEPARATE_VCARD
        );
    }

    #[test]
    fn parse_unknown_flag() {
        let err = "write-everything".parse::<VcfOptions>().unwrap_err();
        assert!(matches!(err, CoreError::ConfigError(ref msg) if msg.ends_with("write-everything")));
        assert_eq!(err.to_string(), "Configuration error: unknown serializer option: write-everything");
    }

    #[test]
    fn display_lists_names() {
        let options = VcfOptions::WRITE_GROUPS | VcfOptions::WRITE_EMPTY_PROPERTIES;
        assert_eq!(options.to_string(), "write-groups,write-empty-properties");
    }
}
