//! vCard property and value types.

use chrono::{DateTime, FixedOffset};
use url::Url;

use super::parameter::{GeoCoordinate, ParameterSection};
use super::value::DataProperty;
use super::vcard::VCard;

/// Property names the parser and serializer treat specially.
pub mod names {
    pub const BEGIN: &str = "BEGIN";
    pub const END: &str = "END";
    pub const VERSION: &str = "VERSION";

    pub const FN: &str = "FN";
    pub const N: &str = "N";
    pub const NICKNAME: &str = "NICKNAME";
    pub const PHOTO: &str = "PHOTO";
    pub const BDAY: &str = "BDAY";
    pub const ANNIVERSARY: &str = "ANNIVERSARY";
    pub const DEATHDATE: &str = "DEATHDATE";
    pub const GENDER: &str = "GENDER";
    pub const ADR: &str = "ADR";
    pub const LABEL: &str = "LABEL";
    pub const GEO: &str = "GEO";
    pub const ORG: &str = "ORG";
    pub const LOGO: &str = "LOGO";
    pub const SOUND: &str = "SOUND";
    pub const KEY: &str = "KEY";
    pub const AGENT: &str = "AGENT";
    pub const RELATED: &str = "RELATED";
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const REV: &str = "REV";
    pub const UID: &str = "UID";
    pub const URL: &str = "URL";
    pub const SOURCE: &str = "SOURCE";
    pub const FBURL: &str = "FBURL";
    pub const CALURI: &str = "CALURI";
    pub const CALADRURI: &str = "CALADRURI";
    pub const MEMBER: &str = "MEMBER";

    pub const X_PREFIX: &str = "X-";
}

/// A date, a time or both; or text when the value is not in the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateAndOrTime {
    DateTime(DateTime<FixedOffset>),
    /// Free text, e.g. `circa 1800`, or an unparseable value kept as is.
    Text(String),
}

/// The typed value of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    /// Comma-separated list (NICKNAME, CATEGORIES).
    TextList(Vec<String>),
    /// Semicolon-separated components, each a comma-separated list
    /// (N, ADR, ORG, GENDER).
    Structured(Vec<Vec<String>>),
    DateTime(DateAndOrTime),
    /// Always serialized in UTC (REV).
    Timestamp(DateTime<FixedOffset>),
    Data(DataProperty),
    Uri(Url),
    Geo(GeoCoordinate),
    /// An embedded vCard (AGENT, or a RELATED agent).
    VCard(Box<VCard>),
    Empty,
}

impl PropertyValue {
    /// Returns whether the value carries no data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::TextList(list) => list.iter().all(String::is_empty),
            Self::Structured(components) => components.iter().flatten().all(String::is_empty),
            Self::DateTime(DateAndOrTime::Text(text)) => text.is_empty(),
            Self::Data(data) => data.is_empty(),
            Self::VCard(card) => card.properties.is_empty(),
            Self::DateTime(DateAndOrTime::DateTime(_))
            | Self::Timestamp(_)
            | Self::Uri(_)
            | Self::Geo(_) => false,
            Self::Empty => true,
        }
    }

    /// Returns the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the structured components, if this is a structured value.
    #[must_use]
    pub fn as_structured(&self) -> Option<&[Vec<String>]> {
        match self {
            Self::Structured(components) => Some(components),
            _ => None,
        }
    }

    /// Builds a structured value from single-valued components.
    #[must_use]
    pub fn structured<I, S>(components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Structured(
            components
                .into_iter()
                .map(|c| {
                    let c = c.into();
                    if c.is_empty() { Vec::new() } else { vec![c] }
                })
                .collect(),
        )
    }
}

/// A vCard property.
#[derive(Debug, Clone, PartialEq)]
pub struct VCardProperty {
    /// Property group (e.g. "item1" in "item1.TEL").
    pub group: Option<String>,
    /// Property name (uppercase).
    pub name: String,
    pub parameters: ParameterSection,
    pub value: PropertyValue,
}

impl VCardProperty {
    #[must_use]
    pub fn new(name: impl Into<String>, value: PropertyValue) -> Self {
        Self {
            group: None,
            name: name.into().to_ascii_uppercase(),
            parameters: ParameterSection::default(),
            value,
        }
    }

    /// Creates a text property.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, PropertyValue::Text(value.into()))
    }

    /// Returns whether this is an `X-` property.
    #[must_use]
    pub fn is_non_standard(&self) -> bool {
        self.name.starts_with(names::X_PREFIX)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_name_is_uppercased() {
        let prop = VCardProperty::text("fn", "Jane");
        assert_eq!(prop.name, "FN");
        assert_eq!(prop.value.as_text(), Some("Jane"));
    }

    #[test]
    fn emptiness() {
        assert!(PropertyValue::Empty.is_empty());
        assert!(PropertyValue::structured(["", "", ""]).is_empty());
        assert!(!PropertyValue::structured(["Doe", "John"]).is_empty());
        assert!(PropertyValue::TextList(vec![String::new()]).is_empty());
        assert!(!PropertyValue::Uri(Url::parse("http://x.org").unwrap()).is_empty());
    }

    #[test]
    fn non_standard_detection() {
        assert!(VCardProperty::text("X-CUSTOM", "1").is_non_standard());
        assert!(!VCardProperty::text("NOTE", "1").is_non_standard());
    }
}
