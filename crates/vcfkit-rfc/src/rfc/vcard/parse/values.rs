//! Turns tokenized rows into typed property values.
//!
//! The property name selects the value kind; a VALUE parameter overrides
//! it. Each kind runs the decoding stages it needs, so that splitting
//! happens before unmasking and binary Quoted-Printable is not forced
//! through a charset.

use url::Url;

use super::row::VcfRow;
use crate::rfc::vcard::codec::mime::{MediaKind, media_type_from_token};
use crate::rfc::vcard::codec::{SplitOptions, split, split_unmasked, try_parse_date_time, unmask};
use crate::rfc::vcard::core::{
    DataProperty, DataType, DateAndOrTime, GeoCoordinate, PropertyValue, VCardProperty,
    VCardVersion, names,
};

/// How a property's value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    /// Text that is trimmed and unquoted (identifiers, codes).
    Token,
    TextList,
    Structured,
    DateAndOrTime,
    Timestamp,
    Data,
    Uri,
    Geo,
}

impl ValueKind {
    /// Default kind for a property name.
    #[must_use]
    pub fn for_property(key: &str) -> Self {
        match key {
            names::NICKNAME | names::CATEGORIES => Self::TextList,
            names::N | names::ADR | names::ORG | names::GENDER => Self::Structured,
            names::BDAY | names::ANNIVERSARY | names::DEATHDATE => Self::DateAndOrTime,
            names::REV => Self::Timestamp,
            names::PHOTO | names::LOGO | names::SOUND | names::KEY => Self::Data,
            names::URL
            | names::SOURCE
            | names::FBURL
            | names::CALURI
            | names::CALADRURI
            | names::MEMBER
            | names::RELATED
            | "IMPP" => Self::Uri,
            names::GEO => Self::Geo,
            names::UID | "KIND" | "TZ" | "LANG" | "CLASS" | "PRODID" | "MAILER" => Self::Token,
            _ => Self::Text,
        }
    }

    /// Applies a VALUE parameter to the default kind.
    #[must_use]
    pub fn with_data_type(self, data_type: Option<DataType>) -> Self {
        match (self, data_type) {
            (Self::Data, _) | (_, None) => self,
            (
                Self::Structured | Self::TextList | Self::Token | Self::DateAndOrTime,
                Some(DataType::Text),
            ) => self,
            (_, Some(DataType::Text)) => Self::Text,
            (_, Some(DataType::Uri | DataType::ContentId)) => Self::Uri,
            (
                _,
                Some(DataType::Date | DataType::Time | DataType::DateTime | DataType::DateAndOrTime),
            ) => Self::DateAndOrTime,
            (_, Some(DataType::Timestamp)) => Self::Timestamp,
            (_, Some(DataType::Binary)) => Self::Data,
            (kind, Some(_)) => kind,
        }
    }
}

/// Builds a typed property from a row.
#[must_use]
pub fn property_from_row(mut row: VcfRow, version: VCardVersion) -> VCardProperty {
    let kind = ValueKind::for_property(&row.key).with_data_type(row.parameters.data_type);

    let value = match kind {
        ValueKind::Data => data_value(&mut row),
        ValueKind::Text => {
            row.decode_quoted_printable();
            row.unmask();
            row.value.take().map_or(PropertyValue::Empty, PropertyValue::Text)
        }
        ValueKind::Token => {
            row.decode_quoted_printable();
            row.unmask_and_trim();
            row.value.take().map_or(PropertyValue::Empty, PropertyValue::Text)
        }
        ValueKind::TextList => {
            row.decode_quoted_printable();
            text_list(row.value_str())
        }
        ValueKind::Structured => {
            row.decode_quoted_printable();
            structured(row.value_str(), version)
        }
        ValueKind::DateAndOrTime => {
            row.decode_quoted_printable();
            row.unmask_and_trim();
            date_and_or_time(&row)
        }
        ValueKind::Timestamp => {
            row.decode_quoted_printable();
            row.unmask_and_trim();
            timestamp(&row)
        }
        ValueKind::Uri => {
            row.decode_quoted_printable();
            row.unmask_and_trim();
            uri(&row)
        }
        ValueKind::Geo => {
            row.decode_quoted_printable();
            row.unmask_and_trim();
            geo(&row)
        }
    };

    VCardProperty {
        group: row.group,
        name: row.key,
        parameters: row.parameters,
        value,
    }
}

fn text_list(raw: &str) -> PropertyValue {
    let items: Vec<String> = split_unmasked(raw, ',', SplitOptions::RemoveEmptyEntries)
        .into_iter()
        .map(|s| s.trim().to_string())
        .collect();
    if items.is_empty() {
        PropertyValue::Empty
    } else {
        PropertyValue::TextList(items)
    }
}

/// `;`-separated components, each a `,`-list. 2.1 has no lists, so a
/// component there is one unmasked value.
fn structured(raw: &str, version: VCardVersion) -> PropertyValue {
    if raw.trim().is_empty() {
        return PropertyValue::Empty;
    }

    let components = split(raw, ';', SplitOptions::None)
        .map(|component| {
            if version == VCardVersion::V2_1 {
                let value = unmask(component).trim().to_string();
                if value.is_empty() { Vec::new() } else { vec![value] }
            } else {
                split_unmasked(component, ',', SplitOptions::RemoveEmptyEntries)
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .collect()
            }
        })
        .collect();

    PropertyValue::Structured(components)
}

fn date_and_or_time(row: &VcfRow) -> PropertyValue {
    let Some(value) = row.value.as_deref() else {
        return PropertyValue::Empty;
    };

    if row.parameters.data_type == Some(DataType::Text) {
        return PropertyValue::DateTime(DateAndOrTime::Text(value.to_string()));
    }

    match try_parse_date_time(value) {
        Some(dt) => PropertyValue::DateTime(DateAndOrTime::DateTime(dt)),
        None => {
            tracing::debug!(line = row.line, key = %row.key, value, "Date not in vCard grammar, keeping as text");
            PropertyValue::DateTime(DateAndOrTime::Text(value.to_string()))
        }
    }
}

fn timestamp(row: &VcfRow) -> PropertyValue {
    let Some(value) = row.value.as_deref() else {
        return PropertyValue::Empty;
    };
    match try_parse_date_time(value) {
        Some(dt) => PropertyValue::Timestamp(dt),
        None => {
            tracing::debug!(line = row.line, key = %row.key, value, "Invalid timestamp, keeping as text");
            PropertyValue::Text(value.to_string())
        }
    }
}

fn uri(row: &VcfRow) -> PropertyValue {
    let Some(value) = row.value.as_deref() else {
        return PropertyValue::Empty;
    };
    if let Ok(url) = Url::parse(value) {
        return PropertyValue::Uri(url);
    }
    if row.parameters.data_type == Some(DataType::ContentId) {
        let id = value.trim_start_matches('<').trim_end_matches('>');
        if let Ok(url) = Url::parse(&format!("cid:{id}")) {
            return PropertyValue::Uri(url);
        }
    }
    PropertyValue::Text(value.to_string())
}

fn geo(row: &VcfRow) -> PropertyValue {
    let Some(value) = row.value.as_deref() else {
        return PropertyValue::Empty;
    };
    GeoCoordinate::parse(value).map_or_else(
        || {
            tracing::debug!(line = row.line, value, "Invalid GEO value, keeping as text");
            PropertyValue::Text(value.to_string())
        },
        PropertyValue::Geo,
    )
}

/// PHOTO, LOGO, SOUND and KEY. A legacy TYPE token naming the format is
/// moved to the media type.
fn data_value(row: &mut VcfRow) -> PropertyValue {
    if row.parameters.media_type.is_none()
        && let Some(kind) = MediaKind::for_property(&row.key)
    {
        let found = row
            .parameters
            .types
            .iter()
            .enumerate()
            .find_map(|(i, token)| media_type_from_token(kind, token).map(|mt| (i, mt)));
        if let Some((index, media_type)) = found {
            row.parameters.types.remove(index);
            row.parameters.media_type = Some(media_type);
        }
    }

    match row.value.take() {
        Some(value) => PropertyValue::Data(DataProperty::from_raw(value, &row.parameters)),
        None => PropertyValue::Empty,
    }
}
