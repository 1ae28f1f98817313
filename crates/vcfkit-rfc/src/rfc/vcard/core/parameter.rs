//! vCard parameter section.
//!
//! Known parameters are held in typed fields; anything else lands in
//! [`ParameterSection::non_standard`] in the order it was read.

use std::fmt;

use crate::error::{RfcError, RfcResult};
use crate::rfc::vcard::core::VCardVersion;

/// Transfer encoding declared by the ENCODING parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueEncoding {
    /// `QUOTED-PRINTABLE` (2.1 only).
    QuotedPrintable,
    /// `BASE64` (2.1) or `b` (3.0).
    Base64,
    /// `8BIT`.
    EightBit,
    /// `7BIT`.
    SevenBit,
}

impl ValueEncoding {
    /// Parses an ENCODING value, case-insensitively.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("QUOTED-PRINTABLE") {
            Some(Self::QuotedPrintable)
        } else if value.eq_ignore_ascii_case("BASE64") || value.eq_ignore_ascii_case("B") {
            Some(Self::Base64)
        } else if value.eq_ignore_ascii_case("8BIT") {
            Some(Self::EightBit)
        } else if value.eq_ignore_ascii_case("7BIT") {
            Some(Self::SevenBit)
        } else {
            None
        }
    }

    /// Returns the token written for `version`.
    #[must_use]
    pub const fn as_str(self, version: VCardVersion) -> &'static str {
        match (self, version) {
            (Self::QuotedPrintable, _) => "QUOTED-PRINTABLE",
            (Self::Base64, VCardVersion::V2_1) => "BASE64",
            (Self::Base64, _) => "b",
            (Self::EightBit, _) => "8BIT",
            (Self::SevenBit, _) => "7BIT",
        }
    }
}

/// Value data type declared by the VALUE parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Text,
    /// `URI` (3.0/4.0) or `URL` (2.1).
    Uri,
    Date,
    Time,
    DateTime,
    DateAndOrTime,
    Timestamp,
    Boolean,
    Integer,
    Float,
    UtcOffset,
    LanguageTag,
    /// 3.0 `BINARY`.
    Binary,
    /// 3.0 embedded `VCARD`.
    VCard,
    /// 2.1 `CONTENT-ID` / `CID`.
    ContentId,
}

impl DataType {
    /// Parses a VALUE token. `INLINE` and unknown tokens yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let upper = value.trim().to_ascii_uppercase();
        let data_type = match upper.as_str() {
            "TEXT" => Self::Text,
            "URI" | "URL" => Self::Uri,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATE-TIME" => Self::DateTime,
            "DATE-AND-OR-TIME" => Self::DateAndOrTime,
            "TIMESTAMP" => Self::Timestamp,
            "BOOLEAN" => Self::Boolean,
            "INTEGER" => Self::Integer,
            "FLOAT" => Self::Float,
            "UTC-OFFSET" => Self::UtcOffset,
            "LANGUAGE-TAG" => Self::LanguageTag,
            "BINARY" => Self::Binary,
            "VCARD" => Self::VCard,
            "CONTENT-ID" | "CID" => Self::ContentId,
            _ => return None,
        };
        Some(data_type)
    }

    /// Returns the token written for `version`, or `None` when the data type
    /// has no representation there and the parameter must be omitted.
    #[must_use]
    pub const fn as_str(self, version: VCardVersion) -> Option<&'static str> {
        use VCardVersion::{V2_1, V3_0, V4_0};

        let s = match (self, version) {
            (Self::Uri, V2_1) => "URL",
            (Self::Uri | Self::ContentId, V3_0) => "URI",
            (Self::Uri | Self::ContentId, V4_0) => "uri",
            (Self::ContentId, V2_1) => "CONTENT-ID",
            (Self::Binary, V3_0) => "BINARY",
            (Self::VCard, V3_0) => "VCARD",
            (Self::Binary | Self::VCard, _) => return None,
            (Self::Text, V4_0) => "text",
            (Self::Text, _) => "TEXT",
            (Self::Date, V4_0) => "date",
            (Self::Date, _) => "DATE",
            (Self::Time, V4_0) => "time",
            (Self::Time, _) => "TIME",
            (Self::DateTime, V4_0) => "date-time",
            (Self::DateTime, _) => "DATE-TIME",
            (Self::DateAndOrTime, V4_0) => "date-and-or-time",
            (Self::DateAndOrTime, _) => "DATE-TIME",
            (Self::Timestamp, V4_0) => "timestamp",
            (Self::Timestamp, _) => "DATE-TIME",
            (Self::Boolean, V4_0) => "boolean",
            (Self::Boolean, _) => "BOOLEAN",
            (Self::Integer, V4_0) => "integer",
            (Self::Integer, _) => "INTEGER",
            (Self::Float, V4_0) => "float",
            (Self::Float, _) => "FLOAT",
            (Self::UtcOffset, V4_0) => "utc-offset",
            (Self::UtcOffset, _) => "UTC-OFFSET",
            (Self::LanguageTag, V4_0) => "language-tag",
            (Self::LanguageTag, _) => return None,
        };
        Some(s)
    }
}

/// A geographical position (GEO property or parameter).
///
/// Coordinates are rounded to six decimal places on construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoCoordinate {
    latitude: f64,
    longitude: f64,
    uncertainty: Option<f64>,
}

impl GeoCoordinate {
    /// Creates a coordinate.
    ///
    /// ## Errors
    /// Returns `RfcError::ValidationError` if the latitude is outside
    /// `[-90, 90]` or the longitude outside `[-180, 180]` (NaN included).
    pub fn new(latitude: f64, longitude: f64) -> RfcResult<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(RfcError::ValidationError(format!(
                "latitude out of range: {latitude}"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(RfcError::ValidationError(format!(
                "longitude out of range: {longitude}"
            )));
        }

        Ok(Self {
            latitude: round6(latitude),
            longitude: round6(longitude),
            uncertainty: None,
        })
    }

    /// Attaches an uncertainty radius in meters.
    ///
    /// ## Errors
    /// Returns `RfcError::ValidationError` if `meters` is negative, NaN or
    /// infinite.
    pub fn with_uncertainty(mut self, meters: f64) -> RfcResult<Self> {
        if !meters.is_finite() || meters < 0.0 {
            return Err(RfcError::ValidationError(format!(
                "uncertainty must be a non-negative number of meters: {meters}"
            )));
        }
        self.uncertainty = Some(meters);
        Ok(self)
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub const fn uncertainty(&self) -> Option<f64> {
        self.uncertainty
    }

    /// Parses a GEO value in any of the forms seen in the wild:
    /// `geo:lat,lon[;u=x]` (4.0), `lat;lon` (3.0) and `lat,lon` (2.1 variants).
    ///
    /// Returns `None` for unparseable or out-of-range input.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();

        if let Some(uri) = strip_prefix_ignore_case(value, "geo:") {
            let mut parts = uri.split(';');
            let (lat, lon) = parts.next()?.split_once(',')?;
            let mut coordinate = Self::new(parse_float(lat)?, parse_float(lon)?).ok()?;
            for param in parts {
                if let Some(u) = strip_prefix_ignore_case(param.trim(), "u=") {
                    coordinate = coordinate.with_uncertainty(parse_float(u)?).ok()?;
                }
            }
            return Some(coordinate);
        }

        let (lat, lon) = value.split_once(';').or_else(|| value.split_once(','))?;
        Self::new(parse_float(lat)?, parse_float(lon)?).ok()
    }

    /// Formats the coordinate for `version`: a `geo:` URI in 4.0,
    /// `lat;lon` otherwise.
    #[must_use]
    pub fn to_value(&self, version: VCardVersion) -> String {
        match version {
            VCardVersion::V2_1 | VCardVersion::V3_0 => {
                format!("{};{}", format_float(self.latitude), format_float(self.longitude))
            }
            VCardVersion::V4_0 => self.to_string(),
        }
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "geo:{},{}",
            format_float(self.latitude),
            format_float(self.longitude)
        )?;
        if let Some(u) = self.uncertainty {
            write!(f, ";u={u:.0}")?;
        }
        Ok(())
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// At least one decimal, at most six.
fn format_float(value: f64) -> String {
    let s = format!("{value:.6}");
    let trimmed = s.trim_end_matches('0');
    if trimmed.ends_with('.') {
        format!("{trimmed}0")
    } else {
        trimmed.to_string()
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &s[prefix.len()..])
}

/// Typed view over a property's parameters.
///
/// Names are case-insensitive on input. Multi-valued parameters keep their
/// values in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSection {
    pub encoding: Option<ValueEncoding>,
    /// Charset name as written (2.1 `CHARSET`).
    pub charset: Option<String>,
    /// MIME media type (4.0 `MEDIATYPE`, or derived from a 2.1/3.0 TYPE token).
    pub media_type: Option<String>,
    pub data_type: Option<DataType>,
    /// 1 (most preferred) to 100. 2.1/3.0 `TYPE=PREF` reads as 1.
    pub preference: Option<u8>,
    /// TYPE tokens, uppercased, `PREF` excluded.
    pub types: Vec<String>,
    pub label: Option<String>,
    pub geo: Option<GeoCoordinate>,
    pub time_zone: Option<String>,
    pub language: Option<String>,
    pub alt_id: Option<String>,
    pub pid: Vec<String>,
    pub sort_as: Vec<String>,
    pub calscale: Option<String>,
    /// Unrecognized parameters as `(UPPERCASE-NAME, values)`.
    pub non_standard: Vec<(String, Vec<String>)>,
}

impl ParameterSection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether no parameter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Stores a parameter read from the wire.
    ///
    /// Values that cannot be interpreted for a known name are kept in
    /// [`Self::non_standard`] so they are not lost.
    pub fn add(&mut self, name: &str, values: Vec<String>) {
        let upper = name.trim().to_ascii_uppercase();
        let first = values.first().map(|v| v.trim().to_string());

        match upper.as_str() {
            "TYPE" => self.add_types(values),
            "ENCODING" => match first.as_deref().and_then(ValueEncoding::parse) {
                Some(encoding) => self.encoding = Some(encoding),
                None => self.keep_unknown(upper, values),
            },
            "VALUE" => match first.as_deref() {
                Some(v) if v.eq_ignore_ascii_case("INLINE") => {}
                Some(v) => match DataType::parse(v) {
                    Some(data_type) => self.data_type = Some(data_type),
                    None => self.keep_unknown(upper, values),
                },
                None => {}
            },
            "CHARSET" => self.charset = first.filter(|v| !v.is_empty()),
            "MEDIATYPE" => self.media_type = first.filter(|v| !v.is_empty()),
            "PREF" => match first.as_deref().and_then(|v| v.parse::<u8>().ok()) {
                Some(pref) => self.preference = Some(pref.clamp(1, 100)),
                None => self.keep_unknown(upper, values),
            },
            "LABEL" => self.label = values.into_iter().next(),
            "GEO" => {
                let joined = values.join(",");
                match GeoCoordinate::parse(&joined) {
                    Some(geo) => self.geo = Some(geo),
                    None => self.keep_unknown(upper, vec![joined]),
                }
            }
            "TZ" => self.time_zone = values.into_iter().next(),
            "LANGUAGE" => self.language = first,
            "ALTID" => self.alt_id = first,
            "PID" => self.pid.extend(values),
            "SORT-AS" => self.sort_as.extend(values),
            "CALSCALE" => self.calscale = first,
            _ => self.keep_unknown(upper, values),
        }
    }

    fn add_types(&mut self, values: Vec<String>) {
        for value in values {
            let token = value.trim().to_ascii_uppercase();
            if token.is_empty() {
                continue;
            }
            if token == "PREF" {
                self.preference = Some(1);
            } else if !self.types.contains(&token) {
                self.types.push(token);
            }
        }
    }

    fn keep_unknown(&mut self, name: String, values: Vec<String>) {
        self.non_standard.push((name, values));
    }

    /// Returns whether TYPE contains `token` (case-insensitive).
    #[must_use]
    pub fn has_type(&self, token: &str) -> bool {
        self.types.iter().any(|t| t.eq_ignore_ascii_case(token))
    }

    /// Adds a TYPE token if absent.
    pub fn add_type(&mut self, token: &str) {
        self.add_types(vec![token.to_string()]);
    }

    /// Removes a TYPE token, returning whether it was present.
    pub fn remove_type(&mut self, token: &str) -> bool {
        let before = self.types.len();
        self.types.retain(|t| !t.eq_ignore_ascii_case(token));
        before != self.types.len()
    }

    /// Preference rank with unset treated as least preferred.
    #[must_use]
    pub fn preference_rank(&self) -> u8 {
        self.preference.unwrap_or(100)
    }
}
