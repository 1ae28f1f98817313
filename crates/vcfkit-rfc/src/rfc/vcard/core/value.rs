//! Embedded data values (PHOTO, LOGO, SOUND, KEY).

use std::cell::OnceCell;
use std::fmt;

use url::Url;

use super::parameter::{DataType, ParameterSection, ValueEncoding};
use crate::rfc::vcard::codec::{DataUrl, base64, quoted_printable, unmask};

/// The decoded content of a data property. Exactly one case applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataPropertyValue {
    /// Embedded text, e.g. a PGP key in ASCII armor.
    Text(String),
    /// Embedded binary data.
    Bytes(Vec<u8>),
    /// A reference to external data.
    Uri(Url),
}

impl DataPropertyValue {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Uri(_) => false,
        }
    }
}

/// What a [`DataProperty`] was read from, kept until first access.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawData {
    value: String,
    encoding: Option<ValueEncoding>,
    charset: Option<String>,
    data_type: Option<DataType>,
    has_media_type: bool,
}

/// A data property value that is decoded on first access.
///
/// The decoded [`DataPropertyValue`] is computed once and cached, so every
/// call to [`DataProperty::value`] returns the same instance.
#[derive(Clone)]
pub struct DataProperty {
    raw: Option<RawData>,
    value: OnceCell<DataPropertyValue>,
}

impl DataProperty {
    /// Wraps a raw row value. The transfer encoding and data type are taken
    /// from `params`; nothing is decoded yet.
    #[must_use]
    pub fn from_raw(value: impl Into<String>, params: &ParameterSection) -> Self {
        Self {
            raw: Some(RawData {
                value: value.into(),
                encoding: params.encoding,
                charset: params.charset.clone(),
                data_type: params.data_type,
                has_media_type: params.media_type.is_some(),
            }),
            value: OnceCell::new(),
        }
    }

    /// Wraps an already decoded value.
    #[must_use]
    pub fn new(value: DataPropertyValue) -> Self {
        Self {
            raw: None,
            value: OnceCell::from(value),
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::new(DataPropertyValue::Bytes(bytes))
    }

    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(DataPropertyValue::Text(text.into()))
    }

    #[must_use]
    pub fn from_uri(uri: Url) -> Self {
        Self::new(DataPropertyValue::Uri(uri))
    }

    /// Returns the decoded value, decoding it on first access.
    pub fn value(&self) -> &DataPropertyValue {
        self.value.get_or_init(|| match &self.raw {
            Some(raw) => decode(raw),
            None => DataPropertyValue::Bytes(Vec::new()),
        })
    }

    /// Media type carried by an embedded `data:` URL, without decoding the
    /// payload.
    #[must_use]
    pub fn embedded_media_type(&self) -> Option<String> {
        let raw = self.raw.as_ref()?;
        DataUrl::parse(&raw.value)?.essence()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match &self.raw {
            Some(raw) if self.value.get().is_none() => raw.value.trim().is_empty(),
            _ => self.value().is_empty(),
        }
    }
}

/// Decoding order: `data:` URL, Base64, explicit URI, Quoted-Printable
/// binary, absolute URI, embedded text.
fn decode(raw: &RawData) -> DataPropertyValue {
    let value = raw.value.trim();

    if let Some(url) = DataUrl::parse(value) {
        return url.decode();
    }

    if raw.encoding == Some(ValueEncoding::Base64) || raw.data_type == Some(DataType::Binary) {
        return DataPropertyValue::Bytes(base64::decode(value));
    }

    if matches!(raw.data_type, Some(DataType::Uri | DataType::ContentId)) {
        if let Some(uri) = parse_uri(value, raw.data_type == Some(DataType::ContentId)) {
            return DataPropertyValue::Uri(uri);
        }
        tracing::debug!(value, "Data property declared as URI is not a valid URI");
    }

    if raw.encoding == Some(ValueEncoding::QuotedPrintable) {
        return if raw.has_media_type && raw.data_type != Some(DataType::Text) {
            DataPropertyValue::Bytes(quoted_printable::decode(value))
        } else {
            DataPropertyValue::Text(quoted_printable::decode_to_string(
                value,
                raw.charset.as_deref(),
            ))
        };
    }

    if raw.data_type.is_none()
        && !value.contains(char::is_whitespace)
        && let Some(uri) = parse_uri(value, false)
    {
        return DataPropertyValue::Uri(uri);
    }

    DataPropertyValue::Text(unmask(value))
}

/// Parses an absolute URI. 2.1 content ids (`<id>`) become `cid:` URIs.
fn parse_uri(value: &str, content_id: bool) -> Option<Url> {
    if content_id && !value.to_ascii_lowercase().starts_with("cid:") {
        let id = value.trim_start_matches('<').trim_end_matches('>');
        return Url::parse(&format!("cid:{id}")).ok();
    }
    Url::parse(value).ok()
}

impl fmt::Debug for DataProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("DataProperty");
        match self.value.get() {
            Some(value) => s.field("value", value),
            None => s.field("raw", &self.raw),
        };
        s.finish()
    }
}

impl PartialEq for DataProperty {
    fn eq(&self, other: &Self) -> bool {
        self.value() == other.value()
    }
}

impl Eq for DataProperty {}
