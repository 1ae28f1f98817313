//! `data:` URLs (RFC 2397) as used by vCard 4.0 for embedded media.

use super::{base64, charset};
use crate::rfc::vcard::core::DataPropertyValue;

/// The parts of a `data:` URL. The payload is not decoded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl<'a> {
    /// Media type including parameters, if given.
    pub media_type: Option<&'a str>,
    pub is_base64: bool,
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Splits `value` into its parts; `None` if it is not a `data:` URL.
    #[must_use]
    pub fn parse(value: &'a str) -> Option<Self> {
        let value = value.trim();
        let scheme = value.get(..5)?;
        if !scheme.eq_ignore_ascii_case("data:") {
            return None;
        }

        let (header, payload) = value[5..].split_once(',')?;
        let (media_type, is_base64) = match header.rsplit_once(';') {
            Some((rest, last)) if last.trim().eq_ignore_ascii_case("base64") => (rest, true),
            _ if header.trim().eq_ignore_ascii_case("base64") => ("", true),
            _ => (header, false),
        };
        let media_type = media_type.trim();

        Some(Self {
            media_type: (!media_type.is_empty()).then_some(media_type),
            is_base64,
            payload,
        })
    }

    /// Media type without parameters, lowercased.
    #[must_use]
    pub fn essence(&self) -> Option<String> {
        self.media_type
            .and_then(|mt| mt.split(';').next())
            .map(|e| e.trim().to_ascii_lowercase())
            .filter(|e| !e.is_empty())
    }

    /// Decodes the payload.
    ///
    /// Base64 payloads are bytes. Other payloads are percent-decoded and
    /// become text when the media type is absent or `text/*`.
    #[must_use]
    pub fn decode(&self) -> DataPropertyValue {
        if self.is_base64 {
            return DataPropertyValue::Bytes(base64::decode(self.payload));
        }

        let bytes = percent_decode(self.payload);
        let is_text = self
            .essence()
            .is_none_or(|essence| essence.starts_with("text/"));
        if is_text {
            DataPropertyValue::Text(charset::decode_text(&bytes, self.charset()))
        } else {
            DataPropertyValue::Bytes(bytes)
        }
    }

    fn charset(&self) -> Option<&'a str> {
        self.media_type?.split(';').skip(1).find_map(|param| {
            let (name, value) = param.split_once('=')?;
            name.trim()
                .eq_ignore_ascii_case("charset")
                .then(|| value.trim().trim_matches('"'))
        })
    }
}

/// Builds a base64 `data:` URL.
#[must_use]
pub fn encode(media_type: Option<&str>, bytes: &[u8]) -> String {
    let media_type = media_type.unwrap_or("application/octet-stream");
    format!("data:{media_type};base64,{}", base64::encode(bytes))
}

/// Decodes `%XX` sequences; malformed ones are kept literally.
fn percent_decode(s: &str) -> Vec<u8> {
    let bytes = s.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%'
            && let Some(hex) = s.get(i + 1..i + 3)
            && hex.bytes().all(|c| c.is_ascii_hexdigit())
            && let Ok(b) = u8::from_str_radix(hex, 16)
        {
            result.push(b);
            i += 3;
            continue;
        }
        result.push(bytes[i]);
        i += 1;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_base64_url() {
        let url = DataUrl::parse("data:image/png;base64,iVBORw0KGgo=").unwrap();
        assert_eq!(url.media_type, Some("image/png"));
        assert!(url.is_base64);
        assert_eq!(url.payload, "iVBORw0KGgo=");
        assert_eq!(
            url.decode(),
            DataPropertyValue::Bytes(vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A])
        );
    }

    #[test]
    fn parse_plain_text_url() {
        let url = DataUrl::parse("data:,Hello%2C%20World").unwrap();
        assert_eq!(url.media_type, None);
        assert!(!url.is_base64);
        assert_eq!(url.decode(), DataPropertyValue::Text("Hello, World".into()));
    }

    #[test]
    fn text_url_with_charset() {
        let url = DataUrl::parse("data:text/plain;charset=iso-8859-1,M%FCller").unwrap();
        assert_eq!(url.essence().as_deref(), Some("text/plain"));
        assert_eq!(url.decode(), DataPropertyValue::Text("Müller".into()));
    }

    #[test]
    fn non_data_urls_are_rejected() {
        assert!(DataUrl::parse("http://example.com/a.png").is_none());
        assert!(DataUrl::parse("data:image/png;base64").is_none());
    }

    #[test]
    fn malformed_percent_is_literal() {
        assert_eq!(percent_decode("100%zz%4"), b"100%zz%4");
    }

    #[test]
    fn signed_percent_is_literal() {
        assert_eq!(percent_decode("%+F%-1"), b"%+F%-1");
        assert_eq!(percent_decode("a%2b%2B"), b"a++");
    }

    #[test]
    fn encode_defaults_media_type() {
        assert_eq!(encode(None, b"Hi"), "data:application/octet-stream;base64,SGk=");
        assert_eq!(encode(Some("image/gif"), b""), "data:image/gif;base64,");
    }
}
