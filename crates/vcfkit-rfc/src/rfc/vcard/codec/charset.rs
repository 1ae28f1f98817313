//! Charset lookup and text decoding.

use encoding_rs::Encoding;

/// Resolves a CHARSET parameter value to a text codec.
///
/// Unknown or absent names resolve to UTF-8.
#[must_use]
pub fn encoding_for(charset: Option<&str>) -> &'static Encoding {
    charset
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .and_then(|label| {
            let resolved = Encoding::for_label(label.as_bytes());
            if resolved.is_none() {
                tracing::debug!(charset = label, "Unknown charset, falling back to UTF-8");
            }
            resolved
        })
        .unwrap_or(encoding_rs::UTF_8)
}

/// Decodes `bytes` with the named charset.
///
/// Malformed sequences are replaced with U+FFFD. A byte order mark matching
/// the charset is removed.
#[must_use]
pub fn decode_text(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = encoding_for(charset);
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(
            encoding = encoding.name(),
            "Malformed byte sequence replaced during decoding"
        );
    }
    decoded.into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_labels() {
        assert_eq!(encoding_for(Some("ISO-8859-1")), encoding_rs::WINDOWS_1252);
        assert_eq!(encoding_for(Some(" utf-8 ")), encoding_rs::UTF_8);
    }

    #[test_log::test]
    fn unknown_label_falls_back_to_utf8() {
        assert_eq!(encoding_for(Some("x-no-such-charset")), encoding_rs::UTF_8);
        assert_eq!(encoding_for(None), encoding_rs::UTF_8);
    }

    #[test]
    fn decodes_latin1() {
        assert_eq!(decode_text(&[0x4D, 0xFC, 0x6C, 0x6C, 0x65, 0x72], Some("ISO-8859-1")), "Müller");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(decode_text(&[0x61, 0xFF, 0x62], None), "a\u{FFFD}b");
    }
}
