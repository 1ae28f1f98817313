//! Quoted-Printable transfer encoding (vCard 2.1).

use vcfkit_core::constants::{CRLF, MAX_BYTES_PER_LINE};

use super::charset::decode_text;

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Decodes Quoted-Printable text into raw bytes.
///
/// `=` followed by a line break is a soft break and produces nothing.
/// An `=` that does not start a valid hex pair is dropped together with the
/// characters it would have consumed.
#[must_use]
pub fn decode(text: &str) -> Vec<u8> {
    let bytes = text.as_bytes();
    let mut result = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'=' {
            result.push(b);
            i += 1;
            continue;
        }

        match (bytes.get(i + 1), bytes.get(i + 2)) {
            (Some(b'\r'), Some(b'\n')) => i += 3,
            (Some(b'\n' | b'\r'), _) => i += 2,
            (Some(&hi), Some(&lo)) => {
                if let (Some(hi), Some(lo)) = (hex_value(hi), hex_value(lo)) {
                    result.push((hi << 4) | lo);
                } else {
                    tracing::debug!(offset = i, "Dropping invalid Quoted-Printable escape");
                }
                i += 3;
            }
            _ => {
                tracing::debug!(offset = i, "Dropping truncated Quoted-Printable escape");
                break;
            }
        }
    }

    result
}

/// Decodes Quoted-Printable text and converts the bytes with `charset`
/// (UTF-8 when absent or unknown).
#[must_use]
pub fn decode_to_string(text: &str, charset: Option<&str>) -> String {
    decode_text(&decode(text), charset)
}

/// Encodes bytes as Quoted-Printable with soft line breaks.
///
/// `first_line_used` is the number of octets already on the first physical
/// line (the property name and parameters). No physical line exceeds
/// [`MAX_BYTES_PER_LINE`] octets and no `=XX` triplet is split.
#[must_use]
pub fn encode(bytes: &[u8], first_line_used: usize) -> String {
    // One octet is reserved for the soft break marker.
    const LIMIT: usize = MAX_BYTES_PER_LINE - 1;

    let mut result = String::with_capacity(bytes.len() * 3);
    let mut line_len = first_line_used;

    for (i, &b) in bytes.iter().enumerate() {
        let is_last = i + 1 == bytes.len();
        let literal = match b {
            b'=' => false,
            b' ' | b'\t' => !is_last,
            33..=126 => true,
            _ => false,
        };
        let width = if literal { 1 } else { 3 };

        if line_len + width > LIMIT {
            result.push('=');
            result.push_str(CRLF);
            line_len = 0;
        }

        if literal {
            result.push(char::from(b));
        } else {
            result.push('=');
            result.push(char::from(HEX[usize::from(b >> 4)]));
            result.push(char::from(HEX[usize::from(b & 0x0F)]));
        }
        line_len += width;
    }

    result
}

/// Returns whether `text` needs Quoted-Printable in a 2.1 file.
#[must_use]
pub fn needs_encoding(text: &str) -> bool {
    text.bytes().any(|b| !(32..=126).contains(&b))
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}
