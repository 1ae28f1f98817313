//! Base64 transfer encoding.
//!
//! Decoding is best-effort: whitespace and characters outside the alphabet
//! are dropped and padding is optional.

use ::base64::Engine;
use ::base64::alphabet;
use ::base64::engine::general_purpose::STANDARD;
use ::base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

const TOLERANT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encodes `bytes` with the standard alphabet and padding.
#[must_use]
pub fn encode(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decodes Base64 text leniently.
///
/// URL-safe characters are mapped to the standard alphabet. A dangling
/// single character that cannot form a byte is ignored.
#[must_use]
pub fn decode(text: &str) -> Vec<u8> {
    let mut cleaned: Vec<u8> = text
        .bytes()
        .filter_map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'+' | b'/' => Some(b),
            b'-' => Some(b'+'),
            b'_' => Some(b'/'),
            _ => None,
        })
        .collect();

    if cleaned.len() % 4 == 1 {
        tracing::debug!(len = cleaned.len(), "Dropping dangling Base64 character");
        cleaned.pop();
    }

    match TOLERANT.decode(&cleaned) {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, "Base64 value could not be decoded");
            Vec::new()
        }
    }
}
