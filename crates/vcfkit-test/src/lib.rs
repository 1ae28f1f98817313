//! vcfkit - integration test support.
//!
//! Re-exports the parser crate and a few helpers shared by the tests in
//! `tests/`.

pub use vcfkit_rfc as rfc;

use vcfkit_core::VcfOptions;
use vcfkit_rfc::rfc::vcard::{VCard, VCardVersion, parse_single, serialize_single};

/// Every supported version, oldest first.
pub const ALL_VERSIONS: [VCardVersion; 3] =
    [VCardVersion::V2_1, VCardVersion::V3_0, VCardVersion::V4_0];

/// Serializer options that keep every property of a parsed record.
#[must_use]
pub fn lossless_options() -> VcfOptions {
    VcfOptions::ALL.unset(VcfOptions::INCLUDE_AGENT_AS_SEPARATE_VCARD)
}

/// Wraps content lines in a record of `version`, with CRLF line endings.
#[must_use]
pub fn vcard(version: &str, lines: &[&str]) -> String {
    let mut out = format!("BEGIN:VCARD\r\nVERSION:{version}\r\n");
    for line in lines {
        out.push_str(line);
        out.push_str("\r\n");
    }
    out.push_str("END:VCARD\r\n");
    out
}

/// Serializes `card` as `version` and parses the result again.
///
/// # Panics
/// Panics if the serialized text cannot be parsed.
#[must_use]
pub fn reparse(card: &VCard, version: VCardVersion, options: VcfOptions) -> VCard {
    let text = serialize_single(card, version, options);
    tracing::debug!(%version, %options, len = text.len(), "Reparsing serialized vCard");
    match parse_single(&text) {
        Ok(card) => card,
        Err(e) => panic!("serialized vCard did not parse: {e}\n{text}"),
    }
}

/// Physical lines of serialized output, without terminators.
#[must_use]
pub fn physical_lines(output: &str) -> Vec<&str> {
    output
        .split("\r\n")
        .filter(|line| !line.is_empty())
        .collect()
}
