//! vCard text masking.
//!
//! Masking backslash-escapes the characters that would otherwise be read as
//! line syntax. Which characters are masked depends on the version.

use crate::rfc::vcard::core::VCardVersion;

/// How the value being masked is delimited on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaskMode {
    /// The value may be split on `,` or `;`: both are escaped.
    #[default]
    List,
    /// The value is a single flat text. vCard 3.0 leaves `,` and `;`
    /// unescaped in this mode; 4.0 escapes them regardless.
    Flat,
}

/// Masks `text` for the given version.
///
/// - 4.0: `\`, `,`, `;` and line breaks.
/// - 3.0: `\` and line breaks; `,` and `;` only in [`MaskMode::List`].
/// - 2.1: `\` and line breaks only.
///
/// CRLF and lone CR are written as a single `\n`.
#[must_use]
pub fn mask(text: &str, version: VCardVersion, mode: MaskMode) -> String {
    let mask_delimiters = match version {
        VCardVersion::V2_1 => false,
        VCardVersion::V3_0 => mode == MaskMode::List,
        VCardVersion::V4_0 => true,
    };

    let mut result = String::with_capacity(text.len() + text.len() / 8);
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                result.push_str("\\n");
            }
            '\n' => result.push_str("\\n"),
            ',' | ';' if mask_delimiters => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Reverses [`mask`] in a single pass.
///
/// `\n` and `\N` become a line break; any other escaped character stands for
/// itself. A trailing backslash with nothing after it is kept literally.
/// The rules are the same for every version.
#[must_use]
pub fn unmask(text: &str) -> String {
    if !text.contains('\\') {
        return text.to_string();
    }

    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(escaped) => result.push(escaped),
            None => result.push('\\'),
        }
    }

    result
}

/// Escapes a parameter value for serialization.
///
/// vCard 4.0 uses RFC 6868 caret encoding. Older versions have no escape
/// mechanism for parameters, so line breaks are replaced by a space and
/// double quotes are dropped.
/// Returns `(value, needs_quotes)`.
#[must_use]
pub fn escape_param_value(s: &str, version: VCardVersion) -> (String, bool) {
    let mut result = String::with_capacity(s.len());
    let mut needs_quotes = false;
    let caret = version == VCardVersion::V4_0;

    for c in s.chars() {
        match c {
            '^' if caret => result.push_str("^^"),
            '\n' if caret => result.push_str("^n"),
            '"' if caret => {
                result.push_str("^'");
                needs_quotes = true;
            }
            '\n' => result.push(' '),
            '"' => {}
            ':' | ';' | ',' => {
                result.push(c);
                needs_quotes = true;
            }
            _ if c.is_control() => {
                // Skip other control characters
            }
            _ => result.push(c),
        }
    }

    (result, needs_quotes)
}

/// Decodes RFC 6868 caret escapes in a parameter value.
///
/// Unknown sequences are kept as they are.
#[must_use]
pub fn unescape_param_value(s: &str) -> String {
    if !s.contains('^') {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '^' {
            result.push(c);
            continue;
        }

        match chars.peek() {
            Some('n' | 'N') => {
                chars.next();
                result.push('\n');
            }
            Some('\'') => {
                chars.next();
                result.push('"');
            }
            Some('^') => {
                chars.next();
                result.push('^');
            }
            _ => result.push('^'),
        }
    }

    result
}
