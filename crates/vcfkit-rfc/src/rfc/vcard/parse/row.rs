//! Row tokenizer: one logical line into group, key, parameters and value.
//!
//! Format: `[group.]NAME[;PARAM=VALUE[,VALUE]]*[;BARE-TOKEN]*:VALUE`

use super::error::{ParseError, ParseResult};
use crate::rfc::vcard::codec::escape::unescape_param_value;
use crate::rfc::vcard::codec::{quoted_printable, unmask};
use crate::rfc::vcard::core::{ParameterSection, ValueEncoding};

/// One decoded property line.
///
/// The value starts out exactly as written. The decoding stages
/// ([`VcfRow::decode_quoted_printable`], [`VcfRow::unmask`],
/// [`VcfRow::unmask_and_trim`]) replace it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct VcfRow {
    pub group: Option<String>,
    /// Property name, uppercased.
    pub key: String,
    pub parameters: ParameterSection,
    /// `None` when the value is empty.
    pub value: Option<String>,
    /// Physical line the row starts on.
    pub line: usize,
}

impl VcfRow {
    /// Tokenizes a logical line.
    ///
    /// ## Errors
    /// Returns an error if the line has no unescaped `:` or the name is not
    /// a valid property name.
    pub fn parse(line: &str, line_number: usize) -> ParseResult<Self> {
        let colon = find_unescaped(line, ':')
            .ok_or_else(|| ParseError::missing_separator(line_number))?;
        let (head, value) = (&line[..colon], &line[colon + 1..]);

        let mut segments = split_outside_quotes(head, ';').into_iter();
        let name_segment = segments.next().unwrap_or_default().trim();

        let (group, key) = match name_segment.split_once('.') {
            Some((group, key)) => (Some(group), key),
            None => (None, name_segment),
        };

        if !is_valid_name(key) || group.is_some_and(|g| !is_valid_name(g)) {
            return Err(ParseError::invalid_name(line_number, name_segment));
        }

        let mut parameters = ParameterSection::new();
        for segment in segments {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            match find_unescaped(segment, '=') {
                Some(eq) => {
                    let values = split_outside_quotes(&segment[eq + 1..], ',')
                        .into_iter()
                        .map(parameter_value)
                        .collect();
                    parameters.add(&segment[..eq], values);
                }
                None => {
                    let token = parameter_value(segment);
                    parameters.add(classify_bare_parameter(&token), vec![token]);
                }
            }
        }

        Ok(Self {
            group: group.map(str::to_string),
            key: key.to_ascii_uppercase(),
            parameters,
            value: (!value.is_empty()).then(|| value.to_string()),
            line: line_number,
        })
    }

    /// Decodes a Quoted-Printable value with the declared charset.
    ///
    /// The ENCODING and CHARSET parameters are consumed.
    pub fn decode_quoted_printable(&mut self) {
        if self.parameters.encoding != Some(ValueEncoding::QuotedPrintable) {
            return;
        }
        if let Some(value) = self.value.take() {
            let decoded =
                quoted_printable::decode_to_string(&value, self.parameters.charset.as_deref());
            self.value = (!decoded.is_empty()).then_some(decoded);
        }
        self.parameters.encoding = None;
        self.parameters.charset = None;
    }

    /// Removes masking from the value.
    pub fn unmask(&mut self) {
        if let Some(value) = self.value.as_mut() {
            *value = unmask(value);
        }
    }

    /// Unmasks, trims whitespace and strips enclosing double quotes.
    /// A value left empty becomes `None`.
    pub fn unmask_and_trim(&mut self) {
        self.value = self.value.take().and_then(|value| {
            let unmasked = unmask(&value);
            let trimmed = unmasked.trim().trim_matches('"').trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        });
    }

    /// Returns the value or an empty string.
    #[must_use]
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or_default()
    }
}

/// Maps a 2.1 parameter written without a name to the parameter it
/// belongs to.
#[must_use]
pub fn classify_bare_parameter(token: &str) -> &'static str {
    const ENCODINGS: [&str; 5] = ["QUOTED-PRINTABLE", "BASE64", "B", "8BIT", "7BIT"];
    const VALUE_KINDS: [&str; 4] = ["INLINE", "URL", "CONTENT-ID", "CID"];

    let token = token.trim();
    if ENCODINGS.iter().any(|e| e.eq_ignore_ascii_case(token)) {
        "ENCODING"
    } else if VALUE_KINDS.iter().any(|v| v.eq_ignore_ascii_case(token)) {
        "VALUE"
    } else {
        "TYPE"
    }
}

/// Finds the first `target` that is neither backslash-escaped nor inside
/// double quotes.
fn find_unescaped(s: &str, target: char) -> Option<usize> {
    let mut masked = false;
    let mut in_quotes = false;

    for (i, c) in s.char_indices() {
        if masked {
            masked = false;
            continue;
        }
        match c {
            '\\' => masked = true,
            '"' => in_quotes = !in_quotes,
            _ if c == target && !in_quotes => return Some(i),
            _ => {}
        }
    }

    None
}

/// Splits on unescaped `delimiter` outside double quotes.
fn split_outside_quotes(s: &str, delimiter: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut rest = s;
    while let Some(pos) = find_unescaped(rest, delimiter) {
        parts.push(&rest[..pos]);
        rest = &rest[pos + delimiter.len_utf8()..];
    }
    parts.push(rest);
    parts
}

/// Strips quotes and decodes caret escapes of one parameter value.
fn parameter_value(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    unescape_param_value(unquoted)
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
