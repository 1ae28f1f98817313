//! Line folding.

use vcfkit_core::constants::{FOLD_SEQUENCE, MAX_BYTES_PER_LINE};

/// Folds a content line to at most 75 octets per physical line.
///
/// Continuation lines start with a space, which counts toward their length.
/// Folds only at UTF-8 character boundaries and never between a backslash
/// and the character it escapes.
#[must_use]
pub fn fold_line(line: &str) -> String {
    if line.len() <= MAX_BYTES_PER_LINE {
        return line.to_string();
    }

    let mut result = String::with_capacity(line.len() + line.len() / MAX_BYTES_PER_LINE * 3);
    let mut current_len = 0;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        // An escape sequence is placed as a unit.
        let escaped = (c == '\\').then(|| chars.next()).flatten();
        let unit_len = c.len_utf8() + escaped.map_or(0, char::len_utf8);

        if current_len + unit_len > MAX_BYTES_PER_LINE && current_len > 0 {
            result.push_str(FOLD_SEQUENCE);
            current_len = 1;
        }

        result.push(c);
        if let Some(e) = escaped {
            result.push(e);
        }
        current_len += unit_len;
    }

    result
}
