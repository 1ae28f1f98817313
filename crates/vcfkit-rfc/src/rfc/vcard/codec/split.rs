//! Splitting of raw values on unescaped delimiters.

use super::escape::unmask;

/// Controls which segments [`split`] yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SplitOptions {
    /// Every segment, empty ones included.
    #[default]
    None,
    /// Segments consisting only of whitespace are skipped.
    RemoveEmptyEntries,
}

/// Lazy iterator over the segments of a raw value.
///
/// A delimiter preceded by an unescaped backslash is not a split point.
/// Segments are yielded verbatim: escapes are left in place.
#[derive(Debug, Clone)]
pub struct ValueSplitter<'a> {
    value: &'a str,
    split_char: char,
    options: SplitOptions,
    pos: usize,
    finished: bool,
}

impl<'a> ValueSplitter<'a> {
    #[must_use]
    pub const fn new(value: &'a str, split_char: char, options: SplitOptions) -> Self {
        Self {
            value,
            split_char,
            options,
            pos: 0,
            finished: false,
        }
    }

    /// Returns the next segment regardless of the options.
    fn next_segment(&mut self) -> Option<&'a str> {
        if self.finished {
            return None;
        }

        let rest = &self.value[self.pos..];
        let mut masked = false;

        for (i, c) in rest.char_indices() {
            if masked {
                masked = false;
                continue;
            }

            if c == '\\' {
                masked = true;
            } else if c == self.split_char {
                let segment = &rest[..i];
                self.pos += i + c.len_utf8();
                return Some(segment);
            }
        }

        self.finished = true;
        Some(rest)
    }
}

impl<'a> Iterator for ValueSplitter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let segment = self.next_segment()?;
            match self.options {
                SplitOptions::None => return Some(segment),
                SplitOptions::RemoveEmptyEntries if contains_data(segment) => {
                    return Some(segment);
                }
                SplitOptions::RemoveEmptyEntries => {}
            }
        }
    }
}

/// Splits `value` on unescaped occurrences of `split_char`.
///
/// ```
/// use vcfkit_rfc::rfc::vcard::codec::{SplitOptions, split};
///
/// let parts: Vec<&str> = split("a,,b", ',', SplitOptions::None).collect();
/// assert_eq!(parts, ["a", "", "b"]);
/// ```
#[must_use]
pub const fn split(value: &str, split_char: char, options: SplitOptions) -> ValueSplitter<'_> {
    ValueSplitter::new(value, split_char, options)
}

/// Splits and unmasks each segment.
#[must_use]
pub fn split_unmasked(value: &str, split_char: char, options: SplitOptions) -> Vec<String> {
    split(value, split_char, options).map(unmask).collect()
}

/// Returns whether `s` has any non-whitespace character.
#[must_use]
pub fn contains_data(s: &str) -> bool {
    s.chars().any(|c| !c.is_whitespace())
}
