//! Line reader: turns a byte stream into logical (unfolded) lines.
//!
//! A physical line starting with a space or tab continues the previous
//! logical line; the leading whitespace character is removed. CRLF, LF and
//! lone CR all terminate a physical line. Blank lines are separators and
//! are not yielded.
//!
//! vCard 2.1 Quoted-Printable values may also continue with a soft line
//! break: a line whose parameters declare `QUOTED-PRINTABLE` and that ends
//! with `=` is joined with the next physical line, without the `=`.
//!
//! Lines are kept as bytes until they are complete. A line that declares a
//! `CHARSET` parameter is then decoded with that charset, every other line
//! with the reader's encoding (UTF-8 unless the caller chooses another).

use std::io::{self, BufRead};

use encoding_rs::Encoding;

use crate::rfc::vcard::codec::charset;

/// One unfolded line and the number of the physical line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based physical line number.
    pub number: usize,
    pub text: String,
}

/// Lazy, forward-only iterator over the logical lines of a reader.
#[derive(Debug)]
pub struct LineReader<R> {
    reader: R,
    encoding: &'static Encoding,
    pending: Option<(usize, Vec<u8>)>,
    physical_line: usize,
    done: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Reads UTF-8 input.
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self::with_encoding(reader, encoding_rs::UTF_8)
    }

    /// Reads input in `encoding`. Lines with their own `CHARSET` parameter
    /// use that charset instead.
    #[must_use]
    pub const fn with_encoding(reader: R, encoding: &'static Encoding) -> Self {
        Self {
            reader,
            encoding,
            pending: None,
            physical_line: 0,
            done: false,
        }
    }

    /// Reads one physical line without its terminator. `None` at end of
    /// stream.
    fn read_physical(&mut self) -> io::Result<Option<(usize, Vec<u8>)>> {
        if self.done {
            return Ok(None);
        }

        let mut bytes = Vec::new();
        let mut saw_any = false;

        loop {
            let buf = self.reader.fill_buf()?;
            if buf.is_empty() {
                self.done = true;
                break;
            }
            saw_any = true;

            if let Some(pos) = buf.iter().position(|&b| b == b'\n' || b == b'\r') {
                let terminator = buf[pos];
                bytes.extend_from_slice(&buf[..pos]);
                self.reader.consume(pos + 1);

                if terminator == b'\r' {
                    let next = self.reader.fill_buf()?;
                    if next.first() == Some(&b'\n') {
                        self.reader.consume(1);
                    }
                }
                self.physical_line += 1;
                return Ok(Some((self.physical_line, bytes)));
            }

            let len = buf.len();
            bytes.extend_from_slice(buf);
            self.reader.consume(len);
        }

        if saw_any {
            self.physical_line += 1;
            Ok(Some((self.physical_line, bytes)))
        } else {
            Ok(None)
        }
    }

    fn next_line(&mut self) -> io::Result<Option<LogicalLine>> {
        let (number, mut bytes) = loop {
            let next = match self.pending.take() {
                Some(line) => line,
                None => match self.read_physical()? {
                    Some(line) => line,
                    None => return Ok(None),
                },
            };
            if !next.1.iter().all(u8::is_ascii_whitespace) {
                break next;
            }
        };

        if bytes.first().is_some_and(|&b| is_fold_space(b)) {
            bytes.remove(0);
        }

        while let Some((n, line)) = self.read_physical()? {
            if is_quoted_printable_soft_break(&bytes) {
                bytes.pop();
                bytes.extend_from_slice(&line);
            } else if line.first().is_some_and(|&b| is_fold_space(b)) {
                bytes.extend_from_slice(&line[1..]);
            } else {
                self.pending = Some((n, line));
                break;
            }
        }

        let text = self.decode(&bytes, number);
        Ok(Some(LogicalLine { number, text }))
    }

    fn decode(&self, bytes: &[u8], number: usize) -> String {
        // The whole line is decoded at once, so the head must stay ASCII.
        let encoding = declared_charset(bytes)
            .map(|label| charset::encoding_for(Some(label.as_str())))
            .filter(|encoding| encoding.is_ascii_compatible())
            .unwrap_or(self.encoding);
        let (text, _, had_errors) = encoding.decode(bytes);
        if had_errors {
            tracing::debug!(
                line = number,
                encoding = encoding.name(),
                "Undecodable bytes in input line, replacing"
            );
        }
        text.into_owned()
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

const fn is_fold_space(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// The part of a line before the first `:`, if there is one.
fn head(line: &[u8]) -> Option<&[u8]> {
    line.iter().position(|&b| b == b':').map(|pos| &line[..pos])
}

fn is_quoted_printable_soft_break(line: &[u8]) -> bool {
    line.ends_with(b"=")
        && head(line).is_some_and(|head| {
            head.windows(16)
                .any(|w| w.eq_ignore_ascii_case(b"QUOTED-PRINTABLE"))
        })
}

/// Value of a `CHARSET` parameter in the head of `line`.
fn declared_charset(line: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(head(line)?);
    head.split(';').skip(1).find_map(|parameter| {
        let (name, value) = parameter.split_once('=')?;
        name.trim()
            .eq_ignore_ascii_case("CHARSET")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Unfolds `input` into logical lines.
#[must_use]
pub fn unfold(input: &str) -> Vec<String> {
    LineReader::new(input.as_bytes())
        .filter_map(Result::ok)
        .map(|line| line.text)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfold_crlf() {
        assert_eq!(unfold("FN:John\r\n  Doe\r\n"), ["FN:John Doe"]);
    }

    #[test]
    fn unfold_bare_lf_and_tab() {
        assert_eq!(unfold("FN:John\n\tDoe"), ["FN:JohnDoe"]);
    }

    #[test]
    fn cr_only_terminators() {
        assert_eq!(unfold("A:1\rB:2\r C\r"), ["A:1", "B:2C"]);
    }

    #[test]
    fn last_line_without_terminator() {
        assert_eq!(unfold("A:1\r\nB:2"), ["A:1", "B:2"]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        assert_eq!(unfold("A:1\r\n\r\n\r\nB:2\r\n"), ["A:1", "B:2"]);
    }

    #[test]
    fn quoted_printable_soft_breaks() {
        let input = "NOTE;ENCODING=QUOTED-PRINTABLE:abc=\r\ndef=\r\nghi\r\nFN:x\r\n";
        assert_eq!(unfold(input), ["NOTE;ENCODING=QUOTED-PRINTABLE:abcdefghi", "FN:x"]);
    }

    #[test]
    fn equals_without_qp_is_not_a_soft_break() {
        assert_eq!(unfold("NOTE:a=\r\nFN:x"), ["NOTE:a=", "FN:x"]);
    }

    #[test]
    fn line_numbers_are_physical() {
        let lines: Vec<LogicalLine> = LineReader::new("A:1\r\n b\r\n\r\nC:2".as_bytes())
            .collect::<io::Result<_>>()
            .unwrap();
        assert_eq!(lines[0].number, 1);
        assert_eq!(lines[1].number, 4);
    }

    #[test]
    fn declared_charset_decodes_raw_bytes() {
        let input: &[u8] = b"FN;CHARSET=ISO-8859-1:M\xFCller\r\nNOTE:caf\xC3\xA9\r\n";
        let lines: Vec<String> = LineReader::new(input).map(|l| l.unwrap().text).collect();
        assert_eq!(lines, ["FN;CHARSET=ISO-8859-1:Müller", "NOTE:café"]);
    }

    #[test]
    fn reader_encoding_applies_to_undeclared_lines() {
        let input: &[u8] = b"FN:M\xFCller\r\nNOTE;CHARSET=UTF-8:caf\xC3\xA9\r\n";
        let lines: Vec<String> = LineReader::with_encoding(input, encoding_rs::WINDOWS_1252)
            .map(|l| l.unwrap().text)
            .collect();
        assert_eq!(lines, ["FN:Müller", "NOTE;CHARSET=UTF-8:café"]);
    }

    #[test]
    fn wide_charset_label_leaves_line_readable() {
        let input: &[u8] = b"NOTE;CHARSET=UTF-16;ENCODING=QUOTED-PRINTABLE:=FF=FEA=00\r\n";
        assert_eq!(
            LineReader::new(input).next().unwrap().unwrap().text,
            "NOTE;CHARSET=UTF-16;ENCODING=QUOTED-PRINTABLE:=FF=FEA=00"
        );
    }

    #[test]
    fn folded_line_is_decoded_as_a_whole() {
        let input: &[u8] = b"NOTE;CHARSET=windows-1252:Gr\xFC\r\n \xDFe\r\n";
        assert_eq!(
            LineReader::new(input).next().unwrap().unwrap().text,
            "NOTE;CHARSET=windows-1252:Grüße"
        );
    }

    #[test]
    fn small_buffer_crlf_split() {
        let reader = io::BufReader::with_capacity(4, "AB:1\r\nC:2\r\n".as_bytes());
        let lines: Vec<String> = LineReader::new(reader).map(|l| l.unwrap().text).collect();
        assert_eq!(lines, ["AB:1", "C:2"]);
    }
}
