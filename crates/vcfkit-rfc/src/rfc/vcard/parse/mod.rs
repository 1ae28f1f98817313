//! vCard parsing (2.1, 3.0 and 4.0).
//!
//! ## Usage
//!
//! ```rust
//! use vcfkit_rfc::rfc::vcard::parse;
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:3.0\r\n\
//! FN:John Doe\r\n\
//! EMAIL;TYPE=INTERNET:john@example.com\r\n\
//! END:VCARD\r\n";
//!
//! let cards = parse::parse(input).unwrap();
//! assert_eq!(cards[0].formatted_name(), Some("John Doe"));
//! ```
//!
//! ## Features
//!
//! - Line unfolding, including 2.1 Quoted-Printable soft breaks
//! - Property groups (`item1.TEL`)
//! - 2.1 parameters without a name (`TEL;HOME;VOICE`)
//! - Charset and transfer-encoding decoding
//! - Embedded AGENT records
//! - Non-standard `X-` properties mapped to their standard equivalents
//! - Malformed lines skipped, not fatal

mod error;
mod lexer;
mod parser;
mod row;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{LineReader, LogicalLine, unfold};
pub use parser::{parse, parse_reader, parse_reader_with_encoding, parse_single};
pub use row::{VcfRow, classify_bare_parameter};
pub use values::{ValueKind, property_from_row};
