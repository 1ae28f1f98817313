//! vCard 2.1, 3.0 and 4.0.
//!
//! Reads any of the three versions into one model and writes the model back
//! in any of them.
//!
//! ## Usage
//!
//! ```rust
//! use vcfkit_core::VcfOptions;
//! use vcfkit_rfc::rfc::vcard::{VCardVersion, parse, serialize};
//!
//! let input = "\
//! BEGIN:VCARD\r\n\
//! VERSION:2.1\r\n\
//! N:Doe;John\r\n\
//! FN:John Doe\r\n\
//! TEL;HOME;VOICE:+1-555-0100\r\n\
//! END:VCARD\r\n";
//!
//! let cards = parse(input).unwrap();
//! assert_eq!(cards[0].formatted_name(), Some("John Doe"));
//!
//! let output = serialize(&cards, VCardVersion::V4_0, VcfOptions::default());
//! assert!(output.contains("TEL;TYPE=home,voice:+1-555-0100\r\n"));
//! ```
//!
//! ## Submodules
//!
//! - [`core`] - the record model (`VCard`, `VCardProperty`, parameters, values)
//! - [`codec`] - escaping, splitting, transfer encodings, dates
//! - [`parse`] - line reader, row tokenizer and record parser
//! - [`build`] - serializer and line folding

pub mod build;
pub mod codec;
pub mod core;
pub mod parse;

#[cfg(test)]
mod tests;

pub use build::{serialize, serialize_single};
pub use self::core::{
    DataProperty, DataPropertyValue, DateAndOrTime, ParameterSection, PropertyValue, VCard,
    VCardProperty, VCardVersion,
};
pub use parse::{
    ParseError, ParseResult, parse, parse_reader, parse_reader_with_encoding, parse_single,
};
