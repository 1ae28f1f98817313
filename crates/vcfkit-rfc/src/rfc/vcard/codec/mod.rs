//! Text-level codecs shared by the parser and the serializer.
//!
//! - [`escape`] - masking of delimiters and line breaks
//! - [`split`] - splitting on unescaped delimiters
//! - [`quoted_printable`], [`base64`] - transfer encodings
//! - [`charset`] - charset lookup (`encoding_rs`)
//! - [`datetime`] - the date/time grammar
//! - [`mime`], [`data_url`] - media types and embedded data

pub mod base64;
pub mod charset;
pub mod data_url;
pub mod datetime;
pub mod escape;
pub mod mime;
pub mod quoted_printable;
pub mod split;

pub use data_url::DataUrl;
pub use datetime::{DateKind, try_parse as try_parse_date_time};
pub use escape::{MaskMode, mask, unmask};
pub use mime::{MediaKind, is_valid_mime_type};
pub use split::{SplitOptions, ValueSplitter, split, split_unmasked};
