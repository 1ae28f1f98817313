//! vCard serialization.
//!
//! ```rust
//! use vcfkit_core::VcfOptions;
//! use vcfkit_rfc::rfc::vcard::build::serialize;
//! use vcfkit_rfc::rfc::vcard::core::{VCard, VCardProperty, VCardVersion};
//!
//! let mut card = VCard::new();
//! card.add_property(VCardProperty::text("FN", "Jane Doe"));
//!
//! let output = serialize(&[card], VCardVersion::V3_0, VcfOptions::default());
//! assert!(output.starts_with("BEGIN:VCARD\r\nVERSION:3.0\r\n"));
//! assert!(output.contains("FN:Jane Doe\r\n"));
//! ```

mod fold;
mod serializer;

pub use fold::fold_line;
pub use serializer::{serialize, serialize_single};
