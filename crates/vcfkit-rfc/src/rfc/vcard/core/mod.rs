//! vCard core types.

mod parameter;
mod property;
mod value;
mod vcard;
mod version;

pub use parameter::{DataType, GeoCoordinate, ParameterSection, ValueEncoding};
pub use property::{DateAndOrTime, PropertyValue, VCardProperty, names};
pub use value::{DataProperty, DataPropertyValue};
pub use vcard::VCard;
pub use version::VCardVersion;
