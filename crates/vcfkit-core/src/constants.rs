//! Wire-level constants shared across crates.

/// Line terminator written by the serializer.
pub const CRLF: &str = "\r\n";

/// Maximum number of octets in one physical output line (excluding CRLF).
pub const MAX_BYTES_PER_LINE: usize = 75;

/// Sequence inserted by the folder: a line break followed by one space.
pub const FOLD_SEQUENCE: &str = const_str::concat!(CRLF, " ");

pub const BEGIN_VCARD: &str = "BEGIN:VCARD";
pub const END_VCARD: &str = "END:VCARD";

/// `BEGIN:VCARD` followed by a line break, as it opens every serialized record.
pub const BEGIN_VCARD_LINE: &str = const_str::concat!(BEGIN_VCARD, CRLF);
pub const END_VCARD_LINE: &str = const_str::concat!(END_VCARD, CRLF);

/// Prefix of UUID URNs used to reference records from one another.
pub const URN_UUID_PREFIX: &str = "urn:uuid:";
