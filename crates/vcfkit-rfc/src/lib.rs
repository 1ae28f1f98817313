//! vCard (VCF) parsing and serialization for versions 2.1, 3.0 and 4.0.

pub mod error;
pub mod rfc;
