//! Shared building blocks for the `vcfkit` crates: errors, serialization
//! options, wire constants and the configuration layer.

pub mod config;
pub mod constants;
pub mod error;
pub mod options;

pub use options::VcfOptions;
