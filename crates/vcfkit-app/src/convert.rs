//! File conversion driven by the loaded settings.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use vcfkit_core::VcfOptions;
use vcfkit_core::config::OutputConfig;
use vcfkit_rfc::rfc::vcard::{VCardVersion, parse, serialize};

/// Target of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target {
    pub version: VCardVersion,
    pub options: VcfOptions,
}

impl Target {
    /// ## Summary
    /// Resolves the configured output section, with an optional version
    /// override from the command line.
    ///
    /// ## Errors
    /// Returns an error for an unknown version or serializer option.
    pub fn from_config(output: &OutputConfig, version_override: Option<&str>) -> Result<Self> {
        let raw_version = version_override.unwrap_or(output.version.as_str());
        let version = VCardVersion::parse(raw_version)
            .with_context(|| format!("unsupported vCard version: {raw_version}"))?;

        Ok(Self {
            version,
            options: output.vcf_options()?,
        })
    }
}

/// ## Summary
/// Parses every record in `input` and writes them all in the target version.
///
/// ## Errors
/// Returns an error if the input cannot be parsed.
pub fn convert(input: &str, target: Target) -> Result<String> {
    let cards = parse(input).context("failed to parse vCard input")?;
    if cards.is_empty() {
        tracing::warn!("No vCard records found in input");
    }
    Ok(serialize(&cards, target.version, target.options))
}

/// ## Summary
/// Converts the file at `input` and writes the result to `output`, or to
/// stdout when no output path is given.
///
/// ## Errors
/// Returns an error if reading, parsing or writing fails.
#[tracing::instrument(skip(target), fields(version = %target.version))]
pub fn convert_file(input: &Path, output: Option<&Path>, target: Target) -> Result<()> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;

    let converted = convert(&text, target)?;

    match output {
        Some(path) => fs::write(path, converted)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout()
            .lock()
            .write_all(converted.as_bytes())
            .context("failed to write to stdout")?,
    }

    tracing::info!("Conversion finished");
    Ok(())
}
