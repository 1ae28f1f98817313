use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::options::VcfOptions;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Target vCard version (`2.1`, `3.0` or `4.0`).
    pub version: String,
    /// Serializer flag names, see [`VcfOptions`].
    pub options: Vec<String>,
}

impl OutputConfig {
    /// ## Summary
    /// Resolves the configured flag names into a [`VcfOptions`] set.
    ///
    /// ## Errors
    /// Returns an error if one of the names is not a known flag.
    pub fn vcf_options(&self) -> Result<VcfOptions> {
        Ok(VcfOptions::from_names(&self.options)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, `VCFKIT_*` environment variables and
    /// an optional `vcfkit.toml` file.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Config::builder()
            .set_default("output.version", "3.0")?
            .set_default("output.options", VcfOptions::DEFAULT.names())?
            .set_default("logging.level", "info")?
            .add_source(
                config::Environment::with_prefix("VCFKIT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("output.options")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .add_source(config::File::with_name("vcfkit.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    tracing::debug!(?settings, "Configuration loaded");

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn output_options_resolve() {
        let output = OutputConfig {
            version: "4.0".to_string(),
            options: vec!["write-groups".to_string(), "write-empty-properties".to_string()],
        };

        let options = output.vcf_options().unwrap();
        assert!(options.contains(VcfOptions::WRITE_GROUPS));
        assert!(options.contains(VcfOptions::WRITE_EMPTY_PROPERTIES));
        assert!(!options.contains(VcfOptions::WRITE_NON_STANDARD_PROPERTIES));
    }

    #[test]
    fn output_options_reject_unknown_name() {
        let output = OutputConfig {
            version: "3.0".to_string(),
            options: vec!["shout".to_string()],
        };

        assert!(output.vcf_options().is_err());
    }

    #[test]
    fn defaults_load_without_sources() {
        let settings = Settings::load().unwrap();
        assert!(!settings.output.version.is_empty());
        assert!(!settings.logging.level.is_empty());
    }
}
