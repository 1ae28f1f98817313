use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};
use vcfkit_app::convert::{Target, convert_file};
use vcfkit_core::config::load_config;

#[derive(Parser)]
#[command(name = "vcfkit")]
#[command(version)]
#[command(about = "Convert vCard files between versions 2.1, 3.0 and 4.0", long_about = None)]
struct Cli {
    /// vCard file to read
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// File to write (stdout if omitted)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Target version, overriding `output.version` from the configuration
    #[arg(short = 't', long = "to", value_name = "VERSION")]
    to: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    let config = load_config()?;

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let target = Target::from_config(&config.output, cli.to.as_deref())?;
    tracing::debug!(version = %target.version, options = %target.options, "Conversion target");

    convert_file(&cli.input, cli.output.as_deref(), target)
}
