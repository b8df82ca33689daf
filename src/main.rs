use anyhow::{Context, Result};
use clap::Parser;
use delivery_window::{cli::Cli, pipeline};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = args.pipeline_config();
    pipeline::run(&config).with_context(|| {
        format!(
            "Failed to compute moving averages from {}",
            config.input_file.display()
        )
    })?;

    Ok(())
}
