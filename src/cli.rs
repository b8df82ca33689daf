//! CLI argument parsing for delivery-window

use crate::aggregate::Strategy;
use crate::pipeline::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "delivery-window")]
#[command(version)]
#[command(
    about = "Per-minute moving average of translation delivery times",
    long_about = None
)]
pub struct Cli {
    /// Input JSON-lines file with translation events
    #[arg(
        long = "input-file",
        alias = "input_file",
        value_name = "PATH",
        default_value = "events.json"
    )]
    pub input_file: PathBuf,

    /// Output JSON-lines file for the per-minute averages (overwritten)
    #[arg(
        long = "output-file",
        alias = "output_file",
        value_name = "PATH",
        default_value = "output.json"
    )]
    pub output_file: PathBuf,

    /// Moving average window in minutes (default: 10)
    #[arg(
        short = 'w',
        long = "window-size",
        alias = "window_size",
        value_name = "MINUTES",
        default_value = "10",
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub window_size: u32,

    /// How the averages are computed
    #[arg(long = "strategy", value_enum, default_value = "sliding-window")]
    pub strategy: Strategy,

    /// Print trace-level diagnostics to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Build the pipeline settings from parsed arguments
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            input_file: self.input_file.clone(),
            output_file: self.output_file.clone(),
            window_size: self.window_size,
            strategy: self.strategy,
        }
    }
}
