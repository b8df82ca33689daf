//! One end-to-end run: load events, aggregate, write results

use crate::aggregate::Strategy;
use crate::error::{Error, Result};
use crate::{loader, writer};
use std::path::PathBuf;

/// Settings for a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// JSON-lines event log to read
    pub input_file: PathBuf,
    /// Destination for the per-minute averages (overwritten)
    pub output_file: PathBuf,
    /// Trailing window length in minutes
    pub window_size: u32,
    /// Formulation used to compute the averages
    pub strategy: Strategy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from("events.json"),
            output_file: PathBuf::from("output.json"),
            window_size: 10,
            strategy: Strategy::default(),
        }
    }
}

/// What a completed run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub events_read: usize,
    pub points_written: usize,
}

/// Run the pipeline once, stopping at the first error
pub fn run(config: &PipelineConfig) -> Result<RunSummary> {
    if config.window_size == 0 {
        return Err(Error::InvalidWindow(config.window_size));
    }

    let events = loader::read_events(&config.input_file)?;
    let points = config.strategy.compute(&events, config.window_size)?;
    writer::write_output(&points, &config.output_file)?;

    let summary = RunSummary {
        events_read: events.len(),
        points_written: points.len(),
    };
    tracing::info!(
        "Aggregated {} event(s) into {} minute(s) ({:?}, window {} min) -> {}",
        summary.events_read,
        summary.points_written,
        config.strategy,
        config.window_size,
        config.output_file.display()
    );
    Ok(summary)
}
