//! JSON-lines output for aggregated minutes
//!
//! Each [`OutputPoint`] becomes one line:
//! `{"date":"2018-12-26 18:16:00","average_delivery_time":25.5}`

use crate::aggregate::OutputPoint;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write all points to `path`, replacing any existing content
pub fn write_output(points: &[OutputPoint], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| Error::DestinationCreate {
        path: path.to_path_buf(),
        source,
    })?;

    write_points_to(points, BufWriter::new(file))?;
    tracing::debug!("Wrote {} point(s) to {}", points.len(), path.display());
    Ok(())
}

/// Write all points as JSON lines to any writer, flushing at the end
pub fn write_points_to<W: Write>(points: &[OutputPoint], mut writer: W) -> Result<()> {
    for point in points {
        serde_json::to_writer(&mut writer, point).map_err(|e| {
            if e.is_io() {
                Error::Write(e.into())
            } else {
                Error::Encode(e)
            }
        })?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}
