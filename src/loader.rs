//! JSON-lines event loader
//!
//! Reads one self-contained JSON object per line. There is no partial-success
//! mode: the first unreadable or undecodable line aborts the load.

use crate::error::{Error, Result};
use crate::event::Event;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load all events from a JSON-lines file, in file order
pub fn read_events(path: impl AsRef<Path>) -> Result<Vec<Event>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::SourceOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let events = read_events_from(BufReader::new(file), &path.display().to_string())?;
    tracing::debug!("Loaded {} event(s) from {}", events.len(), path.display());
    Ok(events)
}

/// Load all events from a buffered reader
///
/// `origin` names the source in error messages.
pub fn read_events_from<R: BufRead>(reader: R, origin: &str) -> Result<Vec<Event>> {
    let mut events = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line.map_err(|source| Error::Read {
            origin: origin.to_string(),
            line: line_no,
            source,
        })?;
        let event = decode_event_line(&line).map_err(|source| Error::Decode {
            origin: origin.to_string(),
            line: line_no,
            source,
        })?;
        tracing::trace!("{}:{}: event at {}", origin, line_no, event.timestamp);
        events.push(event);
    }

    Ok(events)
}

/// Decode a single JSON line into an [`Event`]
pub fn decode_event_line(line: &str) -> std::result::Result<Event, serde_json::Error> {
    serde_json::from_str(line)
}
