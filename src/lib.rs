//! delivery-window - per-minute moving average of translation delivery times
//!
//! This library reads a JSON-lines log of translation events, computes for
//! every minute of the observed span the mean delivery time over a trailing
//! window, and writes the resulting series back out as JSON lines.

pub mod aggregate;
pub mod cli;
pub mod error;
pub mod event;
pub mod loader;
pub mod pipeline;
pub mod writer;

pub use aggregate::{moving_averages, moving_averages_brute_force, OutputPoint, Strategy};
pub use error::{Error, Result};
pub use event::Event;
