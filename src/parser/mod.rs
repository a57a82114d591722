//! Training-log parsing.
//!
//! Turns one or more text logs into per-source numeric series:
//! - line classification and number extraction (`log_parser`)
//! - scoped, line-by-line file reading (`log_loader`)
//! - the parsed, read-only result (`train_log`)

pub mod log_loader;
pub mod log_parser;
pub mod train_log;
pub mod types;

pub use train_log::TrainLog;
pub use types::{PlotValue, SeriesKind, SeriesMap};
