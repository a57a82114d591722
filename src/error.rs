//! Error type shared by the log parser and the chart renderer.

use std::path::PathBuf;

use crate::parser::SeriesKind;

/// Fatal failures of a plotting run.
///
/// Every variant aborts the run; there is no partial-chart recovery.
#[derive(Debug)]
pub enum PlotError {
    /// No log file was given.
    NoLogFiles,
    /// Input path does not reference an existing regular file.
    FileNotFound(PathBuf),
    /// I/O failure while reading an already opened log file.
    Read { path: PathBuf, source: std::io::Error },
    /// A line matched a category but its number could not be converted.
    Parse {
        path: PathBuf,
        line_number: usize,
        kind: SeriesKind,
        token: String,
    },
    /// x and y mappings disagree on sources or on series lengths.
    ShapeMismatch(String),
    /// The chart image could not be saved.
    Write { path: PathBuf, message: String },
    /// Drawing failed before the image was saved.
    Render(String),
}

impl std::fmt::Display for PlotError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlotError::NoLogFiles => write!(f, "no log files given"),
            PlotError::FileNotFound(path) => write!(f, "log file {} does not exist", path.display()),
            PlotError::Read { path, source } => write!(f, "failed to read {}: {}", path.display(), source),
            PlotError::Parse {
                path,
                line_number,
                kind,
                token,
            } => write!(f, "{}:{}: cannot parse {} value from token '{}'", path.display(), line_number, kind, token),
            PlotError::ShapeMismatch(msg) => write!(f, "shape mismatch: {}", msg),
            PlotError::Write { path, message } => write!(f, "failed to write {}: {}", path.display(), message),
            PlotError::Render(msg) => write!(f, "failed to draw chart: {}", msg),
        }
    }
}

impl std::error::Error for PlotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PlotError::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}
