//! Parsed training logs: every metric series for every log source.

use std::path::{Path, PathBuf};

use log::info;

use super::log_loader::{LogLoader, ensure_log_file};
use super::log_parser::{FieldError, parse_log_line};
use super::types::{LogRecord, LogSource, SeriesMap};
use crate::error::PlotError;

/// Metric series extracted from one or more training logs.
///
/// Built in a single pass over the files; read-only afterwards.
#[derive(Debug, Clone)]
pub struct TrainLog {
    sources: Vec<LogSource>,
    losses: SeriesMap<f64>,
    iterations: SeriesMap<u64>,
    lrs: SeriesMap<f64>,
    mbox_losses: SeriesMap<f64>,
    test_iterations: SeriesMap<u64>,
    detection_accuracies: SeriesMap<f64>,
    is_detection: bool,
}

/// Growable buffers filled while the files are read.
struct SeriesBuffers {
    losses: SeriesMap<f64>,
    iterations: SeriesMap<u64>,
    lrs: SeriesMap<f64>,
    mbox_losses: SeriesMap<f64>,
    test_iterations: SeriesMap<u64>,
    detection_accuracies: SeriesMap<f64>,
}

impl SeriesBuffers {
    fn new(sources: &[LogSource]) -> Self {
        Self {
            losses: SeriesMap::with_sources(sources),
            iterations: SeriesMap::with_sources(sources),
            lrs: SeriesMap::with_sources(sources),
            mbox_losses: SeriesMap::with_sources(sources),
            test_iterations: SeriesMap::with_sources(sources),
            detection_accuracies: SeriesMap::with_sources(sources),
        }
    }

    fn record(&mut self, source: &str, record: LogRecord) {
        fn push<T>(map: &mut SeriesMap<T>, source: &str, value: T) {
            if let Some(series) = map.series_mut(source) {
                series.push(value);
            }
        }

        match record {
            LogRecord::Loss { iteration, loss } => {
                push(&mut self.losses, source, loss);
                push(&mut self.iterations, source, iteration);
            }
            LogRecord::LearningRate { lr } => push(&mut self.lrs, source, lr),
            LogRecord::MboxLoss { loss } => push(&mut self.mbox_losses, source, loss),
            LogRecord::TestIteration { iteration } => push(&mut self.test_iterations, source, iteration),
            LogRecord::DetectionAccuracy { accuracy } => push(&mut self.detection_accuracies, source, accuracy),
        }
    }
}

impl TrainLog {
    /// Parse the given log files, in order.
    ///
    /// Every path is checked before any file is read, so a missing file fails
    /// with `FileNotFound` for the first missing path in argument order and no
    /// parsing happens at all. An empty path list is rejected with `NoLogFiles`.
    pub fn parse<P: AsRef<Path>>(log_files: &[P]) -> Result<Self, PlotError> {
        if log_files.is_empty() {
            return Err(PlotError::NoLogFiles);
        }
        for path in log_files {
            ensure_log_file(path.as_ref())?;
        }

        let sources: Vec<LogSource> = log_files.iter().map(|p| p.as_ref().to_string_lossy().into_owned()).collect();
        let mut buffers = SeriesBuffers::new(&sources);

        for (path, source) in log_files.iter().zip(&sources) {
            let mut loader = LogLoader::open(path.as_ref())?;
            info!("Parsing log file {}", source);

            while let Some(line) = loader.next_line()? {
                match parse_log_line(line) {
                    Ok(Some(record)) => buffers.record(source, record),
                    Ok(None) => {}
                    Err(FieldError { kind, token }) => {
                        return Err(PlotError::Parse {
                            path: PathBuf::from(path.as_ref()),
                            line_number: loader.line_number(),
                            kind,
                            token,
                        });
                    }
                }
            }
        }

        let is_detection = buffers.mbox_losses.has_samples();
        let mut unique_sources: Vec<LogSource> = Vec::with_capacity(sources.len());
        for source in sources {
            if !unique_sources.contains(&source) {
                unique_sources.push(source);
            }
        }

        let train_log = Self {
            sources: unique_sources,
            losses: buffers.losses,
            iterations: buffers.iterations,
            lrs: buffers.lrs,
            mbox_losses: buffers.mbox_losses,
            test_iterations: buffers.test_iterations,
            detection_accuracies: buffers.detection_accuracies,
            is_detection,
        };
        train_log.log_summary();
        Ok(train_log)
    }

    fn log_summary(&self) {
        fn count<T>(map: &SeriesMap<T>, source: &str) -> usize {
            map.get(source).map_or(0, <[T]>::len)
        }

        for source in &self.sources {
            info!(
                "{}: {} losses, {} lrs, {} mbox losses, {} test iterations, {} detection accuracies",
                source,
                count(&self.losses, source),
                count(&self.lrs, source),
                count(&self.mbox_losses, source),
                count(&self.test_iterations, source),
                count(&self.detection_accuracies, source),
            );
        }
        info!("Detection log: {}", self.is_detection);
    }

    /// Log sources in command-line order, duplicates removed.
    pub fn sources(&self) -> &[LogSource] {
        &self.sources
    }

    /// True when any source contains at least one mbox loss line.
    pub fn is_detection(&self) -> bool {
        self.is_detection
    }

    pub fn losses(&self) -> &SeriesMap<f64> {
        &self.losses
    }

    /// Iteration numbers of the loss lines, index-aligned with `losses`.
    pub fn iterations(&self) -> &SeriesMap<u64> {
        &self.iterations
    }

    pub fn lrs(&self) -> &SeriesMap<f64> {
        &self.lrs
    }

    pub fn mbox_losses(&self) -> &SeriesMap<f64> {
        &self.mbox_losses
    }

    pub fn test_iterations(&self) -> &SeriesMap<u64> {
        &self.test_iterations
    }

    pub fn detection_accuracies(&self) -> &SeriesMap<f64> {
        &self.detection_accuracies
    }
}
