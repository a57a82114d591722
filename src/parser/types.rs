//! Type definitions specific to the parser module.

/// A log source is identified by the path string it was given on the command line.
pub type LogSource = String;

/// Metric kinds extracted from a training log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    Loss,
    Iteration,
    LearningRate,
    MboxLoss,
    TestIteration,
    DetectionAccuracy,
}

impl std::fmt::Display for SeriesKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SeriesKind::Loss => "loss",
            SeriesKind::Iteration => "iteration",
            SeriesKind::LearningRate => "lr",
            SeriesKind::MboxLoss => "mbox loss",
            SeriesKind::TestIteration => "test iteration",
            SeriesKind::DetectionAccuracy => "detection accuracy",
        };
        f.write_str(name)
    }
}

/// Parsed log line variants.
#[derive(Debug, Clone, PartialEq)]
pub enum LogRecord {
    /// `Iteration <N>, loss = <F>`
    Loss { iteration: u64, loss: f64 },
    /// `Iteration <N>, lr = <F>`
    LearningRate { lr: f64 },
    /// `Train net output #<k>: mbox_loss = <F> ...`
    MboxLoss { loss: f64 },
    /// `Iteration <N>, Testing net (#<k>)`
    TestIteration { iteration: u64 },
    /// `Test net output #<k>: detection_eval = <F>`
    DetectionAccuracy { accuracy: f64 },
}

/// Numeric sample that can be placed on a chart axis.
pub trait PlotValue: Copy {
    fn to_f64(self) -> f64;
}

impl PlotValue for f64 {
    fn to_f64(self) -> f64 {
        self
    }
}

impl PlotValue for u64 {
    fn to_f64(self) -> f64 {
        self as f64
    }
}

/// Per-source series of one metric, kept in source order.
///
/// Every source known to the parser owns an entry, even when no line of that
/// metric was found in its file.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesMap<T> {
    entries: Vec<(LogSource, Vec<T>)>,
}

impl<T> SeriesMap<T> {
    /// Create a map with one empty series per distinct source.
    pub fn with_sources(sources: &[LogSource]) -> Self {
        let mut entries: Vec<(LogSource, Vec<T>)> = Vec::with_capacity(sources.len());
        for source in sources {
            if !entries.iter().any(|(s, _)| s == source) {
                entries.push((source.clone(), Vec::new()));
            }
        }
        Self { entries }
    }

    pub(crate) fn series_mut(&mut self, source: &str) -> Option<&mut Vec<T>> {
        self.entries.iter_mut().find(|(s, _)| s == source).map(|(_, series)| series)
    }

    /// Series recorded for `source`, if the source is known.
    pub fn get(&self, source: &str) -> Option<&[T]> {
        self.entries.iter().find(|(s, _)| s == source).map(|(_, series)| series.as_slice())
    }

    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(s, _)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries.iter().map(|(s, series)| (s.as_str(), series.as_slice()))
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when at least one source has a non-empty series.
    pub fn has_samples(&self) -> bool {
        self.entries.iter().any(|(_, series)| !series.is_empty())
    }
}

impl<T> FromIterator<(LogSource, Vec<T>)> for SeriesMap<T> {
    fn from_iter<I: IntoIterator<Item = (LogSource, Vec<T>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
