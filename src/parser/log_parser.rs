//! Classify individual training-log lines and extract their numbers.
//!
//! Recognized line shapes (any other text on the line is ignored):
//!
//! ```text
//! [0] I0412 10:01:02.123 solver.cpp:228] Iteration 100, loss = 2.3031
//! [0] I0412 10:01:02.124 sgd_solver.cpp:106] Iteration 100, lr = 0.001
//! [0] I0412 10:01:02.123 solver.cpp:244]     Train net output #0: mbox_loss = 4.53425 (* 1 = 4.53425 loss)
//! [0] I0412 10:05:00.000 solver.cpp:341] Iteration 500, Testing net (#0)
//! [0] I0412 10:06:00.000 solver.cpp:429]     Test net output #0: detection_eval = 0.6123
//! ```
//!
//! The `[pid]` prefix is optional. Lines from any process other than 0 are dropped.

use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use super::types::{LogRecord, SeriesKind};

/// Only the coordinator's numbers are plotted in multi-process runs.
const PRIMARY_PROCESS_ID: u64 = 0;

/// Line categories, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineCategory {
    Loss,
    LearningRate,
    MboxLoss,
    TestIteration,
    DetectionAccuracy,
}

static CATEGORY_PATTERNS: LazyLock<[(LineCategory, Regex); 5]> = LazyLock::new(|| {
    let compile = |pattern: &str| Regex::new(pattern).expect("line pattern is a valid regex");
    [
        (LineCategory::Loss, compile(r"\bIteration \S+, loss = ")),
        (LineCategory::LearningRate, compile(r"\bIteration \S+, lr = ")),
        (LineCategory::MboxLoss, compile(r"\bTrain net output #\d+: mbox_loss = ")),
        (LineCategory::TestIteration, compile(r"\bIteration \S+, Testing net \(#\d+\)")),
        (LineCategory::DetectionAccuracy, compile(r"\bTest net output #\d+: detection_eval = ")),
    ]
});

static PROCESS_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("process id pattern is a valid regex"));

/// A matched line whose number could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub kind: SeriesKind,
    pub token: String,
}

/// Parse a log line into a record.
///
/// # Returns
///
/// * `Ok(Some(record))` for a matched line from the primary process
/// * `Ok(None)` for unrelated lines and lines emitted by other processes
/// * `Err(FieldError)` when a matched line carries a malformed number
pub fn parse_log_line(line: &str) -> Result<Option<LogRecord>, FieldError> {
    let Some(category) = classify(line) else {
        return Ok(None);
    };

    let process_id = process_id(line);
    if process_id != PRIMARY_PROCESS_ID {
        debug!("Dropping {:?} line from process {}", category, process_id);
        return Ok(None);
    }

    extract(category, line).map(Some)
}

/// Process id from the first `[digits]` group on the line, 0 when absent.
///
/// An id too large for `u64` is still a worker id and maps to `u64::MAX`.
pub fn process_id(line: &str) -> u64 {
    match PROCESS_ID_PATTERN.captures(line) {
        Some(caps) => caps[1].parse().unwrap_or(u64::MAX),
        None => PRIMARY_PROCESS_ID,
    }
}

fn classify(line: &str) -> Option<LineCategory> {
    CATEGORY_PATTERNS
        .iter()
        .find(|(_, pattern)| pattern.is_match(line))
        .map(|(category, _)| *category)
}

fn extract(category: LineCategory, line: &str) -> Result<LogRecord, FieldError> {
    match category {
        LineCategory::Loss => Ok(LogRecord::Loss {
            iteration: iteration_field(line, SeriesKind::Iteration)?,
            loss: float_field(line, 1, SeriesKind::Loss)?,
        }),
        LineCategory::LearningRate => Ok(LogRecord::LearningRate {
            lr: float_field(line, 1, SeriesKind::LearningRate)?,
        }),
        LineCategory::MboxLoss => Ok(LogRecord::MboxLoss {
            loss: float_field(line, 2, SeriesKind::MboxLoss)?,
        }),
        LineCategory::TestIteration => Ok(LogRecord::TestIteration {
            iteration: iteration_field(line, SeriesKind::TestIteration)?,
        }),
        LineCategory::DetectionAccuracy => Ok(LogRecord::DetectionAccuracy {
            accuracy: float_field(line, 1, SeriesKind::DetectionAccuracy)?,
        }),
    }
}

/// The `n`-th whitespace token counted from the end of the line (1 = last).
fn token_from_end(line: &str, n: usize, kind: SeriesKind) -> Result<&str, FieldError> {
    line.split_whitespace().rev().nth(n - 1).ok_or_else(|| FieldError {
        kind,
        token: String::new(),
    })
}

fn float_field(line: &str, n: usize, kind: SeriesKind) -> Result<f64, FieldError> {
    let token = token_from_end(line, n, kind)?;
    token.parse().map_err(|_| FieldError {
        kind,
        token: token.to_string(),
    })
}

/// Iteration numbers sit 4th from the end, followed by a comma.
fn iteration_field(line: &str, kind: SeriesKind) -> Result<u64, FieldError> {
    let token = token_from_end(line, 4, kind)?;
    let digits = token.strip_suffix(',').unwrap_or(token);
    digits.parse().map_err(|_| FieldError {
        kind,
        token: digits.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loss_line() {
        let line = "[0] I0412 10:01:02.123 solver.cpp:228] Iteration 100, loss = 2.3031";
        assert_eq!(
            parse_log_line(line),
            Ok(Some(LogRecord::Loss {
                iteration: 100,
                loss: 2.3031
            }))
        );
    }

    #[test]
    fn test_parse_lr_line() {
        let line = "I0412 10:01:02.124 sgd_solver.cpp:106] Iteration 100, lr = 0.001";
        assert_eq!(parse_log_line(line), Ok(Some(LogRecord::LearningRate { lr: 0.001 })));
    }

    #[test]
    fn test_parse_mbox_loss_takes_second_to_last_token() {
        let line = "[0] I0412 solver.cpp:244]     Train net output #0: mbox_loss = 4.53425 (* 1 = 4.53425 loss)";
        // second-to-last token is the weighted value inside the parentheses
        assert_eq!(parse_log_line(line), Ok(Some(LogRecord::MboxLoss { loss: 4.53425 })));

        let short = "Train net output #0: mbox_loss = 3.5 loss";
        assert_eq!(parse_log_line(short), Ok(Some(LogRecord::MboxLoss { loss: 3.5 })));
    }

    #[test]
    fn test_parse_test_iteration_line() {
        let line = "[0] I0412 10:05:00.000 solver.cpp:341] Iteration 500, Testing net (#0)";
        assert_eq!(parse_log_line(line), Ok(Some(LogRecord::TestIteration { iteration: 500 })));
    }

    #[test]
    fn test_parse_detection_accuracy_line() {
        let line = "[0] I0412 solver.cpp:429]     Test net output #0: detection_eval = 0.6123";
        assert_eq!(parse_log_line(line), Ok(Some(LogRecord::DetectionAccuracy { accuracy: 0.6123 })));
    }

    #[test]
    fn test_unrelated_line_is_ignored() {
        assert_eq!(parse_log_line("I0412 net.cpp:100] Creating layer data"), Ok(None));
        assert_eq!(parse_log_line(""), Ok(None));
    }

    #[test]
    fn test_non_primary_process_is_dropped() {
        assert_eq!(parse_log_line("[1] Iteration 5, loss = 0.5"), Ok(None));
        // dropped before conversion, so a malformed number from a worker is not an error
        assert_eq!(parse_log_line("[3] Iteration abc, loss = 0.5"), Ok(None));
    }

    #[test]
    fn test_process_id() {
        assert_eq!(process_id("[2] Iteration 5, loss = 0.5"), 2);
        assert_eq!(process_id("Iteration 5, loss = 0.5"), 0);
        assert_eq!(process_id("[0] x [7] y"), 0);
        assert_eq!(process_id("[abc] [4] z"), 4);
        assert_eq!(process_id("[99999999999999999999999] z"), u64::MAX);
    }

    #[test]
    fn test_malformed_iteration_is_an_error() {
        let err = parse_log_line("Iteration abc, loss = 0.5").unwrap_err();
        assert_eq!(err.kind, SeriesKind::Iteration);
        assert_eq!(err.token, "abc");
    }

    #[test]
    fn test_malformed_value_is_an_error() {
        let err = parse_log_line("[0] Iteration 10, lr = fast").unwrap_err();
        assert_eq!(err.kind, SeriesKind::LearningRate);
        assert_eq!(err.token, "fast");
    }

    #[test]
    fn test_loss_wins_over_later_categories() {
        // A line carrying both markers is classified once, as a loss line.
        let line = "Test net output #0: detection_eval = 0.5 Iteration 7, loss = 0.25";
        assert_eq!(parse_log_line(line), Ok(Some(LogRecord::Loss { iteration: 7, loss: 0.25 })));
    }
}
