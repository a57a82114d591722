//! The fixed set of trend charts produced for a parsed training log.

use std::path::PathBuf;

use log::info;

use crate::chart::{ChartRenderer, NamedSeries};
use crate::error::PlotError;
use crate::parser::TrainLog;

const ITERATIONS_AXIS: &str = "Iterations";
const TEST_ITERATIONS_AXIS: &str = "Test iterations";

pub fn plot_loss_trends(train_log: &TrainLog, renderer: &ChartRenderer) -> Result<PathBuf, PlotError> {
    renderer.render(
        NamedSeries::new("loss", train_log.losses()),
        NamedSeries::new(ITERATIONS_AXIS, train_log.iterations()),
    )
}

/// Only drawn for detection logs.
pub fn plot_mbox_loss_trends(train_log: &TrainLog, renderer: &ChartRenderer) -> Result<Option<PathBuf>, PlotError> {
    if !train_log.is_detection() {
        info!("Not a detection log, skipping mbox loss chart");
        return Ok(None);
    }
    renderer
        .render(
            NamedSeries::new("mbox loss", train_log.mbox_losses()),
            NamedSeries::new(ITERATIONS_AXIS, train_log.iterations()),
        )
        .map(Some)
}

pub fn plot_lr_trends(train_log: &TrainLog, renderer: &ChartRenderer) -> Result<PathBuf, PlotError> {
    renderer.render(
        NamedSeries::new("lr", train_log.lrs()),
        NamedSeries::new(ITERATIONS_AXIS, train_log.iterations()),
    )
}

/// Only drawn for detection logs.
pub fn plot_detection_accuracy_trends(train_log: &TrainLog, renderer: &ChartRenderer) -> Result<Option<PathBuf>, PlotError> {
    if !train_log.is_detection() {
        info!("Not a detection log, skipping detection accuracy chart");
        return Ok(None);
    }
    renderer
        .render(
            NamedSeries::new("detection accuracy", train_log.detection_accuracies()),
            NamedSeries::new(TEST_ITERATIONS_AXIS, train_log.test_iterations()),
        )
        .map(Some)
}

/// Draw every applicable chart, stopping at the first failure.
///
/// # Returns
///
/// Paths of the written charts, in drawing order.
pub fn plot_all(train_log: &TrainLog, renderer: &ChartRenderer) -> Result<Vec<PathBuf>, PlotError> {
    let mut written = vec![plot_loss_trends(train_log, renderer)?];
    written.extend(plot_mbox_loss_trends(train_log, renderer)?);
    written.push(plot_lr_trends(train_log, renderer)?);
    written.extend(plot_detection_accuracy_trends(train_log, renderer)?);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlotConfig;
    use std::path::Path;

    const DETECTION_LOG: &str = "\
[0] I0412 solver.cpp:341] Iteration 0, Testing net (#0)
[0] I0412 solver.cpp:429]     Test net output #0: detection_eval = 0.01
[0] I0412 solver.cpp:228] Iteration 0, loss = 9.5
[0] I0412 solver.cpp:244]     Train net output #0: mbox_loss = 9.5 (* 1 = 9.5 loss)
[0] I0412 sgd_solver.cpp:106] Iteration 0, lr = 0.001
[1] I0412 solver.cpp:228] Iteration 0, loss = 9.7
[0] I0412 solver.cpp:228] Iteration 10, loss = 7.25
[0] I0412 solver.cpp:244]     Train net output #0: mbox_loss = 7.25 (* 1 = 7.25 loss)
";

    fn small_renderer(dir: &Path) -> ChartRenderer {
        let config = PlotConfig {
            width: 320,
            height: 240,
            ..PlotConfig::default()
        };
        ChartRenderer::new(dir, config)
    }

    #[test]
    fn test_detection_log_produces_four_charts() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("ssd.log");
        std::fs::write(&log_path, DETECTION_LOG).unwrap();

        let train_log = TrainLog::parse(&[&log_path]).unwrap();
        let written = plot_all(&train_log, &small_renderer(dir.path())).unwrap();

        let names: Vec<_> = written.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["loss_plot.png", "mbox_loss_plot.png", "lr_plot.png", "detection_accuracy_plot.png"]);
        assert!(written.iter().all(|p| p.is_file()));
    }

    #[test]
    fn test_classification_log_skips_detection_charts() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("cls.log");
        std::fs::write(&log_path, "Iteration 0, loss = 2.0\nIteration 0, lr = 0.1\nIteration 10, loss = 1.0\n").unwrap();

        let train_log = TrainLog::parse(&[&log_path]).unwrap();
        let written = plot_all(&train_log, &small_renderer(dir.path())).unwrap();

        assert_eq!(written.len(), 2);
        assert!(dir.path().join("loss_plot.png").is_file());
        assert!(dir.path().join("lr_plot.png").is_file());
        assert!(!dir.path().join("mbox_loss_plot.png").exists());
        assert!(!dir.path().join("detection_accuracy_plot.png").exists());
    }

    #[test]
    fn test_malformed_number_writes_no_chart() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("bad.log");
        std::fs::write(&log_path, "Iteration 0, loss = 2.0\nIteration 0, lr = 0.1\nIteration 10, loss = oops\n").unwrap();

        let result = TrainLog::parse(&[&log_path]).and_then(|train_log| plot_all(&train_log, &small_renderer(dir.path())));
        assert!(matches!(result, Err(PlotError::Parse { line_number: 3, .. })));

        let charts: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with("_plot.png"))
            .collect();
        assert!(charts.is_empty(), "unexpected charts: {:?}", charts);
    }

    #[test]
    fn test_more_lrs_than_losses_is_a_shape_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("odd.log");
        std::fs::write(&log_path, "Iteration 0, lr = 0.1\nIteration 10, lr = 0.1\nIteration 10, loss = 1.0\n").unwrap();

        let train_log = TrainLog::parse(&[&log_path]).unwrap();
        let renderer = small_renderer(dir.path());
        plot_loss_trends(&train_log, &renderer).unwrap();
        assert!(matches!(plot_lr_trends(&train_log, &renderer), Err(PlotError::ShapeMismatch(_))));
    }
}
