use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, debug, error, info};

use crate::chart::ChartRenderer;
use crate::cli::Cli;
use crate::config::PlotConfig;
use crate::parser::TrainLog;

mod chart;
mod cli;
mod config;
mod error;
mod parser;
mod report;

fn main() {
    let cli = Cli::parse();

    // Logging setup
    let own_level = if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("train_log_plotter"), own_level)
        .parse_default_env()
        .init();

    if let Err(err) = run(&cli) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    debug!("{:?}", cli);

    let config = PlotConfig::load_or_default(cli.config.as_deref())
        .map_err(anyhow::Error::msg)
        .context("invalid plot configuration")?;

    let train_log = TrainLog::parse(&cli.log_files).context("failed to parse training logs")?;
    info!("Parsed {} log sources", train_log.sources().len());

    let renderer = ChartRenderer::new(&cli.output_dir, config);
    let written = report::plot_all(&train_log, &renderer).context("failed to plot trends")?;

    info!("Done, {} charts written to {}", written.len(), cli.output_dir.display());
    Ok(())
}
