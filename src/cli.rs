use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Parse training logs and plot loss, lr and detection accuracy trends",
    long_about = "Parse Caffe-style training logs and plot loss, mbox loss, learning-rate and detection accuracy \
                  trends, one PNG per chart. Only lines from process 0 are used in multi-process logs."
)]
pub struct Cli {
    /// Training log files to parse
    #[arg(short = 'l', long = "log_files", visible_alias = "log-files", num_args = 1.., required = true)]
    pub log_files: Vec<PathBuf>,

    /// Directory in which to place the chart files (must exist)
    #[arg(short = 'o', long = "output_dir", visible_alias = "output-dir", default_value = "./")]
    pub output_dir: PathBuf,

    /// TOML file with chart size and style settings
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, action)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_multiple_log_files_and_default_output_dir() {
        let cli = Cli::try_parse_from(["plot", "-l", "a.log", "b.log"]).unwrap();
        assert_eq!(cli.log_files, vec![PathBuf::from("a.log"), PathBuf::from("b.log")]);
        assert_eq!(cli.output_dir, PathBuf::from("./"));
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_long_names() {
        let cli = Cli::try_parse_from(["plot", "--log_files", "a.log", "--output_dir", "out/", "-v"]).unwrap();
        assert_eq!(cli.log_files, vec![PathBuf::from("a.log")]);
        assert_eq!(cli.output_dir, PathBuf::from("out/"));
        assert!(cli.verbose);
    }

    #[test]
    fn test_log_files_are_required() {
        assert!(Cli::try_parse_from(["plot", "-o", "out"]).is_err());
    }
}
