//! imf - inspect and validate IMF track files.

mod commands;

use anyhow::Context;
use clap::{Parser, Subcommand};
use commands::{CmdCompletions, CmdDescriptors, CmdInfo, CmdValidate};
use imf_mxf::ReaderConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Command-line arguments for the imf tool.
#[derive(Parser, Debug)]
#[command(name = "imf")]
#[command(version)]
#[command(about = "Inspect and validate IMF track files")]
#[command(long_about = "imf reads MXF track files the way an IMF package builder does:\n\
    it locates the random index pack, walks every partition, resolves the\n\
    header metadata and checks OP1A and IMF constraints.\n\n\
    EXAMPLES:\n    \
    imf info video.mxf\n    \
    imf info video.mxf --json\n    \
    imf validate audio.mxf\n    \
    imf descriptors video.mxf --strict\n    \
    imf --config reader.json validate video.mxf")]
struct Cli {
    /// Reader configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the structure of a track file
    Info(CmdInfo),
    /// Check a track file against OP1A and IMF constraints
    Validate(CmdValidate),
    /// Print essence descriptors as RegXML fragments
    Descriptors(CmdDescriptors),
    /// Generate shell completions
    Completions(CmdCompletions),
}

impl Cli {
    fn reader_config(&self) -> anyhow::Result<ReaderConfig> {
        match &self.config {
            Some(path) => ReaderConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display())),
            None => Ok(ReaderConfig::default()),
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Info(cmd) => cmd.run(&cli.reader_config()?),
        Commands::Validate(cmd) => cmd.run(&cli.reader_config()?),
        Commands::Descriptors(cmd) => cmd.run(cli.reader_config()?),
        Commands::Completions(cmd) => cmd.run::<Cli>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["imf", "validate", "a.mxf", "-v", "--config", "c.json"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Commands::Validate(_)));
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let cli = Cli::parse_from(["imf", "--config", "/nonexistent/reader.json", "info", "a.mxf"]);
        let err = cli.reader_config().unwrap_err();
        assert!(err.to_string().contains("Failed to load config"));
    }
}
