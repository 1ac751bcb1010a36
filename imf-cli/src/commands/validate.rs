//! Track file validation command.

use clap::Args;
use console::style;
use imf_core::uuid_to_urn;
use imf_mxf::{ErrorEntry, ReaderConfig, Severity};
use serde::Serialize;
use std::path::PathBuf;

/// Validation report.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// File path.
    pub file: String,
    /// Whether the file passed every check.
    pub valid: bool,
    /// Track file id, when the header could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track_file_id: Option<String>,
    /// Everything the reader logged.
    pub errors: Vec<ErrorEntry>,
}

/// Check a track file against OP1A and IMF constraints.
#[derive(Args, Debug)]
pub struct CmdValidate {
    /// Path to the track file.
    pub file: PathBuf,

    /// Output in JSON format.
    #[arg(long)]
    pub json: bool,

    /// Only check OP1A constraints.
    #[arg(long)]
    pub op1a_only: bool,
}

impl CmdValidate {
    /// Execute the validate command.
    pub fn run(&self, config: &ReaderConfig) -> anyhow::Result<()> {
        let config = if self.op1a_only {
            config.clone().with_imf_validation(false)
        } else {
            config.clone()
        };
        let report = self.validate(config)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }

        if !report.valid {
            std::process::exit(1);
        }
        Ok(())
    }

    fn validate(&self, config: ReaderConfig) -> anyhow::Result<ValidationReport> {
        let reader = super::open_reader(&self.file, config)?;
        let track_file = reader.read();
        let errors = reader.logger().errors();

        if let Err(err) = &track_file {
            tracing::debug!(error = %err, "Track file failed validation");
        }
        let valid = track_file.is_ok()
            && errors.iter().all(|e| e.severity == Severity::Warning);

        Ok(ValidationReport {
            file: self.file.display().to_string(),
            valid,
            track_file_id: track_file
                .ok()
                .and_then(|t| t.track_file_id)
                .map(|id| uuid_to_urn(&id)),
            errors,
        })
    }
}

fn print_report(report: &ValidationReport) {
    println!();
    if report.valid {
        println!("{} {}", style("✓").green().bold(), report.file);
    } else {
        println!("{} {}", style("✗").red().bold(), report.file);
    }
    if let Some(id) = &report.track_file_id {
        println!("  {:<16} {}", style("Track File ID:").white(), id);
    }

    for entry in &report.errors {
        let severity = match entry.severity {
            Severity::Warning => style("warning").yellow(),
            Severity::NonFatal => style("error").red(),
            Severity::Fatal => style("fatal").red().bold(),
        };
        let rule = entry
            .location
            .rule
            .map(|r| format!("[{}] ", r))
            .unwrap_or_default();
        println!("  {:<8} {}{}", severity, rule, entry.message);
        if let Some(offset) = entry.location.byte_offset {
            println!("           {}", style(format!("at offset {}", offset)).dim());
        }
    }
    println!();
}
