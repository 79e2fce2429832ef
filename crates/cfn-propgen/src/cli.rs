//! Command-line interface and pipeline orchestration.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;

use crate::app::extract;
use crate::app::report::{OutputFormat, ReportOptions, Reporter};
use crate::app::scan::{Scanner, ScannerConfig};
use crate::infra::config::Config;

#[derive(Debug, Parser)]
#[command(
    name = "cfn-propgen",
    version,
    about = "Extract GetAtt targets and Ref values from a CloudFormation documentation checkout"
)]
pub struct Cli {
    /// Path to a local checkout of the documentation source tree.
    #[arg(short, long, required_unless_present = "completions")]
    root: Option<PathBuf>,

    /// Write the JSON report to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report format, overriding the configured default.
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Print shell completions and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut command = Cli::command();
        let name = command.get_name().to_string();
        clap_complete::generate(shell, &mut command, name, &mut io::stdout());
        return Ok(());
    }

    let root = cli.root.context("--root is required")?;
    let config = Config::load()?;

    let mut options = ReportOptions::from_config(&config);
    if let Some(format) = cli.format {
        options.format = format;
    }
    options.output_path = cli.output;

    let scan = Scanner::new().scan(&ScannerConfig::from_root(root, config))?;
    tracing::debug!(pages = scan.pages.len(), "scanned documentation root");

    let results = extract::extract_all(&scan)?;
    let report = Reporter::new().write(&results, &options)?;

    if report.output_path.is_none() {
        println!("{}", report.rendered);
    }

    Ok(())
}
