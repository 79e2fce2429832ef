//! Report rendering and output handling.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::model::ResultSet;
use crate::infra::config::Config;

/// Supported report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    Json,
    /// Single-line JSON for piping into other tools.
    JsonCompact,
}

impl OutputFormat {
    /// Return a stable identifier for configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::JsonCompact => "json-compact",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" | "json-pretty" | "pretty" => Ok(OutputFormat::Json),
            "json-compact" | "compact" => Ok(OutputFormat::JsonCompact),
            other => Err(OutputFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing an [`OutputFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum OutputFormatParseError {
    #[error("unknown output format '{0}'")]
    UnknownFormat(String),
}

/// Runtime options controlling report output.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub format: OutputFormat,
    /// Destination file; `None` means the caller prints to stdout.
    pub output_path: Option<PathBuf>,
}

impl ReportOptions {
    /// Build options from configuration defaults.
    pub fn from_config(config: &Config) -> Self {
        let format = <OutputFormat as std::str::FromStr>::from_str(&config.defaults.format)
            .unwrap_or(OutputFormat::Json);
        Self {
            format,
            output_path: None,
        }
    }
}

/// Result of writing a report.
#[derive(Debug, Clone)]
pub struct ReportResult {
    pub rendered: String,
    pub output_path: Option<PathBuf>,
}

/// Renders result sets and writes report artifacts.
#[derive(Debug, Default)]
pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Render the result set into a JSON string.
    pub fn render(&self, results: &ResultSet, format: OutputFormat) -> Result<String> {
        let rendered = match format {
            OutputFormat::Json => serde_json::to_string_pretty(results),
            OutputFormat::JsonCompact => serde_json::to_string(results),
        }
        .context("failed to serialize result set")?;
        Ok(rendered)
    }

    /// Render the result set and persist it when an output path is set.
    pub fn write(&self, results: &ResultSet, options: &ReportOptions) -> Result<ReportResult> {
        let rendered = self.render(results, options.format)?;

        if let Some(path) = &options.output_path {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create output directory: {}", parent.display())
                })?;
            }
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
        }

        Ok(ReportResult {
            rendered,
            output_path: options.output_path.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::domain::model::ExtractedFacts;

    fn sample_results() -> ResultSet {
        let mut results = ResultSet::new();
        results.insert(
            "AWS::S3::Bucket",
            ExtractedFacts {
                get_att_targets: vec!["Arn".into()],
                ref_values: vec!["the bucket name".into()],
            },
        );
        results
    }

    #[test]
    fn parses_format_aliases() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!(
            "JSON-Compact".parse::<OutputFormat>().unwrap(),
            OutputFormat::JsonCompact
        );
        assert!("yaml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn renders_pretty_and_compact() {
        let reporter = Reporter::new();
        let results = sample_results();

        let pretty = reporter.render(&results, OutputFormat::Json).unwrap();
        assert!(pretty.contains('\n'));
        assert!(pretty.contains("\"getAttTargets\""));

        let compact = reporter.render(&results, OutputFormat::JsonCompact).unwrap();
        assert!(!compact.contains('\n'));
        assert!(compact.contains("\"refValues\":[\"the bucket name\"]"));
    }

    #[test]
    fn writes_report_to_file_creating_parents() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("out/report.json");

        let options = ReportOptions {
            format: OutputFormat::Json,
            output_path: Some(path.clone()),
        };
        let result = Reporter::new().write(&sample_results(), &options)?;

        assert_eq!(result.output_path.as_deref(), Some(path.as_path()));
        let written = fs::read_to_string(path)?;
        assert_eq!(written, result.rendered);
        Ok(())
    }
}
