//! Validated run configuration handed to the pipeline

use std::path::PathBuf;

use serde::Serialize;

use crate::batch::DEFAULT_BATCH_THRESHOLD;
use crate::error::{Error, Result};
use crate::policy::{BackfillPolicy, ColumnFilter, GenerationPolicy};

/// Default output path for writing modes
pub const DEFAULT_OUTPUT: &str = "output.csv";

/// Configuration for pipeline execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Records per flushed batch
    pub batch_threshold: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
        }
    }
}

impl PipelineConfig {
    /// Check the configuration before use
    pub fn validate(&self) -> Result<()> {
        if self.batch_threshold == 0 {
            return Err(Error::config("batch threshold must be at least 1"));
        }
        Ok(())
    }
}

/// Split a comma-separated column list.
///
/// Items are trimmed and empty items dropped; order and duplicates are kept.
pub fn parse_column_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pipeline mode selected for a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// Write synthetic records to a new file
    Generate,
    /// Report keep/skip decisions for an existing file
    Process,
    /// Copy the kept rows of an existing file to a new file
    GenerateFromExisting,
    /// Append columns to the rows of an existing file
    AddColumns,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Mode::Generate => "generate",
            Mode::Process => "process",
            Mode::GenerateFromExisting => "generate-from-existing",
            Mode::AddColumns => "add-columns",
        };
        write!(f, "{name}")
    }
}

/// Settings for `generate`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateConfig {
    /// Base columns
    pub columns: Vec<String>,
    /// Additional columns appended after the base columns
    pub additional_columns: Vec<String>,
    /// Number of data rows to write
    pub rows: usize,
    /// Output file
    pub output: PathBuf,
    /// How each record is populated
    pub policy: GenerationPolicy,
    /// Fixed seed for the fake-field provider
    pub seed: Option<u64>,
    /// Re-read the output and report empty rows afterwards
    pub verify: bool,
}

/// Settings for `process`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessConfig {
    /// File to inspect
    pub input: PathBuf,
    /// Keep/skip rule
    pub filter: ColumnFilter,
}

/// Settings for `generate-from-existing`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCopyConfig {
    /// File to read
    pub input: PathBuf,
    /// File to write
    pub output: PathBuf,
    /// Keep/skip rule
    pub filter: ColumnFilter,
}

/// Settings for `add-columns`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumnsConfig {
    /// File to read
    pub input: PathBuf,
    /// File to write; `None` rewrites the input in place
    pub output: Option<PathBuf>,
    /// Columns appended to the header
    pub columns: Vec<String>,
    /// Values given to the new columns
    pub fill: BackfillPolicy,
    /// Fixed seed for the fake-field provider
    pub seed: Option<u64>,
}

/// A fully validated run: one mode and its settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunConfig {
    /// `generate`
    Generate(GenerateConfig),
    /// `process`
    Process(ProcessConfig),
    /// `generate-from-existing`
    GenerateFromExisting(FilterCopyConfig),
    /// `add-columns`
    AddColumns(AddColumnsConfig),
}

impl RunConfig {
    /// The mode this configuration runs
    pub fn mode(&self) -> Mode {
        match self {
            RunConfig::Generate(_) => Mode::Generate,
            RunConfig::Process(_) => Mode::Process,
            RunConfig::GenerateFromExisting(_) => Mode::GenerateFromExisting,
            RunConfig::AddColumns(_) => Mode::AddColumns,
        }
    }

    /// Check the configuration. Performs no I/O.
    pub fn validate(&self) -> Result<()> {
        match self {
            RunConfig::Generate(c) => {
                if c.columns.is_empty() && c.additional_columns.is_empty() {
                    return Err(Error::config("at least one column is required"));
                }
                require_path(&c.output, "output")
            }
            RunConfig::Process(c) => require_path(&c.input, "filename"),
            RunConfig::GenerateFromExisting(c) => {
                require_path(&c.input, "input")?;
                require_path(&c.output, "output")?;
                if c.input == c.output {
                    return Err(Error::config("input and output must be different files"));
                }
                Ok(())
            }
            RunConfig::AddColumns(c) => {
                require_path(&c.input, "filename")?;
                if let Some(output) = &c.output {
                    require_path(output, "output")?;
                }
                if c.columns.is_empty() {
                    return Err(Error::config("at least one column to add is required"));
                }
                Ok(())
            }
        }
    }
}

fn require_path(path: &std::path::Path, what: &str) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(Error::config(format!("{what} path must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("name,email", &["name", "email"] ; "plain")]
    #[test_case(" name , email ", &["name", "email"] ; "trimmed")]
    #[test_case("name,,email,", &["name", "email"] ; "empty items dropped")]
    #[test_case("name,name", &["name", "name"] ; "duplicates kept")]
    #[test_case("", &[] ; "empty list")]
    fn test_parse_column_list(input: &str, expected: &[&str]) {
        assert_eq!(parse_column_list(input), expected);
    }

    fn generate(columns: &[&str], output: &str) -> RunConfig {
        RunConfig::Generate(GenerateConfig {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            additional_columns: Vec::new(),
            rows: 10,
            output: output.into(),
            policy: GenerationPolicy::AlwaysPopulate,
            seed: None,
            verify: false,
        })
    }

    #[test]
    fn test_generate_requires_columns() {
        assert!(generate(&["name"], "out.csv").validate().is_ok());
        assert!(generate(&[], "out.csv").validate().unwrap_err().is_configuration());
        assert!(generate(&["name"], "").validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_filter_copy_rejects_same_file() {
        let config = RunConfig::GenerateFromExisting(FilterCopyConfig {
            input: "data.csv".into(),
            output: "data.csv".into(),
            filter: ColumnFilter::new(vec!["name".into()], None),
        });
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_add_columns_requires_columns() {
        let config = RunConfig::AddColumns(AddColumnsConfig {
            input: "data.csv".into(),
            output: None,
            columns: Vec::new(),
            fill: BackfillPolicy::Empty,
            seed: None,
        });
        assert!(config.validate().unwrap_err().is_configuration());
        assert_eq!(config.mode().to_string(), "add-columns");
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let config = PipelineConfig { batch_threshold: 0 };
        assert!(config.validate().is_err());
        assert!(PipelineConfig::default().validate().is_ok());
    }
}
