//! CLI argument definitions for csvgen.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use csvgen_core::config::{parse_column_list, DEFAULT_OUTPUT};
use csvgen_core::BackfillPolicy;

/// Synthetic CSV generation and emptiness-based row filtering.
///
/// ## Examples
///
/// Generate 100 rows of fake people:
///   csvgen generate -c name,email -n 100 -o people.csv
///
/// Report rows with an empty email or phone:
///   csvgen process -f people.csv -c email,phone
///
/// Copy only complete rows to a new file:
///   csvgen generate-from-existing -i people.csv -o clean.csv -c name,email
///
/// Append generated columns in place:
///   csvgen add-columns -f people.csv --add-columns city,zip --fill generated
#[derive(Parser, Debug)]
#[command(name = "csvgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,

    /// Format of the run summary printed to stdout
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub summary: SummaryFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Operating modes
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write a new CSV file of synthetic rows
    Generate(GenerateArgs),

    /// Report which rows of a CSV file have empty check columns
    Process(ProcessArgs),

    /// Copy the rows of a CSV file whose check columns are all populated
    GenerateFromExisting(FilterCopyArgs),

    /// Append columns to every row of a CSV file
    AddColumns(AddColumnsArgs),
}

/// Arguments for `generate`
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Comma-separated column names
    #[arg(short, long, value_parser = parse_columns)]
    pub columns: Columns,

    /// Comma-separated columns appended after `--columns`
    #[arg(long, value_parser = parse_columns, default_value = "")]
    pub add_columns: Columns,

    /// Number of data rows to write
    #[arg(short = 'n', long)]
    pub num_rows: usize,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Make each row either fully populated or fully empty, at random
    #[arg(long)]
    pub blank_rows: bool,

    /// Seed for reproducible values
    #[arg(long)]
    pub seed: Option<u64>,

    /// Re-read the output and report rows with empty columns
    #[arg(long)]
    pub verify: bool,
}

/// Arguments for `process`
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// File to inspect
    #[arg(short = 'f', long)]
    pub filename: PathBuf,

    /// Comma-separated columns that must be populated
    #[arg(short, long, value_parser = parse_columns)]
    pub columns: Columns,

    /// Column checked first; an empty gate skips the row on its own
    #[arg(long)]
    pub gate: Option<String>,
}

/// Arguments for `generate-from-existing`
#[derive(Args, Debug)]
pub struct FilterCopyArgs {
    /// File to read
    #[arg(short, long)]
    pub input: PathBuf,

    /// File to write
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Comma-separated columns that must be populated
    #[arg(short, long, value_parser = parse_columns)]
    pub columns: Columns,

    /// Column checked first; an empty gate skips the row on its own
    #[arg(long)]
    pub gate: Option<String>,
}

/// Arguments for `add-columns`
#[derive(Args, Debug)]
pub struct AddColumnsArgs {
    /// File to extend
    #[arg(short = 'f', long)]
    pub filename: PathBuf,

    /// Comma-separated columns to append
    #[arg(long, value_parser = parse_columns)]
    pub add_columns: Columns,

    /// Write here instead of rewriting the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Values given to the new columns
    #[arg(long, value_enum, default_value = "empty")]
    pub fill: FillArg,

    /// Seed for reproducible values
    #[arg(long)]
    pub seed: Option<u64>,
}

/// A parsed comma-separated column list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Columns(pub Vec<String>);

fn parse_columns(s: &str) -> Result<Columns, String> {
    Ok(Columns(parse_column_list(s)))
}

/// Log level for tracing output
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Run summary format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per summary
    Json,
}

/// Fill for columns added by `add-columns`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FillArg {
    /// Empty strings
    #[default]
    Empty,
    /// Values from the fake-field provider
    Generated,
}

impl From<FillArg> for BackfillPolicy {
    fn from(fill: FillArg) -> Self {
        match fill {
            FillArg::Empty => BackfillPolicy::Empty,
            FillArg::Generated => BackfillPolicy::Generated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("csvgen").chain(args.iter().copied()))
    }

    #[test]
    fn test_generate_defaults() {
        let cli = parse(&["generate", "-c", "name, email", "-n", "5"]).unwrap();
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.columns.0, vec!["name", "email"]);
        assert!(args.add_columns.0.is_empty());
        assert_eq!(args.num_rows, 5);
        assert_eq!(args.output, PathBuf::from("output.csv"));
        assert!(!args.blank_rows);
        assert_eq!(cli.summary, SummaryFormat::Text);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "process", "-f", "in.csv", "-c", "email", "--log-level", "debug", "--summary", "json",
        ])
        .unwrap();
        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert_eq!(cli.summary, SummaryFormat::Json);
    }

    #[test]
    fn test_process_gate() {
        let cli = parse(&["process", "-f", "in.csv", "-c", "name,email", "--gate", "email"]).unwrap();
        let Command::Process(args) = cli.command else {
            panic!("expected process");
        };
        assert_eq!(args.gate.as_deref(), Some("email"));
    }

    #[test]
    fn test_add_columns_fill() {
        let cli = parse(&[
            "add-columns", "-f", "in.csv", "--add-columns", "city", "--fill", "generated",
        ])
        .unwrap();
        let Command::AddColumns(args) = cli.command else {
            panic!("expected add-columns");
        };
        assert_eq!(args.fill, FillArg::Generated);
        assert!(args.output.is_none());
    }

    #[test]
    fn test_missing_required_argument() {
        assert!(parse(&["generate", "-c", "name"]).is_err());
        assert!(parse(&["generate-from-existing", "-c", "name"]).is_err());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(parse(&["shuffle"]).is_err());
    }
}
