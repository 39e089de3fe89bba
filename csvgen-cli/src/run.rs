//! Mode dispatch for the csvgen binary.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use csvgen_core::config::{
    AddColumnsConfig, FilterCopyConfig, GenerateConfig, ProcessConfig,
};
use csvgen_core::{
    ColumnFilter, FieldRegistry, GenerationPolicy, Pipeline, RowFilter, RunConfig, RunSummary,
    Schema, SyntheticSource,
};
use csvgen_readers::{
    create_csv_writer, create_replacing_writer, is_same_file, open_csv, CsvReaderOptions,
    CsvWriterOptions, RecordSource,
};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::args::{Command, SummaryFormat};

/// Turn parsed arguments into a validated run configuration
pub fn build_config(command: Command) -> csvgen_core::Result<RunConfig> {
    let config = match command {
        Command::Generate(args) => RunConfig::Generate(GenerateConfig {
            columns: args.columns.0,
            additional_columns: args.add_columns.0,
            rows: args.num_rows,
            output: args.output,
            policy: if args.blank_rows {
                GenerationPolicy::RecordToggle
            } else {
                GenerationPolicy::AlwaysPopulate
            },
            seed: args.seed,
            verify: args.verify,
        }),
        Command::Process(args) => RunConfig::Process(ProcessConfig {
            input: args.filename,
            filter: ColumnFilter::new(args.columns.0, args.gate),
        }),
        Command::GenerateFromExisting(args) => {
            RunConfig::GenerateFromExisting(FilterCopyConfig {
                input: args.input,
                output: args.output,
                filter: ColumnFilter::new(args.columns.0, args.gate),
            })
        }
        Command::AddColumns(args) => RunConfig::AddColumns(AddColumnsConfig {
            input: args.filename,
            output: args.output,
            columns: args.add_columns.0,
            fill: args.fill.into(),
            seed: args.seed,
        }),
    };

    config.validate()?;
    Ok(config)
}

/// A finished run, ready to be reported
#[derive(Debug)]
pub struct Report {
    /// Counters from the run
    pub summary: RunSummary,

    /// Process-style detail line, for runs that report skipped rows
    pub detail: Option<String>,
}

impl Report {
    fn plain(summary: RunSummary) -> Self {
        Self {
            summary,
            detail: None,
        }
    }

    fn with_detail(summary: RunSummary, file: &Path, columns: &[&str]) -> Self {
        let detail = format!(
            "Finished processing {}. Skipped {} of {} rows with empty data in columns '{}'\nProcessed {} rows",
            file.display(),
            summary.rows_skipped,
            summary.rows_seen,
            columns.join(", "),
            summary.rows_kept(),
        );
        Self {
            summary,
            detail: Some(detail),
        }
    }

    /// Render for stdout
    pub fn render(&self, format: SummaryFormat) -> Result<String> {
        Ok(match format {
            SummaryFormat::Json => serde_json::to_string(&self.summary)?,
            SummaryFormat::Text => match &self.detail {
                Some(detail) => detail.clone(),
                None => self.summary.to_string(),
            },
        })
    }
}

/// Run one mode inside a `run` span
pub fn execute(config: &RunConfig) -> Result<Vec<Report>> {
    let run_id = Uuid::new_v4();
    let span = info_span!("run", %run_id, mode = %config.mode());
    let _guard = span.enter();
    info!("Starting run");

    let pipeline = Pipeline::default();
    let reports = match config {
        RunConfig::Generate(c) => generate(&pipeline, c)?,
        RunConfig::Process(c) => vec![process(&pipeline, &c.input, &c.filter)?],
        RunConfig::GenerateFromExisting(c) => vec![filter_copy(&pipeline, c)?],
        RunConfig::AddColumns(c) => vec![add_columns(&pipeline, c)?],
    };

    info!("Run complete");
    Ok(reports)
}

fn generate(pipeline: &Pipeline, config: &GenerateConfig) -> Result<Vec<Report>> {
    let schema = Arc::new(Schema::concat(
        &config.columns,
        &config.additional_columns,
    ));
    let mut source = SyntheticSource::new(
        schema.clone(),
        config.rows,
        FieldRegistry::from_seed(config.seed),
        config.policy,
    );
    let mut sink = create_csv_writer(&config.output, schema.clone(), &CsvWriterOptions::default())?;
    let summary = pipeline.generate(&mut source, &mut sink)?;
    drop(sink);

    let mut reports = vec![Report::plain(summary)];
    if config.verify {
        let filter = ColumnFilter::new(schema.fields().to_vec(), None);
        reports.push(process(pipeline, &config.output, &filter)?);
    }
    Ok(reports)
}

fn process(pipeline: &Pipeline, input: &Path, filter: &ColumnFilter) -> Result<Report> {
    let mut source = open_csv(input, &CsvReaderOptions::default())?;
    let summary = pipeline.process(&mut source, filter)?;
    Ok(Report::with_detail(summary, input, &filter.checked_columns()))
}

fn filter_copy(pipeline: &Pipeline, config: &FilterCopyConfig) -> Result<Report> {
    if is_same_file(&config.input, &config.output) {
        return Err(csvgen_core::Error::config(format!(
            "input and output name the same file: {}",
            config.output.display()
        ))
        .into());
    }

    let mut source = open_csv(&config.input, &CsvReaderOptions::default())?;
    let mut sink = create_csv_writer(
        &config.output,
        source.schema().clone(),
        &CsvWriterOptions::default(),
    )?;
    let summary = pipeline.filter_copy(&mut source, &config.filter, &mut sink)?;
    Ok(Report::plain(summary))
}

fn add_columns(pipeline: &Pipeline, config: &AddColumnsConfig) -> Result<Report> {
    let mut source = open_csv(&config.input, &CsvReaderOptions::default())?;
    let schema = Pipeline::extended_schema(source.schema(), &config.columns);
    let mut registry = FieldRegistry::from_seed(config.seed);
    let options = CsvWriterOptions::default();

    let separate_output = config
        .output
        .as_deref()
        .filter(|output| !is_same_file(&config.input, output));

    let summary = match separate_output {
        Some(output) => {
            let mut sink = create_csv_writer(output, schema, &options)?;
            pipeline.add_columns(&mut source, &config.columns, config.fill, &mut registry, &mut sink)?
        }
        None => {
            let (mut sink, pending) = create_replacing_writer(&config.input, schema, &options)?;
            let summary = pipeline.add_columns(
                &mut source,
                &config.columns,
                config.fill,
                &mut registry,
                &mut sink,
            )?;
            drop(sink);
            drop(source);
            pending.commit()?;
            info!(file = %config.input.display(), "Replaced input file");
            summary
        }
    };
    Ok(Report::plain(summary))
}

/// Whether an error should exit with the usage status
pub fn is_usage_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<csvgen_core::Error>()
        .is_some_and(csvgen_core::Error::is_configuration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Cli;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    fn config(args: &[&str]) -> csvgen_core::Result<RunConfig> {
        let cli = Cli::try_parse_from(std::iter::once("csvgen").chain(args.iter().copied()))
            .unwrap();
        build_config(cli.command)
    }

    #[test]
    fn test_empty_column_list_is_configuration_error() {
        let err = config(&["generate", "-c", " , ", "-n", "3"]).unwrap_err();
        assert!(err.is_configuration());
        assert!(is_usage_error(&anyhow::Error::new(err)));
    }

    #[test]
    fn test_same_input_and_output_rejected() {
        let err = config(&["generate-from-existing", "-i", "a.csv", "-o", "a.csv", "-c", "x"])
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_generate_with_verify_reports_twice() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("people.csv");
        let output_arg = output.to_str().unwrap();
        let run = config(&[
            "generate", "-c", "name,email", "--add-columns", "city", "-n", "12", "-o", output_arg,
            "--seed", "9", "--verify",
        ])
        .unwrap();

        let reports = execute(&run).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].summary.rows_written, 12);
        assert_eq!(reports[1].summary.rows_seen, 12);
        assert_eq!(reports[1].summary.rows_skipped, 0);
        assert!(fs::read_to_string(&output)
            .unwrap()
            .starts_with("name,email,city\n"));
    }

    #[test]
    fn test_process_text_report() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.csv");
        fs::write(&input, "name,email\nAnn,a@x.com\n,b@x.com\nCid,\n").unwrap();
        let run = config(&["process", "-f", input.to_str().unwrap(), "-c", "name,email"]).unwrap();

        let reports = execute(&run).unwrap();
        let text = reports[0].render(SummaryFormat::Text).unwrap();
        assert!(text.contains("Skipped 2 of 3 rows with empty data in columns 'name, email'"));
        assert!(text.ends_with("Processed 1 rows"));
    }

    #[test]
    fn test_json_report() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.csv");
        let output = dir.path().join("clean.csv");
        fs::write(&input, "name,email\nAnn,a@x.com\n,b@x.com\n").unwrap();
        let run = config(&[
            "generate-from-existing",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-c",
            "name",
        ])
        .unwrap();

        let reports = execute(&run).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&reports[0].render(SummaryFormat::Json).unwrap()).unwrap();
        assert_eq!(json["mode"], "generate-from-existing");
        assert_eq!(json["rows_written"], 1);
        assert_eq!(json["rows_skipped"], 1);
    }

    #[test]
    fn test_add_columns_in_place() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.csv");
        fs::write(&input, "name\nAnn\nBo\n").unwrap();
        let run = config(&[
            "add-columns", "-f", input.to_str().unwrap(), "--add-columns", "city", "--fill",
            "generated", "--seed", "4",
        ])
        .unwrap();

        execute(&run).unwrap();
        let text = fs::read_to_string(&input).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("name,city"));
        assert!(lines.all(|l| l.split(',').nth(1).is_some_and(|c| !c.is_empty())));
    }

    fn write_people(path: &Path, rows: usize) -> String {
        let mut text = String::from("name,email\n");
        for i in 0..rows {
            text.push_str(&format!("Person{i:05},p{i}@example.com\n"));
        }
        fs::write(path, &text).unwrap();
        text
    }

    #[test]
    fn test_add_columns_output_naming_input_rewrites_every_row() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.csv");
        let original = write_people(&input, 20_000);
        assert!(original.len() > 64 * 1024);

        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let aliases = [input.clone(), sub.join("..").join("people.csv")];
        for (round, output) in aliases.iter().enumerate() {
            let column = format!("extra{round}");
            let run = config(&[
                "add-columns",
                "-f",
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "--add-columns",
                column.as_str(),
            ])
            .unwrap();

            let reports = execute(&run).unwrap();
            assert_eq!(reports[0].summary.rows_written, 20_000);
        }

        let text = fs::read_to_string(&input).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("name,email,extra0,extra1"));
        assert_eq!(lines.clone().count(), 20_000);
        assert_eq!(lines.next(), Some("Person00000,p0@example.com,,"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_filter_copy_onto_input_through_alias_rejected() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("people.csv");
        let original = write_people(&input, 10);
        let sub = dir.path().join("sub");
        fs::create_dir(&sub).unwrap();
        let alias = sub.join("..").join("people.csv");

        let run = config(&[
            "generate-from-existing",
            "-i",
            input.to_str().unwrap(),
            "-o",
            alias.to_str().unwrap(),
            "-c",
            "name",
        ])
        .unwrap();

        let err = execute(&run).unwrap_err();
        assert!(is_usage_error(&err));
        assert_eq!(fs::read_to_string(&input).unwrap(), original);
    }

    #[test]
    fn test_missing_input_fails_without_usage_status() {
        let dir = TempDir::new().unwrap();
        let run = config(&[
            "process",
            "-f",
            dir.path().join("absent.csv").to_str().unwrap(),
            "-c",
            "name",
        ])
        .unwrap();
        let err = execute(&run).unwrap_err();
        assert!(!is_usage_error(&err));
    }
}
