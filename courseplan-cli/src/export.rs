//! `export` subcommand: write stored records as CSV.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use courseplan_core::DeliveryStore;
use courseplan_data::csv::{export_file_name, render_delivery_csv};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::database::{database_path, open_store};
use crate::{ARG_COURSE, ARG_DATABASE, ARG_OUTPUT, CliError, write_json};

/// Output path meaning "write the CSV to standard output".
const STDOUT_MARKER: &str = "-";

/// CLI arguments for the `export` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Render stored records as CSV with the same columns the \
                 importer reads. Without --output the file is named \
                 course_<n>_data.csv or all_delivery_data.csv in the current \
                 directory; pass --output - to print it instead.",
    about = "Export stored records as CSV"
)]
#[ortho_config(prefix = "COURSEPLAN")]
pub(crate) struct ExportArgs {
    /// Path to the SQLite delivery database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Export only this course.
    #[arg(long = ARG_COURSE, value_name = "course")]
    #[serde(default)]
    pub(crate) course: Option<String>,
    /// Destination file, or `-` for standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl ExportArgs {
    pub(crate) fn into_config(self) -> Result<ExportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        Ok(ExportConfig::from(merged))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ExportTarget {
    Stdout,
    File(Utf8PathBuf),
}

/// Resolved `export` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) course: Option<String>,
    pub(crate) target: ExportTarget,
}

impl From<ExportArgs> for ExportConfig {
    fn from(args: ExportArgs) -> Self {
        let target = match args.output {
            Some(path) if path.as_str() == STDOUT_MARKER => ExportTarget::Stdout,
            Some(path) => ExportTarget::File(path),
            None => ExportTarget::File(Utf8PathBuf::from(export_file_name(
                args.course.as_deref(),
            ))),
        };
        Self {
            database: database_path(args.database),
            course: args.course,
            target,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ExportOutput {
    pub(crate) path: Utf8PathBuf,
    pub(crate) records: usize,
}

pub(crate) fn run_export_with(args: ExportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let records = match config.course.as_deref() {
        Some(course) => store.list_course(course),
        None => store.list_all(),
    }
    .map_err(|source| CliError::Store {
        operation: "list records for export",
        source,
    })?;
    let csv = render_delivery_csv(&records);

    match config.target {
        ExportTarget::Stdout => writer
            .write_all(csv.as_bytes())
            .map_err(CliError::WriteOutput),
        ExportTarget::File(path) => {
            write_export(&path, &csv)?;
            info!("exported {} records to {path}", records.len());
            write_json(
                writer,
                &ExportOutput {
                    path,
                    records: records.len(),
                },
            )
        }
    }
}

fn write_export(path: &Utf8Path, csv: &str) -> Result<(), CliError> {
    courseplan_fs::ensure_parent_dir(path)
        .and_then(|()| courseplan_fs::write_utf8_file(path, csv))
        .map_err(|source| CliError::WriteExport {
            path: path.to_path_buf(),
            source,
        })
}
