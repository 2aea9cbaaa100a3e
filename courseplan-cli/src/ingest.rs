//! `ingest` subcommand: replace the stored dataset with a CSV upload.

use camino::Utf8PathBuf;
use clap::Parser;
use courseplan_data::{ingest_csv, read_csv_upload};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::database::{database_path, open_store};
use crate::{ARG_DATABASE, ARG_INGEST_FILE, CliError, ENV_INGEST_FILE, write_json};

/// CLI arguments for the `ingest` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Parse a delivery CSV (headers: course_number, customer_name, \
                 customer_code, address, sales) and replace every stored record \
                 with its rows. Nothing is written if the file is rejected.",
    about = "Replace stored delivery records with a CSV file"
)]
#[ortho_config(prefix = "COURSEPLAN")]
pub(crate) struct IngestArgs {
    /// Path to the CSV file.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) file: Option<Utf8PathBuf>,
    /// Path to the SQLite delivery database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl IngestArgs {
    pub(crate) fn into_config(self) -> Result<IngestConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        IngestConfig::try_from(merged)
    }
}

/// Resolved `ingest` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngestConfig {
    pub(crate) file: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<IngestArgs> for IngestConfig {
    type Error = CliError;

    fn try_from(args: IngestArgs) -> Result<Self, Self::Error> {
        let file = args.file.ok_or(CliError::MissingArgument {
            field: ARG_INGEST_FILE,
            env: ENV_INGEST_FILE,
        })?;
        Ok(Self {
            file,
            database: database_path(args.database),
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct IngestOutput {
    pub(crate) inserted: usize,
}

pub(crate) fn run_ingest_with(args: IngestArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let content = read_csv_upload(&config.file)?;
    let mut store = open_store(&config.database)?;
    let report = ingest_csv(&mut store, &content)?;
    info!("imported {} records from {}", report.inserted, config.file);
    write_json(
        writer,
        &IngestOutput {
            inserted: report.inserted,
        },
    )
}
