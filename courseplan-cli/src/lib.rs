//! Command-line interface for Courseplan.
//!
//! Each subcommand resolves its settings from CLI flags, `COURSEPLAN_*`
//! environment variables and configuration files, opens the SQLite delivery
//! database, and writes its result to standard output.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::Write;

mod database;
mod error;
mod export;
mod geocode;
mod ingest;
mod records;
mod summary;

pub use error::{CliError, ErrorClass};

use export::{ExportArgs, run_export_with};
use geocode::{GeocodeArgs, run_geocode};
use ingest::{IngestArgs, run_ingest_with};
use records::{AssignArgs, CoursesArgs, ListArgs, run_assign_with, run_courses_with, run_list_with};
use summary::{SummaryArgs, run_summary_with};

const ARG_DATABASE: &str = "database";
const ARG_INGEST_FILE: &str = "file";
const ARG_GEOCODER_URL: &str = "geocoder-url";
const ARG_USER_AGENT: &str = "user-agent";
const ARG_TIMEOUT_SECS: &str = "timeout-secs";
const ARG_PACING_MS: &str = "pacing-ms";
const ARG_RETRIES: &str = "retries";
const ARG_COURSE: &str = "course";
const ARG_OUTPUT: &str = "output";
const ARG_IDS: &str = "ids";
const ENV_INGEST_FILE: &str = "COURSEPLAN_CMDS_INGEST_FILE";
const ENV_ASSIGN_IDS: &str = "COURSEPLAN_CMDS_ASSIGN_IDS";
const ENV_ASSIGN_COURSE: &str = "COURSEPLAN_CMDS_ASSIGN_COURSE";

/// Run the Courseplan CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Ingest(args) => run_ingest_with(args, writer),
        Command::Geocode(args) => run_geocode(args, writer),
        Command::Export(args) => run_export_with(args, writer),
        Command::List(args) => run_list_with(args, writer),
        Command::Assign(args) => run_assign_with(args, writer),
        Command::Summary(args) => run_summary_with(args, writer),
        Command::Courses(args) => run_courses_with(args, writer),
    }
}

/// Write `value` as pretty-printed JSON followed by a newline.
fn write_json<T>(writer: &mut dyn Write, value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

/// Install the stderr log formatter.
///
/// The filter defaults to `info` and honours `RUST_LOG`. Records emitted
/// through the `log` facade by the library crates are captured as well.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A second initialisation (e.g. from tests) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Debug, Parser)]
#[command(
    name = "courseplan",
    about = "Manage delivery courses: import, geocode, edit, summarise and export",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replace every stored delivery record with the rows of a CSV file.
    Ingest(IngestArgs),
    /// Resolve coordinates for records that have none.
    Geocode(GeocodeArgs),
    /// Write stored records as CSV.
    Export(ExportArgs),
    /// Print stored records as JSON.
    List(ListArgs),
    /// Move records to another course.
    Assign(AssignArgs),
    /// Print per-course delivery counts and sales.
    Summary(SummaryArgs),
    /// Print the distinct course labels.
    Courses(CoursesArgs),
}

#[cfg(test)]
mod tests;
