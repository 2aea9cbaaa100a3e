//! Record listing and course editing subcommands: `list`, `assign`, `courses`.

use camino::Utf8PathBuf;
use clap::Parser;
use courseplan_core::{DeliveryRecord, DeliveryStore, assign_course_batch, course_color};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::database::{database_path, open_store};
use crate::{
    ARG_COURSE, ARG_DATABASE, ARG_IDS, CliError, ENV_ASSIGN_COURSE, ENV_ASSIGN_IDS, write_json,
};

/// CLI arguments for the `list` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print stored records as JSON, ordered by course then id")]
#[ortho_config(prefix = "COURSEPLAN")]
pub(crate) struct ListArgs {
    /// Path to the SQLite delivery database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// List only this course.
    #[arg(long = ARG_COURSE, value_name = "course")]
    #[serde(default)]
    pub(crate) course: Option<String>,
}

/// One record as printed by `list`, with its marker colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct RecordView {
    pub(crate) id: u64,
    pub(crate) course_number: String,
    pub(crate) customer_name: String,
    pub(crate) customer_code: String,
    pub(crate) address: String,
    pub(crate) sales: f64,
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
    pub(crate) color: String,
    pub(crate) created_at: i64,
    pub(crate) updated_at: i64,
}

impl From<&DeliveryRecord> for RecordView {
    fn from(record: &DeliveryRecord) -> Self {
        Self {
            id: record.id,
            course_number: record.point.course_number.clone(),
            customer_name: record.point.customer_name.clone(),
            customer_code: record.point.customer_code.clone(),
            address: record.point.address.clone(),
            sales: record.point.sales,
            latitude: record.latitude(),
            longitude: record.longitude(),
            color: course_color(record.course_number()).to_owned(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

pub(crate) fn run_list_with(args: ListArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let store = open_store(&database_path(merged.database))?;
    let records = match merged.course.as_deref() {
        Some(course) => store.list_course(course),
        None => store.list_all(),
    }
    .map_err(|source| CliError::Store {
        operation: "list delivery records",
        source,
    })?;
    let views: Vec<RecordView> = records.iter().map(RecordView::from).collect();
    write_json(writer, &views)
}

/// CLI arguments for the `assign` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Move one or more records to a course. Ids are given as a \
                 comma-separated list, e.g. --ids 2,5,9. Ids that match no \
                 record are ignored unless none match.",
    about = "Move records to another course"
)]
#[ortho_config(prefix = "COURSEPLAN")]
pub(crate) struct AssignArgs {
    /// Path to the SQLite delivery database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Comma-separated record ids.
    #[arg(long = ARG_IDS, value_name = "ids")]
    #[serde(default)]
    pub(crate) ids: Option<String>,
    /// Target course label.
    #[arg(long = ARG_COURSE, value_name = "course")]
    #[serde(default)]
    pub(crate) course: Option<String>,
}

impl AssignArgs {
    pub(crate) fn into_config(self) -> Result<AssignConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        AssignConfig::try_from(merged)
    }
}

/// Resolved `assign` configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AssignConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) ids: Vec<u64>,
    pub(crate) course: String,
}

impl TryFrom<AssignArgs> for AssignConfig {
    type Error = CliError;

    fn try_from(args: AssignArgs) -> Result<Self, Self::Error> {
        let ids = args.ids.ok_or(CliError::MissingArgument {
            field: ARG_IDS,
            env: ENV_ASSIGN_IDS,
        })?;
        let course = args.course.ok_or(CliError::MissingArgument {
            field: ARG_COURSE,
            env: ENV_ASSIGN_COURSE,
        })?;
        Ok(Self {
            database: database_path(args.database),
            ids: parse_record_ids(&ids)?,
            course,
        })
    }
}

/// Parse a comma-separated id list. Empty items are skipped.
pub(crate) fn parse_record_ids(raw: &str) -> Result<Vec<u64>, CliError> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<u64>().map_err(|_| CliError::InvalidRecordId {
                value: item.to_owned(),
            })
        })
        .collect()
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AssignOutput {
    pub(crate) updated: usize,
    pub(crate) course_number: String,
}

pub(crate) fn run_assign_with(args: AssignArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let mut store = open_store(&config.database)?;
    let updated = assign_course_batch(&mut store, &config.ids, &config.course)?;
    let course_number = config.course.trim().to_owned();
    info!("moved {updated} records to course {course_number}");
    write_json(
        writer,
        &AssignOutput {
            updated,
            course_number,
        },
    )
}

/// CLI arguments for the `courses` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print the distinct course labels with their marker colours")]
#[ortho_config(prefix = "COURSEPLAN")]
pub(crate) struct CoursesArgs {
    /// Path to the SQLite delivery database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct CourseView {
    pub(crate) course_number: String,
    pub(crate) color: String,
}

pub(crate) fn run_courses_with(args: CoursesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let store = open_store(&database_path(merged.database))?;
    let courses = store.list_courses().map_err(|source| CliError::Store {
        operation: "list courses",
        source,
    })?;
    let views: Vec<CourseView> = courses
        .into_iter()
        .map(|course_number| CourseView {
            color: course_color(&course_number).to_owned(),
            course_number,
        })
        .collect();
    write_json(writer, &views)
}
