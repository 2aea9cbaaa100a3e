//! `summary` subcommand: per-course delivery counts and sales.

use camino::Utf8PathBuf;
use clap::Parser;
use courseplan_core::{CourseSummary, DeliveryStore, SummaryTotals, course_color};
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::database::{database_path, open_store};
use crate::{ARG_DATABASE, CliError, write_json};

/// CLI arguments for the `summary` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "Print delivery counts and sales per course, with grand totals")]
#[ortho_config(prefix = "COURSEPLAN")]
pub(crate) struct SummaryArgs {
    /// Path to the SQLite delivery database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct CourseSummaryView {
    pub(crate) course_number: String,
    pub(crate) delivery_count: u64,
    pub(crate) total_sales: f64,
    pub(crate) average_sales: Option<f64>,
    pub(crate) color: String,
}

impl From<CourseSummary> for CourseSummaryView {
    fn from(summary: CourseSummary) -> Self {
        Self {
            average_sales: summary.average_sales(),
            color: course_color(&summary.course_number).to_owned(),
            course_number: summary.course_number,
            delivery_count: summary.delivery_count,
            total_sales: summary.total_sales,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct SummaryOutput {
    pub(crate) courses: Vec<CourseSummaryView>,
    pub(crate) totals: SummaryTotals,
}

pub(crate) fn run_summary_with(args: SummaryArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let store = open_store(&database_path(merged.database))?;
    let summaries = store.aggregate_by_course().map_err(|source| CliError::Store {
        operation: "aggregate courses",
        source,
    })?;
    let totals = SummaryTotals::from_summaries(&summaries);
    let output = SummaryOutput {
        courses: summaries.into_iter().map(CourseSummaryView::from).collect(),
        totals,
    };
    write_json(writer, &output)
}
