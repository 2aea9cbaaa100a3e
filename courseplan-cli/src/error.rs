//! Error types emitted by the Courseplan CLI.
//!
//! Every variant maps onto an [`ErrorClass`], which decides the process exit
//! status. Keep variants small: most helpers return `Result<_, CliError>`.

use std::sync::Arc;

use camino::Utf8PathBuf;
use courseplan_core::{CourseEditError, SqliteStoreError, StoreError};
use courseplan_data::geocoding::ResolverBuildError;
use courseplan_data::{EnrichError, IngestError};
use thiserror::Error;

/// Coarse failure category reported through the exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Arguments or configuration could not be interpreted.
    Usage,
    /// Input was rejected before any state changed.
    Validation,
    /// The requested records do not exist.
    NotFound,
    /// The geocoding service could not be reached or set up.
    ExternalService,
    /// A local resource failed: the database, an output file or the runtime.
    Storage,
}

impl ErrorClass {
    /// Process exit status for this class.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Usage => 2,
            Self::Validation => 3,
            Self::NotFound => 4,
            Self::ExternalService => 5,
            Self::Storage => 6,
        }
    }
}

/// Errors emitted by the Courseplan CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// A record id in `--ids` is not an unsigned integer.
    #[error("invalid record id {value:?}")]
    InvalidRecordId { value: String },
    /// The directory holding the database could not be created.
    #[error("failed to create directory for database {path:?}: {source}")]
    CreateDatabaseDir {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Opening the delivery database failed.
    #[error("failed to open delivery database {path:?}: {source}")]
    OpenDatabase {
        path: Utf8PathBuf,
        #[source]
        source: SqliteStoreError,
    },
    /// Importing the CSV upload failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Constructing the geocoder failed.
    #[error("failed to build geocoder for {base_url:?}: {source}")]
    BuildGeocoder {
        base_url: String,
        #[source]
        source: ResolverBuildError,
    },
    /// The async runtime driving the geocoder could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Geocoding enrichment hit a storage failure.
    #[error(transparent)]
    Enrich(#[from] EnrichError),
    /// Reassigning records to a course failed.
    #[error(transparent)]
    CourseEdit(#[from] CourseEditError),
    /// A store query failed.
    #[error("failed to {operation}: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
    /// Writing the CSV export file failed.
    #[error("failed to write export to {path:?}: {source}")]
    WriteExport {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Serializing command output failed.
    #[error("failed to serialize output: {0}")]
    SerializeOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}

impl CliError {
    /// Category used for the exit status.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ArgumentParsing(_)
            | Self::Configuration(_)
            | Self::MissingArgument { .. }
            | Self::InvalidRecordId { .. } => ErrorClass::Usage,
            Self::Ingest(IngestError::NoFile { .. } | IngestError::Parse(_)) => {
                ErrorClass::Validation
            }
            Self::CourseEdit(CourseEditError::EmptySelection | CourseEditError::BlankCourse) => {
                ErrorClass::Validation
            }
            Self::CourseEdit(CourseEditError::NoMatchingRecords { .. })
            | Self::CourseEdit(CourseEditError::Store(StoreError::RecordNotFound { .. }))
            | Self::Store {
                source: StoreError::RecordNotFound { .. },
                ..
            } => ErrorClass::NotFound,
            Self::BuildGeocoder { .. } => ErrorClass::ExternalService,
            Self::Runtime(_)
            | Self::CreateDatabaseDir { .. }
            | Self::OpenDatabase { .. }
            | Self::Ingest(_)
            | Self::Enrich(_)
            | Self::CourseEdit(_)
            | Self::Store { .. }
            | Self::WriteExport { .. }
            | Self::SerializeOutput(_)
            | Self::WriteOutput(_) => ErrorClass::Storage,
        }
    }
}
