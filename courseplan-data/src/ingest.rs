//! Full-replace ingestion of uploaded CSV files.

use std::io::{self, Read};

use camino::{Utf8Path, Utf8PathBuf};
use courseplan_core::{DeliveryStore, StoreError};
use log::info;
use thiserror::Error;

use crate::csv::{CsvImportError, parse_delivery_csv};

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of records now stored.
    pub inserted: usize,
}

/// Errors returned by [`ingest_csv`] and [`read_csv_upload`].
#[derive(Debug, Error)]
pub enum IngestError {
    /// No upload exists at the given path.
    #[error("no CSV file found at {path}")]
    NoFile { path: Utf8PathBuf },
    /// The upload exists but could not be read as UTF-8 text.
    #[error("failed to read CSV file {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// The content was rejected before any write.
    #[error(transparent)]
    Parse(#[from] CsvImportError),
    /// The replacement transaction failed and was rolled back.
    #[error("failed to replace delivery records: {source}")]
    Storage {
        #[source]
        source: StoreError,
    },
}

/// Read an uploaded CSV file as UTF-8 text.
pub fn read_csv_upload(path: &Utf8Path) -> Result<String, IngestError> {
    let mut file = courseplan_fs::open_utf8_file(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            IngestError::NoFile {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let mut content = String::new();
    file.read_to_string(&mut content)
        .map_err(|source| IngestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(content)
}

/// Replace every stored record with the rows parsed from `content`.
///
/// Parsing completes before the store is touched, so validation failures
/// have no side effects. The replacement itself is atomic: if any insert
/// fails the previous records remain.
///
/// # Examples
/// ```
/// use courseplan_core::{DeliveryStore, SqliteDeliveryStore};
/// use courseplan_data::ingest_csv;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = SqliteDeliveryStore::open_in_memory()?;
/// let report = ingest_csv(
///     &mut store,
///     "course_number,customer_name,customer_code,address,sales\n1,Tanaka,C-1,Tokyo,100",
/// )?;
/// assert_eq!(report.inserted, 1);
/// assert_eq!(store.list_all()?.len(), 1);
/// # Ok(())
/// # }
/// ```
pub fn ingest_csv<S>(store: &mut S, content: &str) -> Result<IngestReport, IngestError>
where
    S: DeliveryStore + ?Sized,
{
    let points = parse_delivery_csv(content)?;
    let inserted = store
        .replace_all(&points)
        .map_err(|source| IngestError::Storage { source })?;
    info!("ingested {inserted} delivery records");
    Ok(IngestReport { inserted })
}
