//! Opening the delivery database shared by every subcommand.

use camino::{Utf8Path, Utf8PathBuf};
use courseplan_core::SqliteDeliveryStore;
use log::debug;

use crate::CliError;

/// Database path used when none is configured.
pub(crate) const DEFAULT_DATABASE: &str = "courseplan.db";

/// Resolve an optional database setting to a path.
pub(crate) fn database_path(configured: Option<Utf8PathBuf>) -> Utf8PathBuf {
    configured.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE))
}

/// Open (creating if needed) the delivery database at `path`.
pub(crate) fn open_store(path: &Utf8Path) -> Result<SqliteDeliveryStore, CliError> {
    courseplan_fs::ensure_parent_dir(path).map_err(|source| CliError::CreateDatabaseDir {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("opening delivery database {path}");
    SqliteDeliveryStore::open(path.as_std_path()).map_err(|source| CliError::OpenDatabase {
        path: path.to_path_buf(),
        source,
    })
}
