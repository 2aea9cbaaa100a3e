//! SQLite-backed delivery store.

use std::{
    fmt,
    path::{Path, PathBuf},
    time::Duration,
};

use geo::Coord;
use rusqlite::{Connection, Row, params_from_iter, types::Value};
use thiserror::Error;

use crate::{CourseSummary, DeliveryPoint, DeliveryRecord};

use super::{DeliveryStore, StoreError};

/// SQLite limits bound parameters per statement to 999 by default. Course
/// updates chunk their `IN` lists to stay below that ceiling, reserving one
/// slot for the course label.
const SQLITE_MAX_VARIABLE_NUMBER: usize = 999;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS delivery_points (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        course_number TEXT NOT NULL,
        customer_name TEXT NOT NULL,
        customer_code TEXT NOT NULL,
        address TEXT NOT NULL,
        sales REAL NOT NULL DEFAULT 0,
        latitude REAL,
        longitude REAL,
        created_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER)),
        updated_at INTEGER NOT NULL DEFAULT (CAST(strftime('%s', 'now') AS INTEGER))
    );
    CREATE INDEX IF NOT EXISTS delivery_points_course_idx
        ON delivery_points (course_number, id);
";

const SELECT_RECORD: &str = "SELECT id, course_number, customer_name, customer_code, address, \
     sales, latitude, longitude, created_at, updated_at FROM delivery_points";

/// Errors raised while opening a [`SqliteDeliveryStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path}: {source}")]
    OpenDatabase {
        /// Location of the SQLite database on disk.
        path: PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Configuring the connection or creating the schema failed.
    #[error("failed to initialise delivery schema: {source}")]
    InitialiseSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        Self::backend("open delivery database", error)
    }
}

/// Delivery store persisted in a single SQLite table.
///
/// The store owns its connection; dropping the store closes it, and any
/// transaction abandoned on an error path rolls back when dropped.
pub struct SqliteDeliveryStore {
    connection: Connection,
}

impl fmt::Debug for SqliteDeliveryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteDeliveryStore")
            .field("path", &self.connection.path())
            .finish_non_exhaustive()
    }
}

impl SqliteDeliveryStore {
    /// Open (or create) the database at `path` and ensure the schema exists.
    pub fn open<P>(path: P) -> Result<Self, SqliteStoreError>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let connection =
            Connection::open(path).map_err(|source| SqliteStoreError::OpenDatabase {
                path: path.to_path_buf(),
                source,
            })?;
        Self::initialise(connection)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteStoreError::OpenDatabase {
                path: PathBuf::from(":memory:"),
                source,
            })?;
        Self::initialise(connection)
    }

    fn initialise(connection: Connection) -> Result<Self, SqliteStoreError> {
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|source| SqliteStoreError::InitialiseSchema { source })?;
        connection
            .execute_batch(SCHEMA)
            .map_err(|source| SqliteStoreError::InitialiseSchema { source })?;
        Ok(Self { connection })
    }

    fn query_records(
        &self,
        sql: &str,
        params: &[Value],
        operation: &'static str,
    ) -> Result<Vec<DeliveryRecord>, StoreError> {
        let mut statement = self
            .connection
            .prepare_cached(sql)
            .map_err(|source| StoreError::backend(operation, source))?;
        let rows = statement
            .query_map(params_from_iter(params.iter()), read_record)
            .map_err(|source| StoreError::backend(operation, source))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::backend(operation, source))
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }
}

fn read_record(row: &Row<'_>) -> rusqlite::Result<DeliveryRecord> {
    let latitude: Option<f64> = row.get(6)?;
    let longitude: Option<f64> = row.get(7)?;
    // A row holding only one coordinate is treated as not geocoded.
    let location = match (latitude, longitude) {
        (Some(lat), Some(lon)) => Some(Coord { x: lon, y: lat }),
        _ => None,
    };
    Ok(DeliveryRecord {
        id: row.get(0)?,
        point: DeliveryPoint {
            course_number: row.get(1)?,
            customer_name: row.get(2)?,
            customer_code: row.get(3)?,
            address: row.get(4)?,
            sales: row.get(5)?,
        },
        location,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

/// SQLite row ids are signed; larger values cannot name a stored row.
fn to_sql_id(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

impl DeliveryStore for SqliteDeliveryStore {
    fn list_all(&self) -> Result<Vec<DeliveryRecord>, StoreError> {
        let sql = format!("{SELECT_RECORD} ORDER BY course_number, id");
        self.query_records(&sql, &[], "list delivery records")
    }

    fn list_course(&self, course_number: &str) -> Result<Vec<DeliveryRecord>, StoreError> {
        let sql = format!("{SELECT_RECORD} WHERE course_number = ?1 ORDER BY id");
        self.query_records(
            &sql,
            &[Value::Text(course_number.to_owned())],
            "list course records",
        )
    }

    fn list_missing_coordinates(&self) -> Result<Vec<DeliveryRecord>, StoreError> {
        let sql = format!("{SELECT_RECORD} WHERE latitude IS NULL OR longitude IS NULL ORDER BY id");
        self.query_records(&sql, &[], "list records missing coordinates")
    }

    fn replace_all(&mut self, points: &[DeliveryPoint]) -> Result<usize, StoreError> {
        let transaction = self
            .connection
            .transaction()
            .map_err(|source| StoreError::backend("begin replacement transaction", source))?;

        transaction
            .execute("DELETE FROM delivery_points", [])
            .map_err(|source| StoreError::backend("clear delivery records", source))?;

        {
            let mut insert = transaction
                .prepare_cached(
                    "INSERT INTO delivery_points (
                        course_number,
                        customer_name,
                        customer_code,
                        address,
                        sales
                    ) VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|source| StoreError::backend("prepare delivery insert", source))?;
            for point in points {
                insert
                    .execute((
                        point.course_number.as_str(),
                        point.customer_name.as_str(),
                        point.customer_code.as_str(),
                        point.address.as_str(),
                        point.sales,
                    ))
                    .map_err(|source| StoreError::backend("insert delivery point", source))?;
            }
        }

        transaction
            .commit()
            .map_err(|source| StoreError::backend("commit replacement transaction", source))?;
        Ok(points.len())
    }

    fn update_coordinates(&mut self, id: u64, location: Coord<f64>) -> Result<(), StoreError> {
        let sql_id = to_sql_id(id).ok_or(StoreError::RecordNotFound { id })?;
        let changed = self
            .connection
            .execute(
                "UPDATE delivery_points
                 SET latitude = ?1,
                     longitude = ?2,
                     updated_at = CAST(strftime('%s', 'now') AS INTEGER)
                 WHERE id = ?3",
                (location.y, location.x, sql_id),
            )
            .map_err(|source| StoreError::backend("update coordinates", source))?;
        if changed == 0 {
            return Err(StoreError::RecordNotFound { id });
        }
        Ok(())
    }

    fn update_course_number(
        &mut self,
        ids: &[u64],
        course_number: &str,
    ) -> Result<usize, StoreError> {
        let mut unique: Vec<i64> = ids.iter().copied().filter_map(to_sql_id).collect();
        unique.sort_unstable();
        unique.dedup();

        let transaction = self
            .connection
            .transaction()
            .map_err(|source| StoreError::backend("begin course update", source))?;

        let mut changed = 0;
        for chunk in unique.chunks(SQLITE_MAX_VARIABLE_NUMBER - 1) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!(
                "UPDATE delivery_points
                 SET course_number = ?,
                     updated_at = CAST(strftime('%s', 'now') AS INTEGER)
                 WHERE id IN ({placeholders})"
            );
            let mut params = Vec::with_capacity(chunk.len() + 1);
            params.push(Value::Text(course_number.to_owned()));
            params.extend(chunk.iter().copied().map(Value::Integer));
            changed += transaction
                .execute(&sql, params_from_iter(params.iter()))
                .map_err(|source| StoreError::backend("update course number", source))?;
        }

        transaction
            .commit()
            .map_err(|source| StoreError::backend("commit course update", source))?;
        Ok(changed)
    }

    fn aggregate_by_course(&self) -> Result<Vec<CourseSummary>, StoreError> {
        let operation = "aggregate courses";
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT course_number, COUNT(*), COALESCE(SUM(sales), 0.0)
                 FROM delivery_points
                 GROUP BY course_number
                 ORDER BY course_number",
            )
            .map_err(|source| StoreError::backend(operation, source))?;
        let rows = statement
            .query_map([], |row| {
                Ok(CourseSummary {
                    course_number: row.get(0)?,
                    delivery_count: row.get(1)?,
                    total_sales: row.get(2)?,
                })
            })
            .map_err(|source| StoreError::backend(operation, source))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::backend(operation, source))
    }

    fn list_courses(&self) -> Result<Vec<String>, StoreError> {
        let operation = "list courses";
        let mut statement = self
            .connection
            .prepare_cached(
                "SELECT DISTINCT course_number FROM delivery_points ORDER BY course_number",
            )
            .map_err(|source| StoreError::backend(operation, source))?;
        let rows = statement
            .query_map([], |row| row.get(0))
            .map_err(|source| StoreError::backend(operation, source))?;
        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::backend(operation, source))
    }
}
