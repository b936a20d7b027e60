use crate::db::value::{ResultSet, Row, SqlValue};
use rusqlite::{Batch, Connection, OpenFlags};
use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The database file could not be opened.
    ConnectionError(String),
    /// SQLite refused the statement: syntax error, unknown table or column, ...
    OperationalError(String),
    /// The statement would modify a database opened read-only.
    Rejected(String),
    UnexpectedError(String),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::ConnectionError(msg) => write!(f, "Database connection error: {}", msg),
            QueryError::OperationalError(msg) => write!(f, "SQL error: {}", msg),
            QueryError::Rejected(msg) => write!(f, "Statement rejected: {}", msg),
            QueryError::UnexpectedError(msg) => write!(f, "Unexpected database error: {}", msg),
        }
    }
}

impl Error for QueryError {}

impl From<rusqlite::Error> for QueryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, _)
            | rusqlite::Error::SqlInputError { .. }
            | rusqlite::Error::MultipleStatement => QueryError::OperationalError(err.to_string()),
            other => QueryError::UnexpectedError(other.to_string()),
        }
    }
}

/// Runs SQL text against one SQLite file, opening a fresh connection for
/// every statement and closing it before returning.
#[derive(Debug, Clone)]
pub struct QueryExecutor {
    path: PathBuf,
    read_only: bool,
}

impl QueryExecutor {
    pub fn new(path: impl Into<PathBuf>, read_only: bool) -> Self {
        Self {
            path: path.into(),
            read_only,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Executes exactly one statement and fetches all of its rows. Text
    /// holding more than one statement is refused before anything runs.
    ///
    /// The statement runs inside a transaction that is committed after the
    /// rows are fetched; on failure it is rolled back. Failures are logged
    /// here and returned so callers can tell "no rows" from "failed".
    pub fn execute(&self, sql: &str) -> Result<ResultSet, QueryError> {
        debug!("Executing SQL against {}: {}", self.path.display(), sql);

        match self.run(sql) {
            Ok(result_set) => {
                info!("Query returned {} rows", result_set.len());
                for row in &result_set.rows {
                    debug!("{}", row);
                }
                Ok(result_set)
            }
            Err(QueryError::OperationalError(msg)) => {
                error!("OperationalError: {}", msg);
                Err(QueryError::OperationalError(msg))
            }
            Err(e) => {
                error!("An error occurred: {}", e);
                Err(e)
            }
        }
    }

    /// Like [`execute`](Self::execute), but any failure yields an empty
    /// result set.
    pub fn execute_or_empty(&self, sql: &str) -> ResultSet {
        self.execute(sql).unwrap_or_default()
    }

    /// Runs [`execute`](Self::execute) on the blocking thread pool.
    pub async fn execute_blocking(&self, sql: String) -> Result<ResultSet, QueryError> {
        let executor = self.clone();
        tokio::task::spawn_blocking(move || executor.execute(&sql))
            .await
            .map_err(|e| QueryError::UnexpectedError(format!("Database task failed: {}", e)))?
    }

    fn open(&self) -> Result<Connection, QueryError> {
        // Never create the file: a wrong path should fail, not produce an empty database
        let access = if self.read_only {
            OpenFlags::SQLITE_OPEN_READ_ONLY
        } else {
            OpenFlags::SQLITE_OPEN_READ_WRITE
        };
        let flags = access | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX;

        Connection::open_with_flags(&self.path, flags).map_err(|e| {
            QueryError::ConnectionError(format!("{}: {}", self.path.display(), e))
        })
    }

    fn run(&self, sql: &str) -> Result<ResultSet, QueryError> {
        if sql.trim().is_empty() {
            return Err(QueryError::OperationalError("No SQL statement to execute".to_string()));
        }

        let mut conn = self.open()?;

        let tx = conn.transaction()?;
        let result_set = {
            let mut batch = Batch::new(&tx, sql);
            let Some(mut stmt) = batch.next()? else {
                return Err(QueryError::OperationalError(
                    "No SQL statement to execute".to_string(),
                ));
            };
            if batch.next()?.is_some() {
                return Err(QueryError::OperationalError(
                    "only one statement may be executed at a time".to_string(),
                ));
            }

            if self.read_only && !stmt.readonly() {
                return Err(QueryError::Rejected(
                    "only read-only statements are allowed on this database".to_string(),
                ));
            }

            let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
            let column_count = columns.len();

            let mut rows = stmt.query([])?;
            let mut fetched = Vec::new();
            while let Some(row) = rows.next()? {
                let mut values = Vec::with_capacity(column_count);
                for i in 0..column_count {
                    values.push(SqlValue::from(row.get_ref(i)?));
                }
                fetched.push(Row(values));
            }

            ResultSet {
                columns,
                rows: fetched,
            }
        };
        tx.commit()?;

        conn.close().map_err(|(_, e)| QueryError::from(e))?;
        Ok(result_set)
    }
}
