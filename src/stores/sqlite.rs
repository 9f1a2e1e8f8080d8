//! Implements a SQLite backed blob store.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{Error, stores::StateStore};

/// Create the blob table if it does not exist yet.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS blob (key TEXT PRIMARY KEY, value TEXT NOT NULL)",
        (),
    )?;

    Ok(())
}

/// Stores state blobs in a single key-value table in a SQLite database.
#[derive(Debug, Clone)]
pub struct SqliteBlobStore {
    connection: Arc<Mutex<Connection>>,
}

impl SqliteBlobStore {
    /// Create a new store for the SQLite `connection`.
    ///
    /// The caller should have run [initialize] on the connection first.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }
}

impl StateStore for SqliteBlobStore {
    fn read(&self, key: &str) -> Result<Option<String>, Error> {
        let connection = self.connection.lock().map_err(|_| Error::StoreLock)?;

        let value = connection
            .prepare("SELECT value FROM blob WHERE key = :key")?
            .query_row(&[(":key", key)], |row| row.get(0));

        match value {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), Error> {
        let connection = self.connection.lock().map_err(|_| Error::StoreLock)?;

        connection.execute(
            "INSERT INTO blob (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            (key, value),
        )?;

        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), Error> {
        let connection = self.connection.lock().map_err(|_| Error::StoreLock)?;

        connection.execute("DELETE FROM blob WHERE key = ?1", (key,))?;

        Ok(())
    }
}
