//! Contains the trait and implementations for the blob store that persists
//! the application state.

pub mod sqlite;

pub use sqlite::SqliteBlobStore;

use crate::Error;

/// A durable string-keyed blob store, one blob per top-level collection.
///
/// This mirrors the shape of a browser's local storage: the state container
/// decides what goes in each blob, the store only moves strings.
pub trait StateStore {
    /// Read the blob stored under `key`, or `None` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<String>, Error>;

    /// Write `value` under `key`, replacing any previous blob.
    fn write(&mut self, key: &str, value: &str) -> Result<(), Error>;

    /// Remove the blob under `key`. Removing an absent key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), Error>;
}
