//! In-memory implementation of the remote table port.

use crate::task::{
    domain::RawTable,
    ports::{RemoteTable, RemoteTableError, RemoteTableResult},
};
use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory worksheet.
///
/// Clones share the same underlying worksheet, so several sessions can be
/// pointed at one table the way several browser tabs share a spreadsheet.
#[derive(Debug, Clone)]
pub struct InMemoryRemoteTable {
    name: String,
    state: Arc<RwLock<Option<RawTable>>>,
}

impl InMemoryRemoteTable {
    /// Creates a handle to a worksheet that does not exist yet.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a handle to a worksheet holding `table`.
    #[must_use]
    pub fn with_table(name: impl Into<String>, table: RawTable) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(RwLock::new(Some(table))),
        }
    }

    /// Returns the worksheet name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of the stored worksheet, or `None` when it does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteTableError::Persistence`] when the lock is poisoned.
    pub fn snapshot(&self) -> RemoteTableResult<Option<RawTable>> {
        let state = self.state.read().map_err(|err| {
            RemoteTableError::persistence(std::io::Error::other(err.to_string()))
        })?;
        Ok(state.clone())
    }
}

#[async_trait]
impl RemoteTable for InMemoryRemoteTable {
    async fn read_all(&self) -> RemoteTableResult<RawTable> {
        self.snapshot()?
            .ok_or_else(|| RemoteTableError::MissingTable(self.name.clone()))
    }

    async fn write_all(&self, table: &RawTable) -> RemoteTableResult<()> {
        let mut state = self.state.write().map_err(|err| {
            RemoteTableError::persistence(std::io::Error::other(err.to_string()))
        })?;
        *state = Some(table.clone());
        Ok(())
    }
}
