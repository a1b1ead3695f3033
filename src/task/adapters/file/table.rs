//! File-backed implementation of the remote table port.
//!
//! Each worksheet is stored as `<worksheet>.json` inside a directory opened
//! through capability-based filesystem access. Writes go to a staging file
//! that is renamed over the worksheet, so readers never observe a
//! half-written table.

use crate::task::{
    domain::RawTable,
    ports::{RemoteTable, RemoteTableError, RemoteTableResult, TransientKind},
};
use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8::Dir};
use std::io;

/// Worksheet stored as a JSON file.
#[derive(Debug)]
pub struct FileRemoteTable {
    dir: Dir,
    worksheet: String,
    file_name: String,
}

impl FileRemoteTable {
    /// Opens the worksheet `worksheet` inside `root`, creating the directory
    /// when it does not exist. The worksheet file itself is not created
    /// until the first write.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the worksheet name is not a plain file
    /// name or the directory cannot be created or opened.
    pub fn open(root: &Utf8Path, worksheet: impl Into<String>) -> io::Result<Self> {
        let name = worksheet.into();
        if name.is_empty() || name.contains(['/', '\\']) || name.starts_with('.') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid worksheet name '{name}'"),
            ));
        }
        Dir::create_ambient_dir_all(root, ambient_authority())?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        Ok(Self {
            dir,
            file_name: format!("{name}.json"),
            worksheet: name,
        })
    }

    /// Returns the worksheet name.
    #[must_use]
    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }

    fn staging_name(&self) -> String {
        format!("{}.tmp", self.file_name)
    }
}

#[async_trait]
impl RemoteTable for FileRemoteTable {
    async fn read_all(&self) -> RemoteTableResult<RawTable> {
        match self.dir.read_to_string(&self.file_name) {
            Ok(contents) => serde_json::from_str(&contents).map_err(RemoteTableError::persistence),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(RemoteTableError::MissingTable(self.worksheet.clone()))
            }
            Err(err) => Err(classify_io_error(err)),
        }
    }

    async fn write_all(&self, table: &RawTable) -> RemoteTableResult<()> {
        let payload = serde_json::to_string_pretty(table).map_err(RemoteTableError::persistence)?;
        let staging = self.staging_name();
        self.dir
            .write(&staging, payload)
            .map_err(classify_io_error)?;
        self.dir
            .rename(&staging, &self.dir, &self.file_name)
            .map_err(classify_io_error)
    }
}

fn classify_io_error(err: io::Error) -> RemoteTableError {
    match err.kind() {
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => {
            RemoteTableError::transient(TransientKind::Unavailable, err.to_string())
        }
        _ => RemoteTableError::persistence(err),
    }
}
