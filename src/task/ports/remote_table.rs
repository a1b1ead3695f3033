//! Port for whole-table access to the backing worksheet.

use crate::task::domain::RawTable;
use async_trait::async_trait;
use std::{fmt, sync::Arc};
use thiserror::Error;

/// Result type for remote table operations.
pub type RemoteTableResult<T> = Result<T, RemoteTableError>;

/// Whole-table worksheet contract.
///
/// The remote offers no row-level writes and no atomicity: a failed
/// [`RemoteTable::write_all`] may leave the worksheet stale or partially
/// written.
#[async_trait]
pub trait RemoteTable: Send + Sync {
    /// Reads every row of the worksheet without caching.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteTableError::MissingTable`] when the worksheet does
    /// not exist, [`RemoteTableError::Transient`] for failures expected to
    /// clear on retry and [`RemoteTableError::Persistence`] otherwise.
    async fn read_all(&self) -> RemoteTableResult<RawTable>;

    /// Replaces the whole worksheet with `table`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteTableError::Transient`] for failures expected to
    /// clear on retry and [`RemoteTableError::Persistence`] otherwise.
    async fn write_all(&self, table: &RawTable) -> RemoteTableResult<()>;
}

/// Failure classes that are retried automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientKind {
    /// The service rejected the call for exceeding a request rate.
    RateLimited,
    /// The caller's quota is used up for the current window.
    ResourceExhausted,
    /// The service is temporarily unreachable or overloaded.
    Unavailable,
}

impl TransientKind {
    /// Returns a short, stable label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "rate_limited",
            Self::ResourceExhausted => "resource_exhausted",
            Self::Unavailable => "unavailable",
        }
    }
}

impl fmt::Display for TransientKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by remote table implementations.
#[derive(Debug, Clone, Error)]
pub enum RemoteTableError {
    /// The named worksheet does not exist.
    #[error("worksheet '{0}' does not exist")]
    MissingTable(String),

    /// A failure expected to clear on retry.
    #[error("transient remote failure ({kind}): {message}")]
    Transient {
        /// Failure class.
        kind: TransientKind,
        /// Detail reported by the remote.
        message: String,
    },

    /// Any other remote failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RemoteTableError {
    /// Builds a transient failure.
    #[must_use]
    pub fn transient(kind: TransientKind, message: impl Into<String>) -> Self {
        Self::Transient {
            kind,
            message: message.into(),
        }
    }

    /// Wraps a persistence error.
    #[must_use]
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Returns the transient class, or `None` for errors that must not be
    /// retried.
    #[must_use]
    pub const fn transient_kind(&self) -> Option<TransientKind> {
        match self {
            Self::Transient { kind, .. } => Some(*kind),
            Self::MissingTable(_) | Self::Persistence(_) => None,
        }
    }
}
