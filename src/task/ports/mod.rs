//! Port contracts for the task tracker.
//!
//! Ports define infrastructure-agnostic interfaces used by task services.

pub mod remote_table;

pub use remote_table::{RemoteTable, RemoteTableError, RemoteTableResult, TransientKind};
