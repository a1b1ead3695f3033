//! In-memory worksheet adapter.

mod table;

pub use table::InMemoryRemoteTable;
