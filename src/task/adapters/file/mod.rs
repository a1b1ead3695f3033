//! Worksheet adapter backed by JSON files in a local directory.

mod table;

pub use table::FileRemoteTable;
