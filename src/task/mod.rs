//! Task tracking over a remote worksheet.
//!
//! A session loads the worksheet into memory, repairs its schema, runs the
//! daily promotion rule once and then applies add, toggle, edit, delete,
//! move and reorder operations, pushing the whole table back after each
//! one. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
