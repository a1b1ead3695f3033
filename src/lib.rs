//! Taskmaster: a personal task tracker over a remote worksheet.
//!
//! Tasks carry a label and a priority, can be completed, edited, deleted
//! and reordered, and are stored as rows of a whole-table worksheet. Once
//! per session, incomplete tasks created on an earlier day are escalated to
//! the highest priority.
//!
//! # Architecture
//!
//! Taskmaster follows hexagonal architecture principles:
//!
//! - **Domain**: task rows, schema repair and the promotion rule, with no
//!   infrastructure dependencies
//! - **Ports**: the whole-table worksheet contract
//! - **Adapters**: in-memory and file-backed worksheets
//! - **Services**: retries and the per-session task store
//!
//! # Modules
//!
//! - [`task`]: task domain, ports, adapters and services
//! - [`config`]: deployment configuration

pub mod config;
pub mod task;
