//! Step definitions for auto-promotion scenarios.

pub mod given;
pub mod then;
pub mod when;
