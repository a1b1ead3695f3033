//! Unit tests for the task tracker.

mod support;
