//! Core abstractions for Tally: the todo list value type and slot storage contracts.
//! This crate is intentionally small to keep dependency surface minimal.

pub mod storage;
pub mod todos;
