//! File-backed slot storage.
//! Each slot is one file under a root directory, replaced atomically on write.

pub mod file_slot_store;
