//! Functional core for sddb.
//!
//! Pure data types and pure functions for storing document-style records in a
//! single table keyed by `owner` (partition) and `id` (sort), with a secondary
//! index on `id`. Nothing in this crate performs I/O; the `sddb` crate plugs a
//! concrete [`storage::Backend`] into these pieces.

pub mod record;
pub mod storage;
