//! In-memory storage backend for testing.
//!
//! Tables live in `BTreeMap`s wrapped in `Arc<RwLock<_>>`, so partition reads
//! come back in sort-key order. Nothing is persisted.
//!
//! # Example
//!
//! ```rust,ignore
//! use sddb::storage::inmemory::InMemoryBackend;
//! use sddb::Store;
//!
//! let store = Store::new(InMemoryBackend::new(), "data");
//! store.ensure_setup(&Default::default()).await?;
//! ```

mod backend;

pub use backend::InMemoryBackend;
