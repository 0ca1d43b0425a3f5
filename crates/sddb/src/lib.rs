//! SDDB: document-style records with subtables on a single DynamoDB table.
//!
//! Records live in one physical table keyed by `owner` (partition) and `id`
//! (sort), with a secondary index on `id`. A [`Store`] fetches records by
//! owner, by id or by both, applies partial updates, creates records under
//! generated ids, and multiplexes logical subtables onto the table by
//! prefixing ids with `<subtable>|`.
//!
//! ```rust,ignore
//! use sddb::{RecordQuery, SchemaOverrides, Store, StoreConfig};
//!
//! let store = Store::connect(&StoreConfig::from_env()).await;
//! store.ensure_setup(&SchemaOverrides::default()).await?;
//!
//! let books = store.table("Book")?;
//! let record = serde_json::from_value(json!({"owner": "konsumer", "title": "Dune"}))?;
//! let book = books.set(record).await?;
//! let id = book["id"].as_str().unwrap_or_default();
//! let found = books.get(&RecordQuery::by_id(id)).await?;
//! ```

mod config;
pub mod storage;
mod store;

pub use config::StoreConfig;
pub use store::{Store, TableView};

pub use sddb_core::record::{
    CreateRequest, IdGenerator, RandomId, Record, RecordQuery, SetRequest, Subtable,
    UpdateRequest,
};
pub use sddb_core::storage::{
    Backend, BackendError, Capacity, GetOutput, IndexSchema, KeyAttribute, ReadOverrides, Result,
    SchemaOverrides, StoreError, TableSchema, WriteOverrides,
};
