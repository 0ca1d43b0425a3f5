use async_trait::async_trait;

use crate::record::Record;

use super::{ListRequest, PutItemRequest, ReadRequest, Result, TableSchema, UpdateItemRequest};

/// Storage engine behind a store.
///
/// Every method is one round trip. Implementations report failures as
/// `StoreError::Backend` and never retry.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Point read, index read or partition root read, depending on the lookup.
    async fn get(&self, request: &ReadRequest) -> Result<Option<Record>>;

    /// Items of one partition, first page only.
    async fn list(&self, request: &ListRequest) -> Result<Vec<Record>>;

    /// Sets the given attributes and returns the attributes stored before.
    async fn update(&self, request: &UpdateItemRequest) -> Result<Record>;

    /// Writes a whole item.
    async fn put(&self, request: &PutItemRequest) -> Result<()>;

    /// Creates the table and its index.
    async fn create_table(&self, schema: &TableSchema) -> Result<()>;
}
