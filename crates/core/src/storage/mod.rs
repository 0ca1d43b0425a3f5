mod error;
mod schema;
mod traits;
mod types;

pub use error::{BackendError, Result, StoreError};
pub use schema::{AttributeType, Capacity, IndexSchema, KeyAttribute, SchemaOverrides, TableSchema};
pub use traits::Backend;
pub use types::{
    GetOutput, ListRequest, PutItemRequest, ReadOverrides, ReadRequest, UpdateItemRequest,
    WriteOverrides,
};
