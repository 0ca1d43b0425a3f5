//! DynamoDB storage backend.
//!
//! Implements `sddb_core::storage::Backend` using `aws-sdk-dynamodb`. The
//! conversion, expression and schema builders are pure and tested without
//! DynamoDB access.

mod backend;
mod conversions;
mod error;
mod expressions;
mod schema;

pub use backend::DynamoDbBackend;
