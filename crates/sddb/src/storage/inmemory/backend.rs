//! In-memory backend implementation.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use sddb_core::record::{Lookup, PrimaryKey, Record, ID_FIELD, OWNER_FIELD};
use sddb_core::storage::{
    Backend, BackendError, ListRequest, PutItemRequest, ReadRequest, Result, TableSchema,
    UpdateItemRequest,
};

/// Sort position of an item: (partition key, sort key).
type ItemKey = (String, String);

#[derive(Debug, Clone)]
struct MemoryTable {
    schema: TableSchema,
    items: BTreeMap<ItemKey, Record>,
}

impl MemoryTable {
    fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            items: BTreeMap::new(),
        }
    }

    /// Reads the primary key of an item from the attributes the schema names.
    fn key_of(&self, item: &Record) -> Result<ItemKey> {
        let partition = key_value(item, &self.schema.partition_key.name)?;
        let sort = match &self.schema.sort_key {
            Some(sort_key) => key_value(item, &sort_key.name)?,
            None => String::new(),
        };
        Ok((partition, sort))
    }

    fn key_for(&self, key: &PrimaryKey) -> Result<ItemKey> {
        self.key_of(&key_record(key))
    }

    /// Items of one partition in sort-key order.
    fn partition<'a>(&'a self, owner: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.items
            .range((owner.to_string(), String::new())..)
            .take_while(move |((partition, _), _)| partition == owner)
            .map(|(_, item)| item)
    }

    fn check_index(&self, index_name: &str) -> Result<()> {
        if self.schema.index.name != index_name {
            return Err(validation(format!(
                "The table does not have the specified index: {index_name}"
            ))
            .into());
        }
        Ok(())
    }
}

/// In-memory storage backend.
///
/// Honours the same table-existence, key, index and condition semantics as
/// DynamoDB, so a `Store` behaves identically on top of it. Clones share the
/// same tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    tables: Arc<RwLock<HashMap<String, MemoryTable>>>,
}

impl InMemoryBackend {
    /// Creates a new backend without any table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema the table was created with, if it exists.
    pub async fn schema(&self, table_name: &str) -> Option<TableSchema> {
        let tables = self.tables.read().await;
        tables.get(table_name).map(|table| table.schema.clone())
    }

    /// Number of items stored in the table, if it exists.
    pub async fn item_count(&self, table_name: &str) -> Option<usize> {
        let tables = self.tables.read().await;
        tables.get(table_name).map(|table| table.items.len())
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn get(&self, request: &ReadRequest) -> Result<Option<Record>> {
        let tables = self.tables.read().await;
        let table = table(&tables, &request.table_name)?;

        let item = match &request.lookup {
            Lookup::Item(key) => table.items.get(&table.key_for(key)?),
            Lookup::Index { index_name, id } => {
                table.check_index(index_name)?;
                let attribute = &table.schema.index.partition_key.name;
                table.items.values().find(|item| {
                    item.get(attribute).and_then(Value::as_str) == Some(id.as_str())
                })
            }
            Lookup::Partition { owner } => table.partition(owner).next(),
        };

        Ok(item.map(|item| project(item, request.projection.as_deref())))
    }

    async fn list(&self, request: &ListRequest) -> Result<Vec<Record>> {
        let tables = self.tables.read().await;
        let table = table(&tables, &request.table_name)?;
        let prefix = request.id_prefix.as_deref().unwrap_or_default();

        Ok(table
            .partition(&request.owner)
            .filter(|item| {
                item.get(ID_FIELD)
                    .and_then(Value::as_str)
                    .is_some_and(|id| id.starts_with(prefix))
            })
            .map(|item| project(item, request.projection.as_deref()))
            .collect())
    }

    async fn update(&self, request: &UpdateItemRequest) -> Result<Record> {
        let mut tables = self.tables.write().await;
        let table = table_mut(&mut tables, &request.table_name)?;
        let key = table.key_for(&request.key)?;

        // A missing item is created from its key and reports no old attributes.
        let previous = table.items.get(&key).cloned().unwrap_or_default();
        let item = table
            .items
            .entry(key)
            .or_insert_with(|| key_record(&request.key));
        request.update.apply_to(item);

        Ok(previous)
    }

    async fn put(&self, request: &PutItemRequest) -> Result<()> {
        let mut tables = self.tables.write().await;
        let table = table_mut(&mut tables, &request.table_name)?;
        let key = table.key_of(&request.item)?;

        if request.create_only && table.items.contains_key(&key) {
            return Err(
                BackendError::ConditionFailed("The conditional request failed".to_string()).into(),
            );
        }

        table.items.insert(key, request.item.clone());
        Ok(())
    }

    async fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.contains_key(&schema.table_name) {
            return Err(BackendError::AlreadyExists(format!(
                "Table already exists: {}",
                schema.table_name
            ))
            .into());
        }
        tables.insert(schema.table_name.clone(), MemoryTable::new(schema.clone()));
        Ok(())
    }
}

fn table<'a>(tables: &'a HashMap<String, MemoryTable>, name: &str) -> Result<&'a MemoryTable> {
    tables.get(name).ok_or_else(|| not_found().into())
}

fn table_mut<'a>(
    tables: &'a mut HashMap<String, MemoryTable>,
    name: &str,
) -> Result<&'a mut MemoryTable> {
    tables.get_mut(name).ok_or_else(|| not_found().into())
}

fn not_found() -> BackendError {
    BackendError::ResourceNotFound("Requested resource not found".to_string())
}

fn validation(message: impl Into<String>) -> BackendError {
    BackendError::rejected("ValidationException", message)
}

fn key_value(item: &Record, name: &str) -> Result<String> {
    match item.get(name) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        Some(Value::String(_)) => Err(validation(format!(
            "One or more parameter values are not valid. The AttributeValue for a key \
             attribute cannot contain an empty string value. Key: {name}"
        ))
        .into()),
        Some(_) => Err(validation(format!(
            "One or more parameter values were invalid: Type mismatch for key {name}"
        ))
        .into()),
        None => Err(validation(format!(
            "One or more parameter values were invalid: Missing the key {name} in the item"
        ))
        .into()),
    }
}

fn key_record(key: &PrimaryKey) -> Record {
    Record::from_iter([
        (OWNER_FIELD.to_string(), Value::String(key.owner.clone())),
        (ID_FIELD.to_string(), Value::String(key.id.clone())),
    ])
}

/// Keeps only the comma-separated top-level attributes named by the projection.
fn project(item: &Record, projection: Option<&str>) -> Record {
    match projection {
        None => item.clone(),
        Some(projection) => {
            let names: Vec<&str> = projection.split(',').map(str::trim).collect();
            item.iter()
                .filter(|(name, _)| names.contains(&name.as_str()))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sddb_core::record::compile_update;
    use sddb_core::storage::StoreError;
    use serde_json::json;

    const TABLE: &str = "data";
    const INDEX: &str = "gsi1-id";

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    fn key(owner: &str, id: &str) -> PrimaryKey {
        PrimaryKey {
            owner: owner.to_string(),
            id: id.to_string(),
        }
    }

    async fn backend_with_table() -> InMemoryBackend {
        let backend = InMemoryBackend::new();
        backend
            .create_table(&TableSchema::for_table(TABLE, INDEX))
            .await
            .unwrap();
        backend
    }

    async fn put(backend: &InMemoryBackend, item: Value) {
        backend
            .put(&PutItemRequest::new(TABLE, record(item)))
            .await
            .unwrap();
    }

    // ==================== Table Tests ====================

    #[tokio::test]
    async fn test_create_table_twice_fails() {
        let backend = backend_with_table().await;
        let result = backend
            .create_table(&TableSchema::for_table(TABLE, "other-index"))
            .await;

        assert!(matches!(
            result,
            Err(StoreError::Backend(BackendError::AlreadyExists(_)))
        ));
        assert_eq!(backend.schema(TABLE).await.unwrap().index.name, INDEX);
    }

    #[tokio::test]
    async fn test_missing_table_is_not_found() {
        let backend = InMemoryBackend::new();
        let request = ReadRequest::new(TABLE, Lookup::Item(key("konsumer", "abc")));

        assert!(matches!(
            backend.get(&request).await,
            Err(StoreError::Backend(BackendError::ResourceNotFound(_)))
        ));
    }

    // ==================== Read Tests ====================

    #[tokio::test]
    async fn test_get_item_and_index() {
        let backend = backend_with_table().await;
        put(&backend, json!({"owner": "konsumer", "id": "Book|abc", "title": "Dune"})).await;

        let by_key = backend
            .get(&ReadRequest::new(
                TABLE,
                Lookup::Item(key("konsumer", "Book|abc")),
            ))
            .await
            .unwrap();
        assert_eq!(by_key.unwrap()["title"], "Dune");

        let by_index = backend
            .get(&ReadRequest::new(
                TABLE,
                Lookup::Index {
                    index_name: INDEX.to_string(),
                    id: "Book|abc".to_string(),
                },
            ))
            .await
            .unwrap();
        assert_eq!(by_index.unwrap()["owner"], "konsumer");
    }

    #[tokio::test]
    async fn test_unknown_index_is_rejected() {
        let backend = backend_with_table().await;
        let request = ReadRequest::new(
            TABLE,
            Lookup::Index {
                index_name: "gsi2".to_string(),
                id: "abc".to_string(),
            },
        );

        match backend.get(&request).await {
            Err(StoreError::Backend(BackendError::Rejected { code, .. })) => {
                assert_eq!(code, "ValidationException");
            }
            other => panic!("expected a validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_partition_returns_first_in_sort_order() {
        let backend = backend_with_table().await;
        put(&backend, json!({"owner": "konsumer", "id": "b"})).await;
        put(&backend, json!({"owner": "konsumer", "id": "a"})).await;
        put(&backend, json!({"owner": "other", "id": "0"})).await;

        let root = backend
            .get(&ReadRequest::new(
                TABLE,
                Lookup::Partition {
                    owner: "konsumer".to_string(),
                },
            ))
            .await
            .unwrap();
        assert_eq!(root.unwrap()["id"], "a");

        let missing = backend
            .get(&ReadRequest::new(
                TABLE,
                Lookup::Partition {
                    owner: "nobody".to_string(),
                },
            ))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_projection() {
        let backend = backend_with_table().await;
        put(&backend, json!({"owner": "konsumer", "id": "abc", "a": 1, "b": 2})).await;

        let mut request = ReadRequest::new(TABLE, Lookup::Item(key("konsumer", "abc")));
        request.projection = Some("id, b".to_string());

        let item = backend.get(&request).await.unwrap().unwrap();
        assert_eq!(Value::Object(item), json!({"id": "abc", "b": 2}));
    }

    #[tokio::test]
    async fn test_list_filters_by_prefix() {
        let backend = backend_with_table().await;
        put(&backend, json!({"owner": "konsumer", "id": "Book|2"})).await;
        put(&backend, json!({"owner": "konsumer", "id": "Book|1"})).await;
        put(&backend, json!({"owner": "konsumer", "id": "Movie|1"})).await;
        put(&backend, json!({"owner": "other", "id": "Book|3"})).await;

        let all = backend
            .list(&ListRequest::new(TABLE, "konsumer"))
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let books = backend
            .list(&ListRequest::new(TABLE, "konsumer").with_id_prefix(Some("Book|".to_string())))
            .await
            .unwrap();
        let ids: Vec<&str> = books.iter().filter_map(|b| b["id"].as_str()).collect();
        assert_eq!(ids, vec!["Book|1", "Book|2"]);
    }

    // ==================== Write Tests ====================

    #[tokio::test]
    async fn test_put_guard() {
        let backend = backend_with_table().await;
        put(&backend, json!({"owner": "konsumer", "id": "abc", "v": 1})).await;

        let again = PutItemRequest::new(
            TABLE,
            record(json!({"owner": "konsumer", "id": "abc", "v": 2})),
        );
        assert!(matches!(
            backend.put(&again).await,
            Err(StoreError::Backend(BackendError::ConditionFailed(_)))
        ));

        let mut overwrite = again;
        overwrite.create_only = false;
        backend.put(&overwrite).await.unwrap();

        let item = backend
            .get(&ReadRequest::new(TABLE, Lookup::Item(key("konsumer", "abc"))))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item["v"], 2);
    }

    #[tokio::test]
    async fn test_put_without_key_is_rejected() {
        let backend = backend_with_table().await;
        let request = PutItemRequest::new(TABLE, record(json!({"owner": "konsumer"})));

        assert!(matches!(
            backend.put(&request).await,
            Err(StoreError::Backend(BackendError::Rejected { .. }))
        ));
        assert_eq!(backend.item_count(TABLE).await, Some(0));
    }

    #[tokio::test]
    async fn test_update_returns_previous_attributes() {
        let backend = backend_with_table().await;
        put(&backend, json!({"owner": "konsumer", "id": "abc", "a": 1})).await;

        let update = compile_update(&record(json!({"b": 2})));
        let previous = backend
            .update(&UpdateItemRequest::new(TABLE, key("konsumer", "abc"), update))
            .await
            .unwrap();
        assert_eq!(
            Value::Object(previous),
            json!({"owner": "konsumer", "id": "abc", "a": 1})
        );

        let item = backend
            .get(&ReadRequest::new(TABLE, Lookup::Item(key("konsumer", "abc"))))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            Value::Object(item),
            json!({"owner": "konsumer", "id": "abc", "a": 1, "b": 2})
        );
    }

    #[tokio::test]
    async fn test_update_creates_missing_item() {
        let backend = backend_with_table().await;

        let update = compile_update(&record(json!({"a": 1})));
        let previous = backend
            .update(&UpdateItemRequest::new(TABLE, key("konsumer", "new"), update))
            .await
            .unwrap();
        assert!(previous.is_empty());
        assert_eq!(backend.item_count(TABLE).await, Some(1));
    }
}
