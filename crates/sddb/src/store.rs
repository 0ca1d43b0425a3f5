//! The public record store.
//!
//! `Store` owns one shared backend handle and turns logical queries and
//! records into single backend requests. `TableView` is a borrowed view of the
//! store with a subtable pre-applied.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use sddb_core::record::{
    compile_update, derive_lookup, merge_update_result, namespaced_id, primary_key, validate_id,
    CreateRequest, IdGenerator, RandomId, Record, RecordQuery, SetRequest, Subtable,
    UpdateRequest, DEFAULT_INDEX_NAME, ID_FIELD, OWNER_FIELD,
};
use sddb_core::storage::{
    Backend, BackendError, GetOutput, ListRequest, PutItemRequest, ReadOverrides, ReadRequest,
    Result, SchemaOverrides, StoreError, TableSchema, UpdateItemRequest, WriteOverrides,
};

#[cfg(feature = "dynamodb")]
use crate::config::StoreConfig;
#[cfg(feature = "dynamodb")]
use crate::storage::DynamoDbBackend;

/// Document-style access to one physical table.
///
/// Clones share the backend handle.
pub struct Store<B> {
    backend: Arc<B>,
    table_name: String,
    index_name: String,
    ids: Arc<dyn IdGenerator>,
}

impl<B> Clone for Store<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            table_name: self.table_name.clone(),
            index_name: self.index_name.clone(),
            ids: Arc::clone(&self.ids),
        }
    }
}

impl<B> fmt::Debug for Store<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("table_name", &self.table_name)
            .field("index_name", &self.index_name)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "dynamodb")]
impl Store<DynamoDbBackend> {
    /// Builds a DynamoDB-backed store from configuration.
    pub async fn connect(config: &StoreConfig) -> Self {
        tracing::info!(
            target_env = %config.target_display(),
            table = %config.table_name,
            "Connecting to DynamoDB"
        );
        let backend = DynamoDbBackend::from_config(config).await;
        Self::new(backend, &config.table_name).with_index_name(&config.index_name)
    }
}

impl<B: Backend> Store<B> {
    pub fn new(backend: B, table_name: impl Into<String>) -> Self {
        Self::from_shared(Arc::new(backend), table_name)
    }

    /// Creates a store over a backend handle that is already shared.
    pub fn from_shared(backend: Arc<B>, table_name: impl Into<String>) -> Self {
        Self {
            backend,
            table_name: table_name.into(),
            index_name: DEFAULT_INDEX_NAME.to_string(),
            ids: Arc::new(RandomId),
        }
    }

    pub fn with_index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = index_name.into();
        self
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// A view of the store scoped to one subtable.
    pub fn table(&self, name: impl Into<String>) -> Result<TableView<'_, B>> {
        Ok(TableView {
            store: self,
            subtable: Subtable::new(name)?,
        })
    }

    /// Fetches one record.
    ///
    /// Owner and id read the item, id alone reads through the secondary index
    /// and owner alone reads the first item of the owner's partition.
    pub async fn get(&self, query: &RecordQuery) -> Result<GetOutput> {
        self.get_with(query, &ReadOverrides::default()).await
    }

    pub async fn get_with(
        &self,
        query: &RecordQuery,
        overrides: &ReadOverrides,
    ) -> Result<GetOutput> {
        let lookup = derive_lookup(query, &self.index_name)?;
        tracing::trace!(shape = lookup.shape(), table = %self.table_name, "Derived lookup");

        let request = ReadRequest::new(&self.table_name, lookup).with_overrides(overrides);
        let item = self.backend.get(&request).await?;

        tracing::debug!(
            table = %request.table_name,
            shape = request.lookup.shape(),
            found = item.is_some(),
            "Fetched record"
        );
        Ok(GetOutput { item })
    }

    /// Creates or updates a record, depending on whether it carries an `id`.
    pub async fn set(&self, record: Record) -> Result<Record> {
        self.set_with(record, &WriteOverrides::default()).await
    }

    pub async fn set_with(&self, record: Record, overrides: &WriteOverrides) -> Result<Record> {
        self.apply(SetRequest::from_record(record)?, overrides).await
    }

    /// Executes an already disambiguated write.
    pub async fn apply(&self, request: SetRequest, overrides: &WriteOverrides) -> Result<Record> {
        self.write(request, None, overrides).await
    }

    /// Items of the owner's partition, first backend page only.
    pub async fn list(&self, owner: &str) -> Result<Vec<Record>> {
        self.list_with(owner, &ReadOverrides::default()).await
    }

    pub async fn list_with(&self, owner: &str, overrides: &ReadOverrides) -> Result<Vec<Record>> {
        self.list_in(owner, None, overrides).await
    }

    /// Creates the table and its secondary index.
    ///
    /// Fails with `BackendError::AlreadyExists` when the table exists; the
    /// existing schema is left untouched.
    pub async fn setup(&self, overrides: &SchemaOverrides) -> Result<()> {
        self.create_table(&self.schema(overrides)).await
    }

    /// Like [`Store::setup`], but an existing table counts as success.
    ///
    /// Returns whether the table was created.
    pub async fn ensure_setup(&self, overrides: &SchemaOverrides) -> Result<bool> {
        let schema = self.schema(overrides);
        match self.create_table(&schema).await {
            Ok(()) => Ok(true),
            Err(StoreError::Backend(BackendError::AlreadyExists(message))) => {
                tracing::warn!(
                    table = %schema.table_name,
                    %message,
                    "Table already exists, skipping"
                );
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    fn schema(&self, overrides: &SchemaOverrides) -> TableSchema {
        TableSchema::for_table(&self.table_name, &self.index_name).merged(overrides)
    }

    async fn create_table(&self, schema: &TableSchema) -> Result<()> {
        self.backend.create_table(schema).await?;

        tracing::info!(
            table = %schema.table_name,
            index = %schema.index.name,
            capacity = ?schema.capacity,
            "Created table"
        );
        Ok(())
    }

    async fn write(
        &self,
        request: SetRequest,
        subtable: Option<&Subtable>,
        overrides: &WriteOverrides,
    ) -> Result<Record> {
        match request {
            SetRequest::Create(request) => self.create(request, subtable, overrides).await,
            SetRequest::Update(request) => self.update(request, subtable, overrides).await,
        }
    }

    async fn create(
        &self,
        request: CreateRequest,
        subtable: Option<&Subtable>,
        overrides: &WriteOverrides,
    ) -> Result<Record> {
        let id = self.ids.generate();
        validate_id(&id)?;

        let mut item = request.attrs.clone();
        item.insert(
            ID_FIELD.to_string(),
            Value::String(namespaced_id(subtable, &id)),
        );
        if let Some(owner) = &request.owner {
            item.insert(OWNER_FIELD.to_string(), Value::String(owner.clone()));
        }

        let put = PutItemRequest::new(&self.table_name, item).with_overrides(overrides);
        self.backend.put(&put).await?;

        tracing::debug!(
            table = %put.table_name,
            owner = ?request.owner,
            id = %id,
            "Created record"
        );

        Ok(with_keys(request.attrs, id, request.owner))
    }

    async fn update(
        &self,
        request: UpdateRequest,
        subtable: Option<&Subtable>,
        overrides: &WriteOverrides,
    ) -> Result<Record> {
        let key = primary_key(request.key_owner(), &request.id, subtable)?;
        let update = compile_update(&request.attrs);
        let fields = update.len();

        let update_request =
            UpdateItemRequest::new(&self.table_name, key, update).with_overrides(overrides);
        let previous = self.backend.update(&update_request).await?;

        tracing::debug!(
            table = %update_request.table_name,
            owner = %update_request.key.owner,
            id = %request.id,
            fields,
            "Updated record"
        );

        let supplied = with_keys(request.attrs, request.id, request.owner);
        Ok(merge_update_result(previous, supplied))
    }

    async fn list_in(
        &self,
        owner: &str,
        subtable: Option<&Subtable>,
        overrides: &ReadOverrides,
    ) -> Result<Vec<Record>> {
        if owner.is_empty() {
            return Err(StoreError::EmptyQuery);
        }

        let request = ListRequest::new(&self.table_name, owner)
            .with_id_prefix(subtable.map(Subtable::id_prefix))
            .with_overrides(overrides);
        let items = self.backend.list(&request).await?;

        tracing::debug!(
            table = %request.table_name,
            owner = %owner,
            count = items.len(),
            "Listed records"
        );
        Ok(items)
    }
}

/// The caller's attributes with the logical id and, when given, the owner.
fn with_keys(mut attrs: Record, id: String, owner: Option<String>) -> Record {
    attrs.insert(ID_FIELD.to_string(), Value::String(id));
    if let Some(owner) = owner {
        attrs.insert(OWNER_FIELD.to_string(), Value::String(owner));
    }
    attrs
}

/// A store scoped to one subtable.
///
/// Ids are stored as `<subtable>|<id>`. Reads and writes through the view
/// apply the prefix; owners are untouched.
#[derive(Debug, Clone)]
pub struct TableView<'a, B> {
    store: &'a Store<B>,
    subtable: Subtable,
}

impl<B: Backend> TableView<'_, B> {
    pub fn subtable(&self) -> &Subtable {
        &self.subtable
    }

    pub async fn get(&self, query: &RecordQuery) -> Result<GetOutput> {
        self.get_with(query, &ReadOverrides::default()).await
    }

    pub async fn get_with(
        &self,
        query: &RecordQuery,
        overrides: &ReadOverrides,
    ) -> Result<GetOutput> {
        let query = query.clone().in_subtable(self.subtable.as_str());
        self.store.get_with(&query, overrides).await
    }

    pub async fn set(&self, record: Record) -> Result<Record> {
        self.set_with(record, &WriteOverrides::default()).await
    }

    pub async fn set_with(&self, record: Record, overrides: &WriteOverrides) -> Result<Record> {
        self.apply(SetRequest::from_record(record)?, overrides).await
    }

    pub async fn apply(&self, request: SetRequest, overrides: &WriteOverrides) -> Result<Record> {
        self.store
            .write(request, Some(&self.subtable), overrides)
            .await
    }

    /// Items of the owner's partition that belong to this subtable.
    pub async fn list(&self, owner: &str) -> Result<Vec<Record>> {
        self.list_with(owner, &ReadOverrides::default()).await
    }

    pub async fn list_with(&self, owner: &str, overrides: &ReadOverrides) -> Result<Vec<Record>> {
        self.store
            .list_in(owner, Some(&self.subtable), overrides)
            .await
    }
}
