//! DynamoDB backend implementation.
//!
//! Implements `sddb_core::storage::Backend` on top of an `aws-sdk-dynamodb` client.

use async_trait::async_trait;
use aws_sdk_dynamodb::types::{BillingMode, ReturnValue};
use aws_sdk_dynamodb::Client;

use sddb_core::record::{Lookup, Record, ID_FIELD};
use sddb_core::storage::{
    Backend, Capacity, ListRequest, PutItemRequest, ReadRequest, Result, TableSchema,
    UpdateItemRequest,
};

use crate::config::StoreConfig;

use super::conversions::{item_to_record, key_to_item, record_to_item};
use super::error::{
    map_create_table_error, map_get_item_error, map_put_item_error, map_query_error,
    map_update_item_error,
};
use super::expressions::{index_condition, partition_condition, update_expression, KeyCondition};
use super::schema::{
    attribute_definitions, global_secondary_index, key_schema, provisioned_throughput,
};

/// DynamoDB-based backend.
///
/// Holds one client, shared by every operation of the store.
#[derive(Debug, Clone)]
pub struct DynamoDbBackend {
    client: Client,
}

impl DynamoDbBackend {
    /// Creates a new backend with the given DynamoDB client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a new backend from store configuration.
    ///
    /// Uses the AWS SDK default credential chain with the configured region
    /// and optional endpoint URL.
    pub async fn from_config(config: &StoreConfig) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));

        if let Some(endpoint) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config))
    }

    /// Get the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Runs a key-condition query and returns the raw items.
    async fn query(
        &self,
        table_name: &str,
        index_name: Option<&str>,
        condition: KeyCondition,
        consistent_read: bool,
        projection: Option<&str>,
        limit: Option<i32>,
    ) -> Result<Vec<Record>> {
        let mut request = self
            .client
            .query()
            .table_name(table_name)
            .set_index_name(index_name.map(str::to_string))
            .key_condition_expression(condition.expression)
            .set_expression_attribute_names(Some(condition.names))
            .set_expression_attribute_values(Some(condition.values))
            .set_projection_expression(projection.map(str::to_string))
            .set_limit(limit);

        // Secondary indexes reject strongly consistent reads.
        if index_name.is_none() {
            request = request.consistent_read(consistent_read);
        }

        let result = request.send().await.map_err(map_query_error)?;

        let items = result.items.unwrap_or_default();
        items.iter().map(item_to_record).collect()
    }
}

#[async_trait]
impl Backend for DynamoDbBackend {
    async fn get(&self, request: &ReadRequest) -> Result<Option<Record>> {
        match &request.lookup {
            Lookup::Item(key) => {
                let result = self
                    .client
                    .get_item()
                    .table_name(&request.table_name)
                    .set_key(Some(key_to_item(key)))
                    .consistent_read(request.consistent_read)
                    .set_projection_expression(request.projection.clone())
                    .send()
                    .await
                    .map_err(map_get_item_error)?;

                result.item.as_ref().map(item_to_record).transpose()
            }
            Lookup::Index { index_name, id } => {
                let items = self
                    .query(
                        &request.table_name,
                        Some(index_name),
                        index_condition(id),
                        false,
                        request.projection.as_deref(),
                        Some(1),
                    )
                    .await?;
                Ok(items.into_iter().next())
            }
            Lookup::Partition { owner } => {
                let items = self
                    .query(
                        &request.table_name,
                        None,
                        partition_condition(owner, None),
                        request.consistent_read,
                        request.projection.as_deref(),
                        Some(1),
                    )
                    .await?;
                Ok(items.into_iter().next())
            }
        }
    }

    async fn list(&self, request: &ListRequest) -> Result<Vec<Record>> {
        self.query(
            &request.table_name,
            None,
            partition_condition(&request.owner, request.id_prefix.as_deref()),
            request.consistent_read,
            request.projection.as_deref(),
            None,
        )
        .await
    }

    async fn update(&self, request: &UpdateItemRequest) -> Result<Record> {
        let mut builder = self
            .client
            .update_item()
            .table_name(&request.table_name)
            .set_key(Some(key_to_item(&request.key)))
            .return_values(ReturnValue::AllOld);

        if let Some(expr) = update_expression(&request.update) {
            builder = builder
                .update_expression(expr.expression)
                .set_expression_attribute_names(Some(expr.names))
                .set_expression_attribute_values(Some(expr.values));
        }

        let result = builder.send().await.map_err(map_update_item_error)?;

        match result.attributes.as_ref() {
            Some(attributes) => item_to_record(attributes),
            None => Ok(Record::new()),
        }
    }

    async fn put(&self, request: &PutItemRequest) -> Result<()> {
        let mut builder = self
            .client
            .put_item()
            .table_name(&request.table_name)
            .set_item(Some(record_to_item(&request.item)));

        if request.create_only {
            builder = builder
                .condition_expression("attribute_not_exists(#id)")
                .expression_attribute_names("#id", ID_FIELD);
        }

        builder.send().await.map_err(map_put_item_error)?;

        Ok(())
    }

    async fn create_table(&self, schema: &TableSchema) -> Result<()> {
        let mut request = self
            .client
            .create_table()
            .table_name(&schema.table_name)
            .set_key_schema(Some(key_schema(
                &schema.partition_key,
                schema.sort_key.as_ref(),
            )?))
            .set_attribute_definitions(Some(attribute_definitions(schema)?))
            .global_secondary_indexes(global_secondary_index(schema)?);

        request = match schema.capacity {
            Capacity::OnDemand => request.billing_mode(BillingMode::PayPerRequest),
            Capacity::Provisioned { .. } => request
                .billing_mode(BillingMode::Provisioned)
                .set_provisioned_throughput(provisioned_throughput(&schema.capacity)?),
        };

        request.send().await.map_err(map_create_table_error)?;

        Ok(())
    }
}
