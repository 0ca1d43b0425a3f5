//! CreateTable input builders.

use aws_sdk_dynamodb::types::{
    AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ProvisionedThroughput, ScalarAttributeType,
};

use sddb_core::storage::{AttributeType, Capacity, KeyAttribute, Result, StoreError, TableSchema};

/// HASH key followed by the optional RANGE key.
pub fn key_schema(
    partition_key: &KeyAttribute,
    sort_key: Option<&KeyAttribute>,
) -> Result<Vec<KeySchemaElement>> {
    let mut elements = vec![KeySchemaElement::builder()
        .attribute_name(&partition_key.name)
        .key_type(KeyType::Hash)
        .build()
        .map_err(invalid_schema)?];

    if let Some(sk) = sort_key {
        elements.push(
            KeySchemaElement::builder()
                .attribute_name(&sk.name)
                .key_type(KeyType::Range)
                .build()
                .map_err(invalid_schema)?,
        );
    }

    Ok(elements)
}

/// One definition per key attribute of the table and its index.
pub fn attribute_definitions(schema: &TableSchema) -> Result<Vec<AttributeDefinition>> {
    schema
        .key_attributes()
        .into_iter()
        .map(|attribute| {
            AttributeDefinition::builder()
                .attribute_name(&attribute.name)
                .attribute_type(to_scalar_type(&attribute.attribute_type))
                .build()
                .map_err(invalid_schema)
        })
        .collect()
}

/// `None` for on-demand capacity.
pub fn provisioned_throughput(capacity: &Capacity) -> Result<Option<ProvisionedThroughput>> {
    match capacity {
        Capacity::OnDemand => Ok(None),
        Capacity::Provisioned { read, write } => ProvisionedThroughput::builder()
            .read_capacity_units(*read)
            .write_capacity_units(*write)
            .build()
            .map(Some)
            .map_err(invalid_schema),
    }
}

/// The secondary index, projecting all attributes.
pub fn global_secondary_index(schema: &TableSchema) -> Result<GlobalSecondaryIndex> {
    let index = &schema.index;

    GlobalSecondaryIndex::builder()
        .index_name(&index.name)
        .set_key_schema(Some(key_schema(
            &index.partition_key,
            index.sort_key.as_ref(),
        )?))
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .set_provisioned_throughput(provisioned_throughput(&schema.capacity)?)
        .build()
        .map_err(invalid_schema)
}

fn to_scalar_type(attr_type: &AttributeType) -> ScalarAttributeType {
    match attr_type {
        AttributeType::String => ScalarAttributeType::S,
        AttributeType::Number => ScalarAttributeType::N,
    }
}

fn invalid_schema(err: impl std::fmt::Display) -> StoreError {
    StoreError::InvalidSchema(err.to_string())
}
