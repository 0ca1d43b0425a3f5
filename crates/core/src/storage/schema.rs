//! Table schema configuration (pure data).

use serde::{Deserialize, Serialize};

use crate::record::{ID_FIELD, OWNER_FIELD};

/// A key attribute definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    pub attribute_type: AttributeType,
}

impl KeyAttribute {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: AttributeType::String,
        }
    }
}

/// Scalar types allowed for key attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeType {
    String,
    Number,
}

/// Secondary index projecting all attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexSchema {
    pub name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
}

/// Throughput for the table and its index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Capacity {
    OnDemand,
    Provisioned { read: i64, write: i64 },
}

impl Default for Capacity {
    fn default() -> Self {
        Capacity::Provisioned { read: 1, write: 1 }
    }
}

/// Full table schema handed to the backend at setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub table_name: String,
    pub partition_key: KeyAttribute,
    pub sort_key: Option<KeyAttribute>,
    pub index: IndexSchema,
    pub capacity: Capacity,
}

/// Per-field replacements for the default schema. Fields are replaced whole.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<KeyAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<KeyAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexSchema>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<Capacity>,
}

impl SchemaOverrides {
    pub fn capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn index(mut self, index: IndexSchema) -> Self {
        self.index = Some(index);
        self
    }
}

impl TableSchema {
    /// The canonical layout: `owner` (HASH) / `id` (RANGE), plus an index on `id`.
    pub fn for_table(table_name: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            partition_key: KeyAttribute::string(OWNER_FIELD),
            sort_key: Some(KeyAttribute::string(ID_FIELD)),
            index: IndexSchema {
                name: index_name.into(),
                partition_key: KeyAttribute::string(ID_FIELD),
                sort_key: None,
            },
            capacity: Capacity::default(),
        }
    }

    pub fn merged(self, overrides: &SchemaOverrides) -> Self {
        Self {
            table_name: overrides.table_name.clone().unwrap_or(self.table_name),
            partition_key: overrides
                .partition_key
                .clone()
                .unwrap_or(self.partition_key),
            sort_key: overrides.sort_key.clone().or(self.sort_key),
            index: overrides.index.clone().unwrap_or(self.index),
            capacity: overrides.capacity.unwrap_or(self.capacity),
        }
    }

    /// Every key attribute of the table and index, each name once.
    pub fn key_attributes(&self) -> Vec<&KeyAttribute> {
        let candidates = [
            Some(&self.partition_key),
            self.sort_key.as_ref(),
            Some(&self.index.partition_key),
            self.index.sort_key.as_ref(),
        ];

        let mut attributes: Vec<&KeyAttribute> = Vec::with_capacity(candidates.len());
        for attribute in candidates.into_iter().flatten() {
            if !attributes.iter().any(|a| a.name == attribute.name) {
                attributes.push(attribute);
            }
        }
        attributes
    }
}
