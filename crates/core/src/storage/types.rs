use serde::{Deserialize, Serialize};

use crate::record::{Lookup, PrimaryKey, Record, UpdateInstruction};

/// Caller overrides applied on top of a derived read. Set fields win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    /// Raw projection expression, passed to the backend as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub projection: Option<String>,
}

impl ReadOverrides {
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn index_name(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    pub fn consistent_read(mut self, consistent_read: bool) -> Self {
        self.consistent_read = Some(consistent_read);
        self
    }

    pub fn projection(mut self, projection: impl Into<String>) -> Self {
        self.projection = Some(projection.into());
        self
    }
}

/// Caller overrides applied on top of a derived write. Set fields win.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    /// Guard creates against overwriting an existing item (default: `true`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_only: Option<bool>,
}

impl WriteOverrides {
    pub fn table_name(mut self, table_name: impl Into<String>) -> Self {
        self.table_name = Some(table_name.into());
        self
    }

    pub fn create_only(mut self, create_only: bool) -> Self {
        self.create_only = Some(create_only);
        self
    }
}

/// A single read against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadRequest {
    pub table_name: String,
    pub lookup: Lookup,
    pub consistent_read: bool,
    pub projection: Option<String>,
}

impl ReadRequest {
    pub fn new(table_name: impl Into<String>, lookup: Lookup) -> Self {
        Self {
            table_name: table_name.into(),
            lookup,
            consistent_read: false,
            projection: None,
        }
    }

    pub fn with_overrides(mut self, overrides: &ReadOverrides) -> Self {
        if let Some(table_name) = &overrides.table_name {
            self.table_name = table_name.clone();
        }
        if let (Some(name), Lookup::Index { index_name, .. }) =
            (&overrides.index_name, &mut self.lookup)
        {
            *index_name = name.clone();
        }
        if let Some(consistent_read) = overrides.consistent_read {
            self.consistent_read = consistent_read;
        }
        if let Some(projection) = &overrides.projection {
            self.projection = Some(projection.clone());
        }
        self
    }
}

/// A single partition query against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRequest {
    pub table_name: String,
    pub owner: String,
    /// Restricts results to ids starting with this prefix.
    pub id_prefix: Option<String>,
    pub consistent_read: bool,
    pub projection: Option<String>,
}

impl ListRequest {
    pub fn new(table_name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            owner: owner.into(),
            id_prefix: None,
            consistent_read: false,
            projection: None,
        }
    }

    pub fn with_id_prefix(mut self, id_prefix: Option<String>) -> Self {
        self.id_prefix = id_prefix;
        self
    }

    pub fn with_overrides(mut self, overrides: &ReadOverrides) -> Self {
        if let Some(table_name) = &overrides.table_name {
            self.table_name = table_name.clone();
        }
        if let Some(consistent_read) = overrides.consistent_read {
            self.consistent_read = consistent_read;
        }
        if let Some(projection) = &overrides.projection {
            self.projection = Some(projection.clone());
        }
        self
    }
}

/// A partial update of one item. The backend reports the previous attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateItemRequest {
    pub table_name: String,
    pub key: PrimaryKey,
    pub update: UpdateInstruction,
}

impl UpdateItemRequest {
    pub fn new(table_name: impl Into<String>, key: PrimaryKey, update: UpdateInstruction) -> Self {
        Self {
            table_name: table_name.into(),
            key,
            update,
        }
    }

    pub fn with_overrides(mut self, overrides: &WriteOverrides) -> Self {
        if let Some(table_name) = &overrides.table_name {
            self.table_name = table_name.clone();
        }
        self
    }
}

/// A whole-item write.
#[derive(Debug, Clone, PartialEq)]
pub struct PutItemRequest {
    pub table_name: String,
    pub item: Record,
    /// Fail instead of overwriting an item with the same key.
    pub create_only: bool,
}

impl PutItemRequest {
    pub fn new(table_name: impl Into<String>, item: Record) -> Self {
        Self {
            table_name: table_name.into(),
            item,
            create_only: true,
        }
    }

    pub fn with_overrides(mut self, overrides: &WriteOverrides) -> Self {
        if let Some(table_name) = &overrides.table_name {
            self.table_name = table_name.clone();
        }
        if let Some(create_only) = overrides.create_only {
            self.create_only = create_only;
        }
        self
    }
}

/// Result of a read: the backend item, unmodified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GetOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Record>,
}

impl GetOutput {
    pub fn is_empty(&self) -> bool {
        self.item.is_none()
    }

    pub fn into_item(self) -> Option<Record> {
        self.item
    }
}
