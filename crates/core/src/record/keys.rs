//! Key derivation for the owner/id table layout.
//!
//! Pure functions that turn a logical `{owner, id, subtable}` query into the
//! single lookup shape the backend understands. All functions are sync and
//! have no side effects.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::{Result, StoreError};

use super::types::SUBTABLE_DELIMITER;

/// Logical query as supplied by callers.
///
/// Empty strings are treated the same as absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtable: Option<String>,
}

impl RecordQuery {
    /// Query addressing one record by its full primary key.
    pub fn by_key(owner: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            id: Some(id.into()),
            subtable: None,
        }
    }

    /// Query resolved through the secondary index.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// Query for the owner's root record.
    pub fn by_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    /// Scope the query to a subtable.
    pub fn in_subtable(mut self, subtable: impl Into<String>) -> Self {
        self.subtable = Some(subtable.into());
        self
    }
}

/// A validated subtable name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Subtable(String);

impl Subtable {
    /// Validates a subtable name. It must be non-empty and free of the delimiter.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(StoreError::EmptySubtable);
        }
        reject_delimiter("subtable", &name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Prefix shared by every stored id of this subtable.
    ///
    /// Pattern: `<subtable>|`
    pub fn id_prefix(&self) -> String {
        format!("{}{SUBTABLE_DELIMITER}", self.0)
    }

    /// Physical id of a logical id inside this subtable.
    ///
    /// Pattern: `<subtable>|<id>`
    pub fn namespace(&self, id: &str) -> String {
        format!("{}{SUBTABLE_DELIMITER}{id}", self.0)
    }
}

impl fmt::Display for Subtable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full primary key of a stored item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrimaryKey {
    pub owner: String,
    pub id: String,
}

/// The one lookup shape derived from a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// Point read on the primary table.
    Item(PrimaryKey),
    /// Read through the secondary index keyed by `id`. Eventually consistent.
    Index { index_name: String, id: String },
    /// The owner's root record: first item of the partition in sort order.
    Partition { owner: String },
}

impl Lookup {
    /// Short name of the shape, for logging.
    pub fn shape(&self) -> &'static str {
        match self {
            Lookup::Item(_) => "item",
            Lookup::Index { .. } => "index",
            Lookup::Partition { .. } => "partition",
        }
    }
}

/// Rejects caller ids containing the subtable delimiter.
pub fn validate_id(id: &str) -> Result<()> {
    reject_delimiter("id", id)
}

/// Physical id for a logical id, prefixed when a subtable is given.
pub fn namespaced_id(subtable: Option<&Subtable>, id: &str) -> String {
    match subtable {
        Some(subtable) => subtable.namespace(id),
        None => id.to_string(),
    }
}

/// Builds the full primary key for a write or a point read.
pub fn primary_key(owner: &str, id: &str, subtable: Option<&Subtable>) -> Result<PrimaryKey> {
    validate_id(id)?;
    Ok(PrimaryKey {
        owner: owner.to_string(),
        id: namespaced_id(subtable, id),
    })
}

/// Derives the lookup for a query.
///
/// Priority: owner and id → item, id only → index, owner only → partition.
/// A query with neither is rejected before reaching the backend.
pub fn derive_lookup(query: &RecordQuery, index_name: &str) -> Result<Lookup> {
    let subtable = query
        .subtable
        .as_deref()
        .map(Subtable::new)
        .transpose()?;
    let owner = non_empty(query.owner.as_deref());
    let id = non_empty(query.id.as_deref());

    match (owner, id) {
        (Some(owner), Some(id)) => Ok(Lookup::Item(primary_key(owner, id, subtable.as_ref())?)),
        (None, Some(id)) => {
            validate_id(id)?;
            Ok(Lookup::Index {
                index_name: index_name.to_string(),
                id: namespaced_id(subtable.as_ref(), id),
            })
        }
        (Some(owner), None) => Ok(Lookup::Partition {
            owner: owner.to_string(),
        }),
        (None, None) => Err(StoreError::EmptyQuery),
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn reject_delimiter(field: &'static str, value: &str) -> Result<()> {
    if value.contains(SUBTABLE_DELIMITER) {
        return Err(StoreError::ReservedDelimiter {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}
