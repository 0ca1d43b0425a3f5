//! Write request variants.
//!
//! A raw record is disambiguated once, at the API boundary, into either a
//! create or an update. The store operates on the variant only.

use serde_json::Value;

use crate::storage::{Result, StoreError};

use super::types::{Record, DEFAULT_OWNER, ID_FIELD, OWNER_FIELD};

/// Write a brand-new record under a generated id.
///
/// The owner is written as given; a record without one has no partition key
/// and is rejected by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateRequest {
    pub owner: Option<String>,
    pub attrs: Record,
}

impl CreateRequest {
    pub fn new(owner: Option<String>, attrs: Record) -> Self {
        Self { owner, attrs }
    }
}

/// Set the given attributes on the record at `{owner, id}`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub id: String,
    pub owner: Option<String>,
    pub attrs: Record,
}

impl UpdateRequest {
    pub fn new(id: impl Into<String>, owner: Option<String>, attrs: Record) -> Self {
        Self {
            id: id.into(),
            owner,
            attrs,
        }
    }

    /// Partition key of the update: the owner, or `"NONE"` when absent.
    pub fn key_owner(&self) -> &str {
        self.owner.as_deref().unwrap_or(DEFAULT_OWNER)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SetRequest {
    Create(CreateRequest),
    Update(UpdateRequest),
}

impl SetRequest {
    /// Splits a raw record into a create or an update.
    ///
    /// A non-empty string `id` selects update; a missing, null or empty id
    /// selects create. `id` and `owner` are removed from the attributes; a
    /// missing, null or empty owner is kept as absent.
    pub fn from_record(mut record: Record) -> Result<Self> {
        let id = match record.remove(ID_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) if id.is_empty() => None,
            Some(Value::String(id)) => Some(id),
            Some(other) => return Err(StoreError::InvalidId(other.to_string())),
        };

        let owner = match record.remove(OWNER_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(owner)) if owner.is_empty() => None,
            Some(Value::String(owner)) => Some(owner),
            Some(other) => return Err(StoreError::InvalidOwner(other.to_string())),
        };

        Ok(match id {
            Some(id) => SetRequest::Update(UpdateRequest::new(id, owner, record)),
            None => SetRequest::Create(CreateRequest::new(owner, record)),
        })
    }

    /// The owner the caller supplied, if any.
    pub fn owner(&self) -> Option<&str> {
        match self {
            SetRequest::Create(request) => request.owner.as_deref(),
            SetRequest::Update(request) => request.owner.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_record_without_id_is_create() {
        let request =
            SetRequest::from_record(record(json!({"owner": "konsumer", "title": "Neuromancer"})))
                .unwrap();

        assert_eq!(
            request,
            SetRequest::Create(CreateRequest::new(
                Some("konsumer".to_string()),
                record(json!({"title": "Neuromancer"}))
            ))
        );
    }

    #[test]
    fn test_record_with_id_is_update() {
        let request = SetRequest::from_record(record(
            json!({"id": "abc", "owner": "konsumer", "favorite": true}),
        ))
        .unwrap();

        assert_eq!(
            request,
            SetRequest::Update(UpdateRequest::new(
                "abc",
                Some("konsumer".to_string()),
                record(json!({"favorite": true}))
            ))
        );
    }

    #[test]
    fn test_empty_or_null_id_is_create() {
        let request = SetRequest::from_record(record(json!({"id": "", "a": 1}))).unwrap();
        assert!(matches!(request, SetRequest::Create(_)));

        let request = SetRequest::from_record(record(json!({"id": null, "a": 1}))).unwrap();
        assert!(matches!(request, SetRequest::Create(_)));
    }

    #[test]
    fn test_missing_owner_stays_absent() {
        let request = SetRequest::from_record(record(json!({"a": 1}))).unwrap();
        assert_eq!(request.owner(), None);

        let request = SetRequest::from_record(record(json!({"owner": "", "a": 1}))).unwrap();
        assert_eq!(request.owner(), None);
    }

    #[test]
    fn test_update_key_owner_defaults_to_none() {
        let request = SetRequest::from_record(record(json!({"id": "abc", "a": 1}))).unwrap();
        match request {
            SetRequest::Update(update) => {
                assert_eq!(update.owner, None);
                assert_eq!(update.key_owner(), "NONE");
            }
            other => panic!("expected an update, got {other:?}"),
        }
    }

    #[test]
    fn test_non_string_id_is_rejected() {
        let result = SetRequest::from_record(record(json!({"id": 42})));
        assert_eq!(result, Err(StoreError::InvalidId("42".to_string())));
    }

    #[test]
    fn test_non_string_owner_is_rejected() {
        let result = SetRequest::from_record(record(json!({"owner": ["a"]})));
        assert_eq!(result, Err(StoreError::InvalidOwner("[\"a\"]".to_string())));
    }
}
