//! Partial-update compilation.
//!
//! Turns an arbitrary attribute mapping into a backend-neutral list of
//! `SET field = value` clauses. Backends translate the clauses into their own
//! update syntax; attributes that are not named keep their stored value.

use serde_json::Value;

use super::types::{Record, ID_FIELD, OWNER_FIELD};

/// Assigns one attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct SetClause {
    pub field: String,
    pub value: Value,
}

/// All clauses of one atomic update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateInstruction {
    clauses: Vec<SetClause>,
}

impl UpdateInstruction {
    pub fn clauses(&self) -> &[SetClause] {
        &self.clauses
    }

    /// An empty instruction leaves the stored item untouched.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Applies the clauses onto a stored item.
    pub fn apply_to(&self, item: &mut Record) {
        for clause in &self.clauses {
            item.insert(clause.field.clone(), clause.value.clone());
        }
    }
}

/// Compiles one clause per attribute, skipping the key fields.
pub fn compile_update(attrs: &Record) -> UpdateInstruction {
    let clauses = attrs
        .iter()
        .filter(|(field, _)| !is_key_field(field))
        .map(|(field, value)| SetClause {
            field: field.clone(),
            value: value.clone(),
        })
        .collect();

    UpdateInstruction { clauses }
}

/// Merges the previously stored attributes with the supplied ones.
///
/// Supplied values win on collision.
pub fn merge_update_result(previous: Record, supplied: Record) -> Record {
    let mut merged = previous;
    merged.extend(supplied);
    merged
}

fn is_key_field(field: &str) -> bool {
    field == ID_FIELD || field == OWNER_FIELD
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
    fn test_compile_skips_key_fields() {
        let attrs = record(json!({"id": "abc", "owner": "konsumer", "favorite": true}));
        let update = compile_update(&attrs);

        assert_eq!(update.len(), 1);
        assert_eq!(
            update.clauses()[0],
            SetClause {
                field: "favorite".to_string(),
                value: json!(true),
            }
        );
    }

    #[test]
    fn test_compile_one_clause_per_attribute() {
        let attrs = record(json!({"a": 1, "b": {"nested": [1, 2]}, "c": null}));
        let update = compile_update(&attrs);

        let fields: Vec<&str> = update.clauses().iter().map(|c| c.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_empty_mapping_compiles_to_no_op() {
        let update = compile_update(&record(json!({"id": "abc"})));
        assert!(update.is_empty());
    }

    #[test]
    fn test_apply_leaves_other_fields() {
        let mut item = record(json!({"a": 1, "b": 2}));
        compile_update(&record(json!({"b": 3}))).apply_to(&mut item);
        assert_eq!(Value::Object(item), json!({"a": 1, "b": 3}));
    }

    #[test]
    fn test_merge_prefers_supplied_values() {
        let previous = record(json!({"id": "Book|abc", "title": "Neuromancer", "favorite": false}));
        let supplied = record(json!({"id": "abc", "favorite": true}));

        let merged = merge_update_result(previous, supplied);
        assert_eq!(
            Value::Object(merged),
            json!({"id": "abc", "title": "Neuromancer", "favorite": true})
        );
    }
}
