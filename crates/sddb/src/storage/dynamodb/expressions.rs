//! Expression builders.
//!
//! Attribute names always go through `#` placeholders, so names that collide
//! with DynamoDB reserved words are safe.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;

use sddb_core::record::{UpdateInstruction, ID_FIELD, OWNER_FIELD};

use super::conversions::value_to_attribute;

/// A native `SET` expression with its placeholder maps.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

/// Translate clauses into `SET #f0 = :v0, #f1 = :v1`.
///
/// Returns `None` for an empty instruction; the update is then sent without
/// an expression.
pub fn update_expression(update: &UpdateInstruction) -> Option<UpdateExpression> {
    if update.is_empty() {
        return None;
    }

    let mut assignments = Vec::with_capacity(update.len());
    let mut names = HashMap::with_capacity(update.len());
    let mut values = HashMap::with_capacity(update.len());

    for (i, clause) in update.clauses().iter().enumerate() {
        let name = format!("#f{i}");
        let value = format!(":v{i}");
        assignments.push(format!("{name} = {value}"));
        names.insert(name, clause.field.clone());
        values.insert(value, value_to_attribute(&clause.value));
    }

    Some(UpdateExpression {
        expression: format!("SET {}", assignments.join(", ")),
        names,
        values,
    })
}

/// A key condition with its placeholder maps.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCondition {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: HashMap<String, AttributeValue>,
}

/// Key condition for a partition query, optionally narrowed to an id prefix.
///
/// Pattern: `#owner = :owner [AND begins_with(#id, :prefix)]`
pub fn partition_condition(owner: &str, id_prefix: Option<&str>) -> KeyCondition {
    let mut names = HashMap::from([("#owner".to_string(), OWNER_FIELD.to_string())]);
    let mut values = HashMap::from([(":owner".to_string(), AttributeValue::S(owner.to_string()))]);

    let expression = match id_prefix {
        Some(prefix) => {
            names.insert("#id".to_string(), ID_FIELD.to_string());
            values.insert(":prefix".to_string(), AttributeValue::S(prefix.to_string()));
            "#owner = :owner AND begins_with(#id, :prefix)".to_string()
        }
        None => "#owner = :owner".to_string(),
    };

    KeyCondition {
        expression,
        names,
        values,
    }
}

/// Key condition for the secondary index.
///
/// Pattern: `#id = :id`
pub fn index_condition(id: &str) -> KeyCondition {
    KeyCondition {
        expression: "#id = :id".to_string(),
        names: HashMap::from([("#id".to_string(), ID_FIELD.to_string())]),
        values: HashMap::from([(":id".to_string(), AttributeValue::S(id.to_string()))]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sddb_core::record::{compile_update, Record};
    use serde_json::{json, Value};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    #[test]
    fn test_update_expression_uses_placeholders() {
        let update = compile_update(&record(json!({
            "id": "abc",
            "name": "Pello",
            "type": "chair",
        })));
        let expr = update_expression(&update).unwrap();

        assert_eq!(expr.expression, "SET #f0 = :v0, #f1 = :v1");
        assert_eq!(expr.names.get("#f0").unwrap(), "name");
        assert_eq!(expr.names.get("#f1").unwrap(), "type");
        assert_eq!(expr.values.get(":v0").unwrap().as_s().unwrap(), "Pello");
        assert_eq!(expr.values.get(":v1").unwrap().as_s().unwrap(), "chair");
    }

    #[test]
    fn test_empty_update_has_no_expression() {
        let update = compile_update(&record(json!({"id": "abc", "owner": "konsumer"})));
        assert!(update_expression(&update).is_none());
    }

    #[test]
    fn test_partition_condition() {
        let condition = partition_condition("konsumer", None);
        assert_eq!(condition.expression, "#owner = :owner");
        assert_eq!(condition.names.len(), 1);
        assert_eq!(
            condition.values.get(":owner").unwrap().as_s().unwrap(),
            "konsumer"
        );

        let condition = partition_condition("konsumer", Some("Book|"));
        assert_eq!(
            condition.expression,
            "#owner = :owner AND begins_with(#id, :prefix)"
        );
        assert_eq!(condition.names.get("#id").unwrap(), "id");
        assert_eq!(
            condition.values.get(":prefix").unwrap().as_s().unwrap(),
            "Book|"
        );
    }

    #[test]
    fn test_index_condition() {
        let condition = index_condition("Book|abc");
        assert_eq!(condition.expression, "#id = :id");
        assert_eq!(condition.names.get("#id").unwrap(), "id");
        assert_eq!(
            condition.values.get(":id").unwrap().as_s().unwrap(),
            "Book|abc"
        );
    }
}
