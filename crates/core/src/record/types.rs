use serde_json::{Map, Value};

/// A stored document: attribute name to JSON-like value.
pub type Record = Map<String, Value>;

/// Partition key attribute.
pub const OWNER_FIELD: &str = "owner";

/// Sort key attribute, also the partition key of the secondary index.
pub const ID_FIELD: &str = "id";

/// Owner used when a write does not name one.
pub const DEFAULT_OWNER: &str = "NONE";

/// Separates a subtable name from the logical id: `<subtable>|<id>`.
pub const SUBTABLE_DELIMITER: char = '|';

/// Name of the secondary index keyed by `id`.
pub const DEFAULT_INDEX_NAME: &str = "gsi1-id";
