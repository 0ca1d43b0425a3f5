mod id;
mod keys;
mod requests;
mod types;
mod update;

pub use id::{generate_id, IdGenerator, RandomId, ID_ALPHABET, ID_LENGTH};
pub use keys::{
    derive_lookup, namespaced_id, primary_key, validate_id, Lookup, PrimaryKey, RecordQuery,
    Subtable,
};
pub use requests::{CreateRequest, SetRequest, UpdateRequest};
pub use types::{
    Record, DEFAULT_INDEX_NAME, DEFAULT_OWNER, ID_FIELD, OWNER_FIELD, SUBTABLE_DELIMITER,
};
pub use update::{compile_update, merge_update_result, SetClause, UpdateInstruction};
