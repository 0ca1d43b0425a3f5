use rand::Rng;

/// URL-safe alphabet for generated ids.
pub const ID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Length of generated ids.
pub const ID_LENGTH: usize = 21;

/// Source of fresh record ids.
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Random ids drawn from [`ID_ALPHABET`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomId;

impl IdGenerator for RandomId {
    fn generate(&self) -> String {
        generate_id()
    }
}

/// Generate a random URL-safe id of [`ID_LENGTH`] characters.
pub fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LENGTH)
        .map(|_| char::from(ID_ALPHABET[rng.random_range(0..ID_ALPHABET.len())]))
        .collect()
}
