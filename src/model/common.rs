use rand::Rng;
use uuid::Uuid;

pub type Id = String;

/// Collection holding template records
pub const TEMPLATES_COLLECTION: &str = "templates";

/// Collection holding folder records
pub const FOLDERS_COLLECTION: &str = "folders";

/// Length of generated short identifiers
pub const SHORTID_LENGTH: usize = 7;

const SHORTID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

pub fn generate_id() -> Id {
    Uuid::new_v4().to_string()
}

/// Generate a random URL-safe short identifier
pub fn generate_shortid() -> String {
    let mut rng = rand::rng();
    (0..SHORTID_LENGTH)
        .map(|_| SHORTID_ALPHABET[rng.random_range(0..SHORTID_ALPHABET.len())] as char)
        .collect()
}

/// Treat empty strings the same as absent values
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
