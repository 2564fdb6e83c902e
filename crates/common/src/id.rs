//! ID generation utilities.

use rand::{distributions::Alphanumeric, Rng};
use ulid::Ulid;
use uuid::Uuid;

/// Length of the random suffix appended to slugs.
pub const SLUG_SUFFIX_LEN: usize = 6;

/// ID generator for entities.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs are:
    /// - Lexicographically sortable
    /// - Monotonically increasing within the same millisecond
    /// - Shorter than UUIDs when represented as strings
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate a cryptographically secure random token.
    #[must_use]
    pub fn generate_token(&self) -> String {
        // Use UUID v4 for tokens (no time component for security)
        Uuid::new_v4().simple().to_string()
    }

    /// Generate a lowercase alphanumeric string of `len` characters.
    #[must_use]
    pub fn random_string(&self, len: usize) -> String {
        rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(len)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect()
    }

    /// Generate a URL slug: the slugified title plus a random suffix.
    ///
    /// Uniqueness rests on the suffix; collisions are not checked.
    #[must_use]
    pub fn generate_slug(&self, title: &str) -> String {
        let base = slugify(title);
        let base = if base.is_empty() { "request".to_string() } else { base };
        format!("{base}-{}", self.random_string(SLUG_SUFFIX_LEN))
    }
}

/// Lowercase ASCII alphanumerics joined by single hyphens.
fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            }
        })
        .collect::<String>()
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), 26);
        assert_eq!(id2.len(), 26);
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_generate_token() {
        let id_gen = IdGenerator::new();
        let token = id_gen.generate_token();

        assert_eq!(token.len(), 32); // Simple UUID without hyphens
    }

    #[test]
    fn test_generate_slug() {
        let id_gen = IdGenerator::new();
        let slug = id_gen.generate_slug("Clean Water for Ban Nong Khai!");

        assert!(slug.starts_with("clean-water-for-ban-nong-khai-"));
        let suffix = slug.rsplit('-').next().unwrap_or_default();
        assert_eq!(suffix.len(), SLUG_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("  Food & Shelter -- 2025 "), "food-shelter-2025");
        assert_eq!(slugify("Ünïcode"), "n-code");
    }

    #[test]
    fn test_generate_slug_empty_title() {
        let id_gen = IdGenerator::new();
        let slug = id_gen.generate_slug("!!!");
        assert!(slug.starts_with("request-"));
    }
}
