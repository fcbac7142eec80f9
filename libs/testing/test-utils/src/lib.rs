//! Shared test utilities for the blog crates
//!
//! - `TestDatabase`: PostgreSQL container with the schema migrated
//! - `TestDataBuilder`: deterministic account data per test
//! - `assertions`: small assertion helpers
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let data = TestDataBuilder::from_test_name("my_postgres_test");
//!     let username = data.username("alice");
//! }
//! ```

use uuid::Uuid;

mod postgres;

pub use postgres::TestDatabase;

/// Builder for account test data with deterministic values
///
/// Values derived from the same seed are stable across runs, and different
/// seeds give different usernames, emails and phone numbers.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed from the test name, the usual way to build one.
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let data = TestDataBuilder::from_test_name("test_create_user");
    /// assert_eq!(data.username("bob"), TestDataBuilder::from_test_name("test_create_user").username("bob"));
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    pub fn user_id(&self) -> Uuid {
        let bytes = self.seed.to_le_bytes();
        let mut uuid_bytes = [0u8; 16];
        uuid_bytes[..8].copy_from_slice(&bytes);
        uuid_bytes[8..16].copy_from_slice(&bytes);
        Uuid::from_bytes(uuid_bytes)
    }

    /// A username of at most 20 characters: `{prefix}_{6 digits}`.
    ///
    /// `prefix` is cut to 13 characters.
    pub fn username(&self, prefix: &str) -> String {
        let prefix: String = prefix.chars().take(13).collect();
        format!("{}_{:06}", prefix, self.seed % 1_000_000)
    }

    pub fn email(&self, prefix: &str) -> String {
        format!("{}@example.com", self.username(prefix))
    }

    /// An 11 digit mainland mobile number, e.g. `138xxxxxxxx`.
    pub fn tel(&self, offset: u64) -> String {
        format!("138{:08}", (self.seed.wrapping_add(offset)) % 100_000_000)
    }
}

/// Test assertion helpers
pub mod assertions {
    use uuid::Uuid;

    /// Assert that two UUIDs are equal with a nice error message
    pub fn assert_uuid_eq(actual: Uuid, expected: Uuid, context: &str) {
        assert_eq!(
            actual, expected,
            "{}: expected UUID {}, got {}",
            context, expected, actual
        );
    }

    /// Assert that an optional value is Some
    pub fn assert_some<T>(value: Option<T>, context: &str) -> T {
        value.unwrap_or_else(|| panic!("{}: expected Some, got None", context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let a = TestDataBuilder::new(42);
        let b = TestDataBuilder::new(42);

        assert_eq!(a.user_id(), b.user_id());
        assert_eq!(a.username("alice"), b.username("alice"));
        assert_eq!(a.tel(1), b.tel(1));
    }

    #[test]
    fn test_data_builder_different_names() {
        let a = TestDataBuilder::from_test_name("test1");
        let b = TestDataBuilder::from_test_name("test2");

        assert_ne!(a.user_id(), b.user_id());
    }

    #[test]
    fn test_generated_values_fit_account_rules() {
        let data = TestDataBuilder::new(u64::MAX);

        let username = data.username("a_rather_long_prefix");
        assert!(username.chars().count() <= 20);
        assert!(data.email("bob").ends_with("@example.com"));

        let tel = data.tel(7);
        assert_eq!(tel.len(), 11);
        assert!(tel.starts_with("138"));
        assert!(tel.chars().all(|c| c.is_ascii_digit()));
    }
}
