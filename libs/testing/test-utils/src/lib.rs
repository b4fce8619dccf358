//! Shared test utilities for domain testing
//!
//! - `TestDatabase`: PostgreSQL container with the schema migrated (feature: "postgres")
//! - `TestDataBuilder`: Deterministic test data generation (always available)
//!
//! # Usage
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! #[ignore = "requires Docker"]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_test");
//!
//!     let owner = builder.user_id();
//!     let title = builder.title("groceries");
//! }
//! ```

#[cfg(feature = "postgres")]
mod postgres;

#[cfg(feature = "postgres")]
pub use postgres::TestDatabase;

/// Builder for test data with deterministic randomization
///
/// Tests sharing a database stay isolated by deriving their owners from the test name.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_create_note");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Owner identity in the shape the identity provider issues
    pub fn user_id(&self) -> String {
        format!("user_{:016x}", self.seed)
    }

    /// A second owner, distinct from [`Self::user_id`]
    pub fn other_user_id(&self) -> String {
        format!("user_{:016x}", self.seed.wrapping_add(1))
    }

    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::new(7);
    /// assert_eq!(builder.title("groceries"), "groceries 7");
    /// ```
    pub fn title(&self, prefix: &str) -> String {
        format!("{} {}", prefix, self.seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::new(42);
        let builder2 = TestDataBuilder::new(42);

        assert_eq!(builder1.user_id(), builder2.user_id());
        assert_eq!(builder1.title("note"), builder2.title("note"));
    }

    #[test]
    fn test_data_builder_different_names() {
        let builder1 = TestDataBuilder::from_test_name("test1");
        let builder2 = TestDataBuilder::from_test_name("test2");

        assert_ne!(builder1.user_id(), builder2.user_id());
    }

    #[test]
    fn test_other_user_differs() {
        let builder = TestDataBuilder::from_test_name("owners");
        assert_ne!(builder.user_id(), builder.other_user_id());
    }
}
