//! Customer directory lookups.

mod sqlite;

pub use sqlite::SqliteDirectory;

use async_trait::async_trait;

use crate::routing::QueryVariant;
use crate::ticket::{CustomerId, CustomerRecord};

/// Error type for directory operations.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("customer not found: {0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(String),
}

/// Read-only access to customer data, scoped by query variant.
///
/// Implementations must return only the fields the variant names;
/// leaking the full record on a billing lookup defeats the point of
/// variant selection.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn lookup(
        &self,
        customer_id: &CustomerId,
        variant: QueryVariant,
    ) -> Result<CustomerRecord, DirectoryError>;
}
