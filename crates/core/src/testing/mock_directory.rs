//! Mock customer directory for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::directory::{CustomerDirectory, DirectoryError};
use crate::routing::QueryVariant;
use crate::ticket::{CustomerId, CustomerRecord};

/// Mock implementation of the CustomerDirectory trait.
///
/// Serves records from an in-memory map and records every lookup with
/// the variant that was requested.
#[derive(Clone)]
pub struct MockDirectory {
    customers: Arc<RwLock<HashMap<String, CustomerRecord>>>,
    error: Arc<Option<String>>,
    lookups: Arc<RwLock<Vec<(CustomerId, QueryVariant)>>>,
}

impl MockDirectory {
    /// A directory with no customers; every lookup is NotFound.
    pub fn empty() -> Self {
        Self {
            customers: Arc::new(RwLock::new(HashMap::new())),
            error: Arc::new(None),
            lookups: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// A directory holding exactly one customer.
    pub fn with_customer(record: CustomerRecord) -> Self {
        let directory = Self::empty();
        let mut map = HashMap::new();
        map.insert(record.customer_id.clone(), record);
        Self {
            customers: Arc::new(RwLock::new(map)),
            ..directory
        }
    }

    /// A directory where every lookup fails with a database error.
    pub fn failing(error: impl Into<String>) -> Self {
        Self {
            customers: Arc::new(RwLock::new(HashMap::new())),
            error: Arc::new(Some(error.into())),
            lookups: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Add a customer.
    pub async fn insert(&self, record: CustomerRecord) {
        self.customers
            .write()
            .await
            .insert(record.customer_id.clone(), record);
    }

    /// Lookups made so far, in order.
    pub async fn seen_lookups(&self) -> Vec<(CustomerId, QueryVariant)> {
        self.lookups.read().await.clone()
    }
}

#[async_trait]
impl CustomerDirectory for MockDirectory {
    async fn lookup(
        &self,
        customer_id: &CustomerId,
        variant: QueryVariant,
    ) -> Result<CustomerRecord, DirectoryError> {
        self.lookups
            .write()
            .await
            .push((customer_id.clone(), variant));

        if let Some(error) = &*self.error {
            return Err(DirectoryError::Database(error.clone()));
        }

        self.customers
            .read()
            .await
            .get(customer_id.as_str())
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(customer_id.as_str().to_string()))
    }
}
