//! SQLite-backed customer directory.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use super::{CustomerDirectory, DirectoryError};
use crate::routing::QueryVariant;
use crate::ticket::{CustomerId, CustomerRecord};

/// Directory backed by a local SQLite database.
pub struct SqliteDirectory {
    conn: Mutex<Connection>,
}

impl SqliteDirectory {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let conn =
            Connection::open(path).map_err(|e| DirectoryError::Database(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory directory for tests and demos.
    pub fn in_memory() -> Result<Self, DirectoryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| DirectoryError::Database(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), DirectoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS customers (
                customer_id     TEXT PRIMARY KEY,
                name            TEXT NOT NULL,
                email           TEXT NOT NULL,
                plan            TEXT NOT NULL,
                join_date       TEXT NOT NULL,
                last_payment    TEXT NOT NULL,
                support_history TEXT NOT NULL DEFAULT '[]'
            );
            "#,
        )
        .map_err(|e| DirectoryError::Database(e.to_string()))?;
        Ok(())
    }

    /// Insert or replace a customer row. Used for seeding.
    pub fn upsert(&self, record: &CustomerRecord) -> Result<(), DirectoryError> {
        let history = serde_json::to_string(&record.support_history)
            .map_err(|e| DirectoryError::Database(e.to_string()))?;
        let conn = self.conn.lock().expect("directory lock poisoned");
        conn.execute(
            r#"
            INSERT OR REPLACE INTO customers
                (customer_id, name, email, plan, join_date, last_payment, support_history)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                record.customer_id,
                record.name.as_deref().unwrap_or(""),
                record.email.as_deref().unwrap_or(""),
                record.plan.as_deref().unwrap_or(""),
                record.join_date.as_deref().unwrap_or(""),
                record.last_payment.as_deref().unwrap_or(""),
                history,
            ],
        )
        .map_err(|e| DirectoryError::Database(e.to_string()))?;
        Ok(())
    }

    fn lookup_sync(
        &self,
        customer_id: &CustomerId,
        variant: QueryVariant,
    ) -> Result<CustomerRecord, DirectoryError> {
        let conn = self.conn.lock().expect("directory lock poisoned");

        let row = match variant {
            QueryVariant::Billing => conn
                .query_row(
                    "SELECT name, plan, last_payment FROM customers WHERE customer_id = ?1",
                    params![customer_id.as_str()],
                    |row| {
                        Ok(CustomerRecord {
                            customer_id: customer_id.as_str().to_string(),
                            name: Some(row.get(0)?),
                            plan: Some(row.get(1)?),
                            last_payment: Some(row.get(2)?),
                            ..Default::default()
                        })
                    },
                )
                .optional(),
            QueryVariant::History => conn
                .query_row(
                    "SELECT name, support_history, join_date FROM customers WHERE customer_id = ?1",
                    params![customer_id.as_str()],
                    |row| {
                        let history: String = row.get(1)?;
                        Ok(CustomerRecord {
                            customer_id: customer_id.as_str().to_string(),
                            name: Some(row.get(0)?),
                            support_history: serde_json::from_str(&history).unwrap_or_default(),
                            join_date: Some(row.get(2)?),
                            ..Default::default()
                        })
                    },
                )
                .optional(),
            QueryVariant::Full => conn
                .query_row(
                    r#"SELECT customer_id, name, email, plan, join_date, last_payment,
                              support_history
                       FROM customers WHERE customer_id = ?1"#,
                    params![customer_id.as_str()],
                    |row| {
                        let history: String = row.get(6)?;
                        Ok(CustomerRecord {
                            customer_id: row.get(0)?,
                            name: Some(row.get(1)?),
                            email: Some(row.get(2)?),
                            plan: Some(row.get(3)?),
                            join_date: Some(row.get(4)?),
                            last_payment: Some(row.get(5)?),
                            support_history: serde_json::from_str(&history).unwrap_or_default(),
                        })
                    },
                )
                .optional(),
        }
        .map_err(|e| DirectoryError::Database(e.to_string()))?;

        match row {
            Some(record) => {
                debug!(customer_id = customer_id.as_str(), ?variant, "customer found");
                Ok(record)
            }
            None => Err(DirectoryError::NotFound(customer_id.as_str().to_string())),
        }
    }
}

#[async_trait]
impl CustomerDirectory for SqliteDirectory {
    async fn lookup(
        &self,
        customer_id: &CustomerId,
        variant: QueryVariant,
    ) -> Result<CustomerRecord, DirectoryError> {
        self.lookup_sync(customer_id, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> SqliteDirectory {
        let directory = SqliteDirectory::in_memory().unwrap();
        directory
            .upsert(&CustomerRecord {
                customer_id: "CUST001".to_string(),
                name: Some("Anna Keller".to_string()),
                email: Some("anna@example.com".to_string()),
                plan: Some("Premium".to_string()),
                join_date: Some("2023-04-01".to_string()),
                last_payment: Some("2026-08-01".to_string()),
                support_history: vec!["2024-01: invoice question".to_string()],
            })
            .unwrap();
        directory
    }

    fn id(raw: &str) -> CustomerId {
        CustomerId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_billing_variant_returns_partial_record() {
        let directory = seeded();
        let record = directory
            .lookup(&id("CUST001"), QueryVariant::Billing)
            .await
            .unwrap();

        assert_eq!(record.name.as_deref(), Some("Anna Keller"));
        assert_eq!(record.plan.as_deref(), Some("Premium"));
        assert_eq!(record.last_payment.as_deref(), Some("2026-08-01"));
        assert!(record.email.is_none());
        assert!(record.join_date.is_none());
        assert!(record.support_history.is_empty());
    }

    #[tokio::test]
    async fn test_history_variant_returns_partial_record() {
        let directory = seeded();
        let record = directory
            .lookup(&id("CUST001"), QueryVariant::History)
            .await
            .unwrap();

        assert_eq!(record.name.as_deref(), Some("Anna Keller"));
        assert_eq!(record.join_date.as_deref(), Some("2023-04-01"));
        assert_eq!(record.support_history.len(), 1);
        assert!(record.email.is_none());
        assert!(record.plan.is_none());
    }

    #[tokio::test]
    async fn test_full_variant_returns_everything() {
        let directory = seeded();
        let record = directory
            .lookup(&id("CUST001"), QueryVariant::Full)
            .await
            .unwrap();

        assert_eq!(record.customer_id, "CUST001");
        assert!(record.name.is_some());
        assert!(record.email.is_some());
        assert!(record.plan.is_some());
        assert!(record.join_date.is_some());
        assert!(record.last_payment.is_some());
    }

    #[tokio::test]
    async fn test_unknown_customer_is_not_found() {
        let directory = seeded();
        let err = directory
            .lookup(&id("CUST999"), QueryVariant::Full)
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let directory = seeded();
        directory
            .upsert(&CustomerRecord {
                customer_id: "CUST001".to_string(),
                name: Some("Anna Keller-Iten".to_string()),
                ..Default::default()
            })
            .unwrap();

        let record = directory
            .lookup(&id("CUST001"), QueryVariant::Full)
            .await
            .unwrap();
        assert_eq!(record.name.as_deref(), Some("Anna Keller-Iten"));
    }
}
