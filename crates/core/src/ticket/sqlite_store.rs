//! SQLite-backed ticket store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::{StoredTicket, Ticket, TicketClassification, TicketError, TicketStore};
use crate::audit::AuditTrace;

/// SQLite-backed ticket store.
///
/// The full classification is stored as JSON; category and urgency are
/// additionally stored as plain columns so tickets can be filtered
/// without JSON functions.
pub struct SqliteTicketStore {
    conn: Mutex<Connection>,
}

impl SqliteTicketStore {
    /// Create a new SQLite ticket store, creating the database file and
    /// tables if needed.
    pub fn new(path: &Path) -> Result<Self, TicketError> {
        let conn = Connection::open(path).map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite ticket store (useful for testing).
    pub fn in_memory() -> Result<Self, TicketError> {
        let conn =
            Connection::open_in_memory().map_err(|e| TicketError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), TicketError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                received_at TEXT NOT NULL,
                customer_id TEXT,
                ticket_type TEXT NOT NULL,
                urgency TEXT NOT NULL,
                classification TEXT NOT NULL,
                incoming_content TEXT NOT NULL,
                recommended_answer TEXT,
                trace TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_tickets_customer_id ON tickets(customer_id);
            CREATE INDEX IF NOT EXISTS idx_tickets_ticket_type ON tickets(ticket_type);
            CREATE INDEX IF NOT EXISTS idx_tickets_received_at ON tickets(received_at);
            "#,
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(())
    }

    fn row_to_ticket(row: &rusqlite::Row) -> rusqlite::Result<StoredTicket> {
        let id: String = row.get(0)?;
        let received_at_str: String = row.get(1)?;
        let customer_id: Option<String> = row.get(2)?;
        let classification_json: String = row.get(3)?;
        let raw_text: String = row.get(4)?;
        let reply: Option<String> = row.get(5)?;
        let trace_json: Option<String> = row.get(6)?;

        let received_at = DateTime::parse_from_rfc3339(&received_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let classification: TicketClassification = serde_json::from_str(&classification_json)
            .unwrap_or_else(|_| TicketClassification::fallback());

        let trace: Option<AuditTrace> = trace_json.and_then(|json| serde_json::from_str(&json).ok());

        Ok(StoredTicket {
            id,
            received_at,
            customer_id,
            classification,
            raw_text,
            reply,
            trace,
        })
    }
}

impl TicketStore for SqliteTicketStore {
    fn record_ticket(
        &self,
        ticket: &Ticket,
        classification: &TicketClassification,
    ) -> Result<String, TicketError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let classification_json = serde_json::to_string(classification)
            .map_err(|e| TicketError::Serialization(e.to_string()))?;

        conn.execute(
            "INSERT INTO tickets (id, received_at, customer_id, ticket_type, urgency, classification, incoming_content)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params![
                id,
                Utc::now().to_rfc3339(),
                ticket.customer_id.as_ref().map(|c| c.as_str()),
                classification.category.as_str(),
                classification.urgency.as_str(),
                classification_json,
                ticket.raw_text,
            ],
        )
        .map_err(|e| TicketError::Database(e.to_string()))?;

        Ok(id)
    }

    fn record_resolution(
        &self,
        ticket_id: &str,
        reply: &str,
        trace: &AuditTrace,
    ) -> Result<(), TicketError> {
        let conn = self.conn.lock().unwrap();

        let trace_json =
            serde_json::to_string(trace).map_err(|e| TicketError::Serialization(e.to_string()))?;

        let updated = conn
            .execute(
                "UPDATE tickets SET recommended_answer = ?, trace = ? WHERE id = ?",
                params![reply, trace_json, ticket_id],
            )
            .map_err(|e| TicketError::Database(e.to_string()))?;

        if updated == 0 {
            return Err(TicketError::NotFound(ticket_id.to_string()));
        }

        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<StoredTicket>, TicketError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row(
            "SELECT id, received_at, customer_id, classification, incoming_content, recommended_answer, trace
             FROM tickets WHERE id = ?",
            params![id],
            Self::row_to_ticket,
        )
        .optional()
        .map_err(|e| TicketError::Database(e.to_string()))
    }

    fn count(&self) -> Result<i64, TicketError> {
        let conn = self.conn.lock().unwrap();

        conn.query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))
            .map_err(|e| TicketError::Database(e.to_string()))
    }
}
