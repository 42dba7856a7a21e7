//! Ticket data model and persistence.

mod sqlite_store;
mod store;
mod types;

pub use sqlite_store::SqliteTicketStore;
pub use store::{StoredTicket, TicketError, TicketStore};
pub use types::{
    Category, CustomerId, CustomerRecord, EstimatedEffort, Sentiment, TechnicalResolution, Ticket,
    TicketClassification, Urgency,
};
