//! Execution coordinator for the ticket pipeline.
//!
//! Runs the stages of one ticket in fixed order (classification,
//! customer lookup, technical resolution, reply generation), degrading
//! gracefully on stage failures and recording everything in the trace.

mod runner;
mod types;

pub use runner::TicketOrchestrator;
pub use types::{OrchestratorError, ProcessedTicket};
