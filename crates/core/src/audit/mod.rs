//! Audit recording: per-ticket traces plus a persistent event stream.

mod events;
mod handle;
mod sqlite;
mod store;
mod trace;
mod writer;

pub use events::*;
pub use handle::*;
pub use sqlite::*;
pub use store::*;
pub use trace::*;
pub use writer::*;
