//! Shared types for the topic bridge.
//!
//! Holds the job wire format accepted from the scheduler, the typed
//! submission request derived from it, ledger entity identifiers and the
//! receipt model returned by ledger clients.

pub mod entity;
pub mod job;
pub mod ledger;

pub use entity::*;
pub use job::*;
pub use ledger::*;
