//! Submission pipeline: decode the job body, submit it to the ledger once,
//! and encode the outcome for the scheduler.

pub mod decoder;
pub mod encoder;
mod error;
pub mod orchestrator;

pub use error::BridgeError;
pub use orchestrator::{Outcome, Submission, SubmissionOrchestrator, SubmissionState};
