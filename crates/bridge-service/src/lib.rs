//! HTTP front end of the topic bridge.
//!
//! Exposes a single job endpoint, `POST /`, which hands the raw body to the
//! submission orchestrator and writes back the encoded response.

pub mod api;
