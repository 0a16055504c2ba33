//! Core library for the admissions and enrollment reconciliation service.
//!
//! The `pipeline` module carries the domain: enquiry intake and
//! administration, enrollment records, the installment ledger, admission
//! confirmations, cohort reconciliation queries, and the dashboard
//! aggregator. `config`, `telemetry`, and `error` are the service plumbing
//! shared with the API binary.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod telemetry;
