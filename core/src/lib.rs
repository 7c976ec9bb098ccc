//! # lanprobe core
//!
//! The discovery → scan → classify → probe pipeline.
//!
//! * **[`discovery`]**: the run-level use case. Consumes discovered hosts and aggregates the report.
//! * **[`scanner`]**: per-host port scan, classification and dispatch to interactions.
//! * **[`interact`]**: one-shot HTTP and SSH exchanges.
//! * **[`network`]**: transport adapters (TCP probing, the mDNS browser).

pub mod discovery;
pub mod interact;
pub mod network;
pub mod scanner;
