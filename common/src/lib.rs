//! Shared data model for the discovery → scan → classify → probe pipeline.
//!
//! Nothing in this crate performs I/O. The types here are produced and
//! consumed by `lanprobe-core` and rendered by `lanprobe-cli`.

pub mod config;
pub mod network;
pub mod service;
pub mod stats;
