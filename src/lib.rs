//! # Newsletter Brands Library
//!
//! Resolves newsletter senders onto deduplicated brand records and records
//! ingested newsletters against them.

pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod ingest;
pub mod models;
pub mod repositories;
pub mod resolver;
pub mod summarize;
pub mod telemetry;
pub use migration;
