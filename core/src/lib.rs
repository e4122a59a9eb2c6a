//! In-memory query engine over a dataset of financial transfer records.

pub mod config;
pub mod engine;
pub mod error;
pub mod fraud;
pub mod grouping;
pub mod loader;
pub mod record;
pub mod rng;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod synthetic;
pub mod timeline;
pub mod types;
