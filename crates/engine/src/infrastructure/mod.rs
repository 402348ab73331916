//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod clock;
pub mod config;
pub mod export;
pub mod importers;
pub mod memory_catalog;
pub mod openai;
pub mod ports;
pub mod record_store;
