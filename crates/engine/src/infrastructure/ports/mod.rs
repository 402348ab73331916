//! Port traits for infrastructure boundaries.
//!
//! These are the only abstractions in the engine. Ports exist for:
//! - Text generation (OpenAI-compatible today, any chat service tomorrow)
//! - Reference catalogs (5etools data, in-memory)
//! - Host record creation
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;
pub mod types;

pub use error::{CatalogError, LlmError, RecordStoreError};

pub use external::{
    ChatMessage, FinishReason, LlmPort, LlmRequest, LlmResponse, MessageRole, TokenUsage,
};

pub use repos::{CatalogPort, RecordStorePort};

pub use types::{CatalogIndexEntry, CatalogInfo, CatalogKind, RecordHandle, SPELL_CATALOG_ID};

#[cfg(test)]
pub use repos::MockRecordStorePort;

#[cfg(test)]
pub use testing::MockClockPort;

pub use testing::{ClockPort, RandomPort};
