//! Use cases - User story orchestration.
//!
//! Each module contains use cases for a specific domain area.

pub mod npc_generation;

pub use npc_generation::{
    GenerateNpcs, GenerationError, GenerationOutcome, GenerationSummary, RecordFailure,
    RecordOutcome,
};
