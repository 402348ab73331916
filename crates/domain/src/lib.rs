//! Pure domain model for NPC generation.
//!
//! Nothing in this crate performs I/O. Randomness is passed in by the
//! caller so normalization stays deterministic under test.

pub mod entities;
pub mod error;
pub mod game_systems;
pub mod normalize;
pub mod value_objects;

pub use entities::{
    AbilityScores, CatalogRecord, GenerationRequest, ItemSource, ItemSpec, NormalizedCharacter,
    DEFAULT_ABILITY_SCORE, DEFAULT_MAX_TOKENS, DEFAULT_NPC_NAME,
};

pub use error::DomainError;

pub use game_systems::{
    Dnd5eSystem, HostTypes, RuleSystem, RuleSystemRegistry, TypeProvider, TypeRegistry,
    FALLBACK_RECORD_TYPE,
};

pub use normalize::{RecordDraft, RecordNormalizer, ValidationWarning};

pub use value_objects::{
    challenge_rating_or_random, parse_challenge_rating, skill_code, Ability, Movement,
    CR_FALLBACK_RANGE,
};
