//! Domain entities.

mod character;
mod generation_request;
mod item;

pub use character::{AbilityScores, NormalizedCharacter, DEFAULT_ABILITY_SCORE, DEFAULT_NPC_NAME};
pub use generation_request::{GenerationRequest, DEFAULT_MAX_TOKENS};
pub use item::{CatalogRecord, ItemSource, ItemSpec};
