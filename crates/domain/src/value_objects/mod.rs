//! Value objects: small, immutable types with parsing rules attached.

mod ability;
mod challenge_rating;
mod movement;
mod skills;

pub use ability::Ability;
pub use challenge_rating::{
    challenge_rating_or_random, parse_challenge_rating, parse_challenge_rating_str,
    CR_FALLBACK_RANGE,
};
pub use movement::Movement;
pub use skills::{skill_code, SKILL_CODES};
