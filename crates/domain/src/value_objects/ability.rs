//! The six ability scores shared by D&D-like rule systems.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// One of the six abilities, keyed by its three-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    /// All abilities in sheet order.
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    /// Lowercase three-letter code used as the record key.
    pub fn code(&self) -> &'static str {
        match self {
            Ability::Str => "str",
            Ability::Dex => "dex",
            Ability::Con => "con",
            Ability::Int => "int",
            Ability::Wis => "wis",
            Ability::Cha => "cha",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            Ability::Str => "strength",
            Ability::Dex => "dexterity",
            Ability::Con => "constitution",
            Ability::Int => "intelligence",
            Ability::Wis => "wisdom",
            Ability::Cha => "charisma",
        }
    }

    /// Lenient lookup accepting codes and full names in any case.
    pub fn from_key(key: &str) -> Option<Ability> {
        let key = key.trim().to_lowercase();
        Ability::ALL
            .into_iter()
            .find(|a| a.code() == key || a.full_name() == key)
    }
}

impl fmt::Display for Ability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Ability {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ability::from_key(s).ok_or_else(|| DomainError::parse(format!("Unknown ability: {}", s)))
    }
}
