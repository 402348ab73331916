//! Skill name to internal skill code mapping.

/// Human-readable skill key to the three-letter code the host sheet uses.
///
/// Keys are stored in folded form (lowercase, no separators) so that
/// "Sleight of Hand", "sleight_of_hand" and "sleightOfHand" all resolve.
pub const SKILL_CODES: [(&str, &str); 18] = [
    ("acrobatics", "acr"),
    ("animalhandling", "ani"),
    ("arcana", "arc"),
    ("athletics", "ath"),
    ("deception", "dec"),
    ("history", "his"),
    ("insight", "ins"),
    ("intimidation", "itm"),
    ("investigation", "inv"),
    ("medicine", "med"),
    ("nature", "nat"),
    ("perception", "prc"),
    ("performance", "prf"),
    ("persuasion", "per"),
    ("religion", "rel"),
    ("sleightofhand", "slt"),
    ("stealth", "ste"),
    ("survival", "sur"),
];

fn fold_key(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Map a skill name to its internal code. Unknown names yield `None`.
pub fn skill_code(name: &str) -> Option<&'static str> {
    let folded = fold_key(name);
    SKILL_CODES
        .iter()
        .find(|(key, _)| *key == folded)
        .map(|(_, code)| *code)
}
