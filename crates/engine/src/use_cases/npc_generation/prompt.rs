//! Prompt contract for NPC generation.
//!
//! The template is fixed. Only the NPC count and the allowed item types are
//! substituted; free-text direction, when given, is appended as one line.

use std::collections::BTreeSet;

use npcsmith_domain::{normalize::FALLBACK_ITEM_TYPE, GenerationRequest};

use crate::infrastructure::ports::{ChatMessage, LlmRequest};

const NPC_PROMPT_TEMPLATE: &str = r#"Generate {count} unique non-player characters for a Dungeons & Dragons 5th Edition game.

Return a JSON array containing exactly {count} NPC objects. If your output must be a single JSON object, return {"npcs": [ ... ]} with the array inside.

Each NPC object has these fields:
- "name": string
- "type": "npc"
- "description": short biography, 2-3 sentences
- "species": string
- "background": string
- "abilities": {"str": int, "dex": int, "con": int, "int": int, "wis": int, "cha": int}
- "hp": int
- "cr": challenge rating as a number or fraction string, e.g. 5 or "1/2"
- "savingThrows": array of ability codes the NPC is proficient in, e.g. ["dex", "wis"]
- "skills": object mapping skill name to 1 (proficient) or 2 (expertise), e.g. {"Stealth": 2}
- "movementSpeed": string such as "30 ft."
- "actions": array of action names
- "legendaryActions": array of legendary action names, only when cr is 12 or higher
- "items": array of {"name": string, "type": one of [{item_types}], "system": object with data for that item type}

Scale with challenge rating:
- CR 0-4: 1-2 actions, spells up to level 2
- CR 5-10: 2-3 actions, spells up to level 5
- CR 11-16: 3-4 actions, spells up to level 7, legendary actions from CR 12
- CR 17+: 4-5 actions, spells up to level 9

Spells must be listed as items of type "spell" and must be official D&D 5th Edition spells. Do not invent spells.
Respond with JSON only."#;

/// Render the prompt text.
pub fn build_prompt(
    count: u32,
    item_types: &BTreeSet<String>,
    free_text: Option<&str>,
) -> String {
    let item_types = if item_types.is_empty() {
        format!("\"{}\"", FALLBACK_ITEM_TYPE)
    } else {
        item_types
            .iter()
            .map(|t| format!("\"{}\"", t))
            .collect::<Vec<_>>()
            .join(", ")
    };

    let mut prompt = NPC_PROMPT_TEMPLATE
        .replace("{count}", &count.to_string())
        .replace("{item_types}", &item_types);

    if let Some(direction) = free_text.map(str::trim).filter(|t| !t.is_empty()) {
        prompt.push_str("\nNPC direction: ");
        prompt.push_str(&direction.replace('\n', " "));
    }
    prompt
}

/// Build the single-message chat request for `request`.
pub fn build_request(request: &GenerationRequest, item_types: &BTreeSet<String>) -> LlmRequest {
    let prompt = build_prompt(request.count(), item_types, request.free_text_prompt());

    LlmRequest::new(vec![ChatMessage::user(prompt)])
        .with_model(request.model())
        .with_temperature(request.temperature())
        .with_top_p(request.top_p())
        .with_max_tokens(Some(request.max_tokens()))
        .with_json_response()
}
