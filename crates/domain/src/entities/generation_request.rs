//! Parameters for one generation call.

use crate::error::DomainError;

/// Token budget used when the caller does not supply a positive one.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// A request to generate a batch of NPCs.
///
/// `count` is always at least 1 and `max_tokens` always positive; both
/// invariants are enforced at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    count: u32,
    free_text_prompt: Option<String>,
    model: String,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(count: u32, model: impl Into<String>) -> Result<Self, DomainError> {
        if count == 0 {
            return Err(DomainError::validation("count must be at least 1"));
        }
        Ok(Self {
            count,
            free_text_prompt: None,
            model: model.into(),
            temperature: 0.8,
            top_p: 1.0,
            max_tokens: DEFAULT_MAX_TOKENS,
        })
    }

    /// Attach free-text direction. Blank text is treated as absent.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.free_text_prompt = if prompt.trim().is_empty() {
            None
        } else {
            Some(prompt.trim().to_string())
        };
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = top_p;
        self
    }

    /// Set the token budget. Absent or non-positive values fall back to
    /// [`DEFAULT_MAX_TOKENS`].
    pub fn with_max_tokens(mut self, max_tokens: Option<i64>) -> Self {
        self.max_tokens = max_tokens
            .filter(|t| *t > 0)
            .and_then(|t| u32::try_from(t).ok())
            .unwrap_or(DEFAULT_MAX_TOKENS);
        self
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn free_text_prompt(&self) -> Option<&str> {
        self.free_text_prompt.as_deref()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn temperature(&self) -> f32 {
        self.temperature
    }

    pub fn top_p(&self) -> f32 {
        self.top_p
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}
