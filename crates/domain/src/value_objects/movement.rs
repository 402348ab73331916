//! Movement speeds parsed from free-text distance strings.

use std::sync::LazyLock;

use regex_lite::Regex;
use serde::{Deserialize, Serialize};

static DIGIT_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Movement speeds in feet. Only walking speed is derived from generated text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walk: Option<u32>,
}

impl Movement {
    /// Parse a movement string such as "30 ft." or "speed 40ft, fly 60ft".
    ///
    /// The first run of digits becomes the walking speed. Strings without
    /// digits leave movement empty.
    pub fn parse(raw: &str) -> Self {
        let walk = DIGIT_RUN_RE
            .find(raw)
            .and_then(|m| m.as_str().parse::<u32>().ok());
        Self { walk }
    }

    pub fn is_empty(&self) -> bool {
        self.walk.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_first_digit_run() {
        assert_eq!(Movement::parse("30 ft.").walk, Some(30));
        assert_eq!(Movement::parse("walk 40ft, fly 60ft").walk, Some(40));
    }

    #[test]
    fn no_digits_leaves_movement_empty() {
        assert!(Movement::parse("fast").is_empty());
        assert!(Movement::parse("").is_empty());
    }

    #[test]
    fn overflowing_digit_run_is_ignored() {
        assert!(Movement::parse("99999999999999999999 ft").is_empty());
    }
}
