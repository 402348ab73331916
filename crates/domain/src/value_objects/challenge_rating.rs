//! Challenge rating parsing.
//!
//! Generated records express CR as numbers ("cr": 5), fractions ("1/2")
//! or decimal strings ("12.5"). Everything is reduced to a finite `f64`.

use serde_json::Value;

/// Inclusive range used when a CR cannot be parsed.
pub const CR_FALLBACK_RANGE: (i32, i32) = (1, 20);

/// Parse a raw challenge rating value.
///
/// Returns `None` when the value is absent, non-numeric, non-finite, or a
/// fraction with a zero denominator.
pub fn parse_challenge_rating(raw: &Value) -> Option<f64> {
    match raw {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_challenge_rating_str(s),
        _ => None,
    }
}

/// String form of [`parse_challenge_rating`].
pub fn parse_challenge_rating_str(raw: &str) -> Option<f64> {
    let raw = raw.trim();

    if let Some((numerator, denominator)) = raw.split_once('/') {
        let numerator = parse_finite(numerator)?;
        let denominator = parse_finite(denominator)?;
        if denominator == 0.0 {
            return None;
        }
        return Some(numerator / denominator).filter(|v| v.is_finite());
    }

    parse_finite(raw)
}

/// Parse a CR, substituting a uniformly random integer from
/// [`CR_FALLBACK_RANGE`] when parsing fails.
///
/// `gen_range` receives the inclusive bounds and must return a value in them.
pub fn challenge_rating_or_random(raw: &Value, gen_range: impl FnOnce(i32, i32) -> i32) -> f64 {
    match parse_challenge_rating(raw) {
        Some(cr) => cr,
        None => {
            let (min, max) = CR_FALLBACK_RANGE;
            f64::from(gen_range(min, max).clamp(min, max))
        }
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_fractions() {
        assert_eq!(parse_challenge_rating(&json!("1/2")), Some(0.5));
        assert_eq!(parse_challenge_rating(&json!("1/8")), Some(0.125));
        assert_eq!(parse_challenge_rating(&json!(" 1 / 4 ")), Some(0.25));
    }

    #[test]
    fn parses_whole_and_decimal_strings() {
        assert_eq!(parse_challenge_rating(&json!("3")), Some(3.0));
        assert_eq!(parse_challenge_rating(&json!("12.5")), Some(12.5));
    }

    #[test]
    fn accepts_finite_numbers_as_is() {
        assert_eq!(parse_challenge_rating(&json!(7)), Some(7.0));
        assert_eq!(parse_challenge_rating(&json!(0.25)), Some(0.25));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_challenge_rating(&json!("abc")), None);
        assert_eq!(parse_challenge_rating(&json!("4/0")), None);
        assert_eq!(parse_challenge_rating(&json!("x/2")), None);
        assert_eq!(parse_challenge_rating(&json!("NaN")), None);
        assert_eq!(parse_challenge_rating(&json!("inf")), None);
        assert_eq!(parse_challenge_rating(&json!(null)), None);
        assert_eq!(parse_challenge_rating(&json!(true)), None);
        assert_eq!(parse_challenge_rating(&json!([1])), None);
    }

    #[test]
    fn random_fallback_only_on_failure() {
        assert_eq!(challenge_rating_or_random(&json!("1/2"), |_, _| 17), 0.5);
        assert_eq!(challenge_rating_or_random(&json!("abc"), |_, _| 17), 17.0);
    }

    #[test]
    fn random_fallback_uses_one_to_twenty() {
        let mut seen = None;
        challenge_rating_or_random(&json!(null), |min, max| {
            seen = Some((min, max));
            min
        });
        assert_eq!(seen, Some((1, 20)));
    }
}
