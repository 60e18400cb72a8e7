use std::fmt;

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use uuid::Uuid;

use crate::context::RedactionContext;
use crate::date;
use crate::number::{self, FakeNumber};

lazy_static! {
    static ref UUID_PATTERN: Regex = Regex::new(
        r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$"
    )
    .unwrap();
}

/// Fake replacement for a scalar, typed after what the original looked like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeValue {
    Bool(bool),
    Number(FakeNumber),
    Text(String),
}

impl FakeValue {
    pub fn into_text(self) -> String {
        match self {
            FakeValue::Text(text) => text,
            other => other.to_string(),
        }
    }
}

impl fmt::Display for FakeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FakeValue::Bool(value) => write!(f, "{}", value),
            FakeValue::Number(number) => write!(f, "{}", number),
            FakeValue::Text(text) => f.write_str(text),
        }
    }
}

/// Classify `value` and produce a fake of the same kind.
///
/// Checked in order: boolean literal, UUID, date, numeric literal, free text.
/// Only the free-text path sees the untrimmed value.
pub fn redact_primitive(ctx: &RedactionContext<'_>, value: &str) -> FakeValue {
    let trimmed = value.trim();

    if trimmed == "true" || trimmed == "false" {
        return FakeValue::Bool(rand::thread_rng().r#gen());
    }
    if UUID_PATTERN.is_match(trimmed) {
        return FakeValue::Text(Uuid::new_v4().to_string());
    }
    if let Some(fake) = date::redact_date(trimmed) {
        return FakeValue::Text(fake);
    }
    if let Some(fake) = number::redact_number(trimmed) {
        return FakeValue::Number(fake);
    }
    FakeValue::Text(ctx.redact_string(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::NumberKind;
    use mimic_core::{Dictionary, RedactionSettings};

    fn redact(value: &str) -> FakeValue {
        let settings = RedactionSettings::default();
        let dictionary = Dictionary::from_words(["hello", "world", "spam"]);
        let ctx = RedactionContext::new(&settings, &dictionary);
        redact_primitive(&ctx, value)
    }

    #[test]
    fn test_boolean() {
        assert!(matches!(redact(" true "), FakeValue::Bool(_)));
        assert!(matches!(redact("false"), FakeValue::Bool(_)));
        assert!(matches!(redact("True"), FakeValue::Text(_)));
    }

    #[test]
    fn test_uuid_is_regenerated() {
        let original = "3F2504E0-4F89-11D3-9A0C-0305E82C3301";
        match redact(original) {
            FakeValue::Text(fake) => {
                assert_ne!(fake, original);
                let parsed = Uuid::parse_str(&fake).unwrap();
                assert_eq!(parsed.get_version_num(), 4);
            }
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_date_keeps_template() {
        let fake = redact("2021-07-04").into_text();
        assert!(date::is_date(&fake));
        assert_eq!(fake.len(), 10);
    }

    #[test]
    fn test_number() {
        match redact("30") {
            FakeValue::Number(fake) => {
                assert_eq!(fake.literal().len(), 2);
                assert_eq!(fake.kind(), NumberKind::Integer);
            }
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_free_text_keeps_surrounding_whitespace() {
        let fake = redact("  Hello world ").into_text();
        assert!(fake.starts_with("  ") && fake.ends_with(' '));
        assert_eq!(fake.len(), "  Hello world ".len());
        assert!(fake[2..3].chars().all(|c| c.is_ascii_uppercase()));
    }
}
