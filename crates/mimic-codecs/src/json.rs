//! JSON codec
//!
//! Numbers are read with `arbitrary_precision`, so every number node still
//! carries its source literal and number redaction never goes through a
//! lossy float.

use mimic_core::{FormatLabel, Preferences, RedactionResult};
use mimic_redact::{FakeNumber, RedactionContext};
use rand::Rng;
use serde_json::{Map, Value};

use crate::Result;

pub fn parse(text: &str) -> Result<Value> {
    Ok(serde_json::from_str(text)?)
}

pub fn pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Recursively order object keys alphabetically.
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// True when a key names an anti-forgery token and CSRF redaction is on.
pub(crate) fn is_csrf_key(key: &str, ctx: &RedactionContext<'_>) -> bool {
    if !ctx.settings.redact_csrf {
        return false;
    }
    let lower = key.to_lowercase();
    lower.contains("csrf") || lower.contains("xsrf")
}

/// Redact one node; `key` is the object key it sits under, if any.
pub fn redact_value(value: &Value, key: Option<&str>, ctx: &RedactionContext<'_>) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    if let Some(key) = key {
        if ctx.is_protected(key) {
            return value.clone();
        }
        if is_csrf_key(key, ctx) {
            let text = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            return Value::String(ctx.redact_string(&text));
        }
    }

    match value {
        Value::Null => Value::Null,
        Value::Bool(_) => Value::Bool(rand_bool()),
        Value::Number(number) => match ctx.redact_number(&number.to_string()) {
            Some(fake) => number_value(&fake),
            None => value.clone(),
        },
        Value::String(s) => Value::String(ctx.redact_primitive(s).into_text()),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| redact_value(item, None, ctx))
                .collect(),
        ),
        Value::Object(map) => {
            let mut out = Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), redact_value(v, Some(k), ctx));
            }
            Value::Object(out)
        }
    }
}

fn number_value(fake: &FakeNumber) -> Value {
    serde_json::from_str::<serde_json::Number>(fake.literal())
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(fake.literal().to_string()))
}

fn rand_bool() -> bool {
    rand::thread_rng().r#gen()
}

/// Top-level JSON document: both sides pretty-printed, optionally key-sorted.
pub fn redact(
    text: &str,
    ctx: &RedactionContext<'_>,
    prefs: &Preferences,
) -> Result<RedactionResult> {
    let data = parse(text)?;
    let redacted = redact_value(&data, None, ctx);

    let (input, output) = if prefs.sort_keys {
        (sort_keys(data), sort_keys(redacted))
    } else {
        (data, redacted)
    };

    Ok(RedactionResult::new(
        pretty(&input)?,
        pretty(&output)?,
        FormatLabel::Json,
    ))
}

/// JSON message body: redacted and pretty-printed.
pub fn redact_body(text: &str, ctx: &RedactionContext<'_>) -> Result<String> {
    let data = parse(text)?;
    pretty(&redact_value(&data, None, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{Dictionary, RedactionSettings};

    fn dictionary() -> Dictionary {
        Dictionary::from_words(["hello", "world", "green", "apple"])
    }

    #[test]
    fn test_scenario_simple_object() {
        let settings = RedactionSettings::default();
        let dictionary = dictionary();
        let ctx = RedactionContext::new(&settings, &dictionary);

        let result = redact(r#"{"a":1,"b":"hello"}"#, &ctx, &Preferences::default()).unwrap();
        assert_eq!(result.format, FormatLabel::Json);
        assert_eq!(result.input, "{\n  \"a\": 1,\n  \"b\": \"hello\"\n}");

        let output: Value = serde_json::from_str(&result.output).unwrap();
        let keys: Vec<_> = output.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(output["a"].is_i64());
        let b = output["b"].as_str().unwrap();
        assert_eq!(b.len(), 5);
        assert_eq!(b, b.to_lowercase());
    }

    #[test]
    fn test_number_literals_are_preserved_exactly() {
        let settings = RedactionSettings::default();
        let dictionary = dictionary();
        let ctx = RedactionContext::new(&settings, &dictionary);

        let original = r#"{"big":123456789012345678901234567890,"price":10.50,"sci":1.5e10}"#;
        let output = redact_body(original, &ctx).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();

        let big = value["big"].to_string();
        assert_eq!(big.len(), 30);
        assert!(big.chars().all(|c| c.is_ascii_digit()));

        let price = value["price"].to_string();
        assert_eq!(price.len(), 5);
        assert_eq!(&price[2..3], ".");

        let sci = value["sci"].to_string();
        assert!(sci.contains('e'));
        assert_eq!(sci.len(), 6);
    }

    #[test]
    fn test_protected_and_null_values_untouched() {
        let settings = RedactionSettings::default().with_protected_fields(["user_id"]);
        let dictionary = dictionary();
        let ctx = RedactionContext::new(&settings, &dictionary);

        let data = parse(r#"{"userId":{"deep":"secret"},"User-Id":42,"gone":null}"#).unwrap();
        let out = redact_value(&data, None, &ctx);
        assert_eq!(out["userId"], data["userId"]);
        assert_eq!(out["User-Id"], data["User-Id"]);
        assert!(out["gone"].is_null());
    }

    #[test]
    fn test_csrf_keys_force_string_redaction() {
        let settings = RedactionSettings::default();
        let dictionary = dictionary();
        let ctx = RedactionContext::new(&settings, &dictionary);

        let data = parse(r#"{"X-CSRF":12345,"nested":[{"xsrfToken":"abc-DEF"}]}"#).unwrap();
        let out = redact_value(&data, None, &ctx);
        let csrf = out["X-CSRF"].as_str().unwrap();
        assert_eq!(csrf.len(), 5);
        let token = out["nested"][0]["xsrfToken"].as_str().unwrap();
        assert_eq!(token.len(), 7);
        assert_eq!(&token[3..4], "-");
    }

    #[test]
    fn test_shape_is_preserved() {
        let settings = RedactionSettings::default();
        let dictionary = dictionary();
        let ctx = RedactionContext::new(&settings, &dictionary);

        let data = parse(r#"{"list":[1,[true,false],{"x":"y"}],"flag":true,"empty":{}}"#).unwrap();
        let out = redact_value(&data, None, &ctx);
        assert_eq!(out["list"].as_array().unwrap().len(), 3);
        assert_eq!(out["list"][1].as_array().unwrap().len(), 2);
        assert!(out["list"][1][0].is_boolean());
        assert!(out["list"][2]["x"].is_string());
        assert!(out["flag"].is_boolean());
        assert!(out["empty"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_sort_keys_preference() {
        let settings = RedactionSettings::default();
        let dictionary = dictionary();
        let ctx = RedactionContext::new(&settings, &dictionary);
        let prefs = Preferences { sort_keys: true };

        let result = redact(r#"{"b":{"z":1,"a":2},"a":3}"#, &ctx, &prefs).unwrap();
        let input: Value = serde_json::from_str(&result.input).unwrap();
        let output: Value = serde_json::from_str(&result.output).unwrap();
        for value in [input, output] {
            let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
            assert_eq!(keys, vec!["a", "b"]);
            let inner: Vec<_> = value["b"].as_object().unwrap().keys().cloned().collect();
            assert_eq!(inner, vec!["a", "z"]);
        }
    }
}
