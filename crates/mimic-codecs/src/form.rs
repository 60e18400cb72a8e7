//! `application/x-www-form-urlencoded` codec, also used for query strings.

use mimic_core::{FormatLabel, RedactionResult};
use mimic_redact::RedactionContext;
use url::form_urlencoded;

use crate::{CodecError, Result};

pub type Pairs = Vec<(String, String)>;

/// Decode `text` into key/value pairs. Fails when there is no `=` at all or
/// nothing decodes.
pub fn parse(text: &str) -> Result<Pairs> {
    if !text.contains('=') {
        return Err(CodecError::Form("no key/value separator".to_string()));
    }
    let body = text.strip_prefix('?').unwrap_or(text);
    let pairs: Pairs = form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        return Err(CodecError::Form("no parameters found".to_string()));
    }
    Ok(pairs)
}

/// Top-level probe: also rejects text that is clearly another grammar.
pub fn parse_document(text: &str) -> Result<Pairs> {
    let trimmed = text.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('<') || trimmed.starts_with("HTTP/") {
        return Err(CodecError::Form(
            "looks like another document type".to_string(),
        ));
    }
    parse(trimmed)
}

pub fn serialize(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

pub fn redact_pairs(pairs: &[(String, String)], ctx: &RedactionContext<'_>) -> Pairs {
    let settings = ctx.settings;
    pairs
        .iter()
        .map(|(key, value)| {
            if ctx.is_protected(key) {
                return (key.clone(), value.clone());
            }
            let name = if settings.redact_param_names {
                ctx.redact_string(key)
            } else {
                key.clone()
            };
            let value = if settings.redact_csrf && key.to_lowercase().contains("csrf") {
                ctx.redact_string(value)
            } else {
                ctx.redact_primitive(value).into_text()
            };
            (name, value)
        })
        .collect()
}

pub fn redact(text: &str, ctx: &RedactionContext<'_>) -> Result<RedactionResult> {
    let pairs = parse_document(text)?;
    let redacted = redact_pairs(&pairs, ctx);
    Ok(RedactionResult::new(
        serialize(&pairs),
        serialize(&redacted),
        FormatLabel::FormUrlEncoded,
    ))
}

pub fn redact_body(text: &str, ctx: &RedactionContext<'_>) -> Result<String> {
    let pairs = parse(text)?;
    Ok(serialize(&redact_pairs(&pairs, ctx)))
}

/// Redact a URL query string (without the leading `?`). A query with no
/// pairs at all is returned unchanged.
pub fn redact_query(query: &str, ctx: &RedactionContext<'_>) -> String {
    let pairs: Pairs = form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if pairs.is_empty() {
        return query.to_string();
    }
    serialize(&redact_pairs(&pairs, ctx))
}
