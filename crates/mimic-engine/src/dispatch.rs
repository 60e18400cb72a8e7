//! Format dispatch with fallback
//!
//! The codec for the given label runs first. If it fails, the structural
//! codecs are tried in a fixed order and line-wise plain text ends the chain,
//! so a result is always produced and a degraded one says so in its label.

use mimic_codecs::{CodecError, csv, form, http, json, redact_plain_text, xml, yaml};
use mimic_core::{FormatLabel, Preferences, RedactionResult};
use mimic_redact::RedactionContext;
use tracing::{debug, warn};

const FALLBACK_ORDER: [FormatLabel; 5] = [
    FormatLabel::Json,
    FormatLabel::Yaml,
    FormatLabel::Xml,
    FormatLabel::FormUrlEncoded,
    FormatLabel::CsvWithHeader,
];

fn run(
    format: FormatLabel,
    text: &str,
    trimmed: &str,
    ctx: &RedactionContext<'_>,
    prefs: &Preferences,
) -> Result<RedactionResult, CodecError> {
    match format {
        FormatLabel::HttpRequest | FormatLabel::HttpResponse => http::redact(text, ctx, prefs),
        FormatLabel::Json => json::redact(trimmed, ctx, prefs),
        FormatLabel::Xml => xml::redact(trimmed, ctx),
        FormatLabel::Yaml => yaml::redact(trimmed, ctx),
        FormatLabel::FormUrlEncoded => form::redact(trimmed, ctx),
        FormatLabel::CsvWithHeader | FormatLabel::CsvNoHeader => csv::redact(trimmed, ctx),
        FormatLabel::PlainText => Ok(redact_plain_text(text, ctx)),
        FormatLabel::Empty => Ok(RedactionResult::empty()),
    }
}

/// Redact `text` as `format`. `trimmed` is `text` without surrounding
/// whitespace; structured grammars read it, HTTP and plain text read `text`.
pub fn compute(
    format: FormatLabel,
    text: &str,
    trimmed: &str,
    ctx: &RedactionContext<'_>,
    prefs: &Preferences,
) -> RedactionResult {
    if format == FormatLabel::Empty || trimmed.is_empty() {
        return RedactionResult::empty();
    }

    match run(format, text, trimmed, ctx, prefs) {
        Ok(result) => {
            debug!("Redacted as {}", result.format);
            return result;
        }
        Err(err) => warn!("{} codec failed, trying fallbacks: {}", format, err),
    }

    for candidate in FALLBACK_ORDER {
        if candidate == format || (candidate.is_csv() && format.is_csv()) {
            continue;
        }
        if candidate.is_csv() && !csv::is_likely_csv(trimmed) {
            continue;
        }
        if let Ok(result) = run(candidate, text, trimmed, ctx, prefs) {
            debug!("Fell back to {}", result.format);
            return result;
        }
    }

    warn!("No structural codec accepted the input, processed as Plain Text");
    redact_plain_text(text, ctx)
}
