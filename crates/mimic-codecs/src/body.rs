//! Message body dispatch by declared content type.

use mimic_redact::RedactionContext;
use tracing::{debug, warn};

use crate::{Result, csv, form, json, multipart, xml, yaml};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    Json,
    Yaml,
    Xml,
    Form,
    Csv,
    Multipart,
    PlainText,
}

/// Order in which body grammars are tried when the declared one fails or
/// nothing is declared.
pub const FALLBACK_ORDER: [BodyKind; 5] = [
    BodyKind::Json,
    BodyKind::Yaml,
    BodyKind::Xml,
    BodyKind::Form,
    BodyKind::Csv,
];

/// Media type without parameters, lowercased.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl BodyKind {
    pub fn from_mime(content_type: &str) -> Option<Self> {
        let mime = essence(content_type);
        let kind = match mime.as_str() {
            "" => return None,
            "application/json" | "text/json" => BodyKind::Json,
            "application/xml" | "text/xml" => BodyKind::Xml,
            "application/x-www-form-urlencoded" => BodyKind::Form,
            "application/yaml" | "application/x-yaml" | "text/yaml" | "text/x-yaml" => {
                BodyKind::Yaml
            }
            "text/csv" | "application/csv" => BodyKind::Csv,
            "text/plain" => BodyKind::PlainText,
            m if m.starts_with("multipart/") => BodyKind::Multipart,
            m if m.ends_with("+json") => BodyKind::Json,
            m if m.ends_with("+xml") => BodyKind::Xml,
            _ => return None,
        };
        Some(kind)
    }

    fn run(self, body: &str, ctx: &RedactionContext<'_>) -> Result<String> {
        match self {
            BodyKind::Json => json::redact_body(body, ctx),
            BodyKind::Yaml => yaml::redact_body(body, ctx),
            BodyKind::Xml => xml::redact_body(body, ctx),
            BodyKind::Form => form::redact_body(body, ctx),
            BodyKind::Csv => csv::redact_body(body, ctx),
            BodyKind::Multipart | BodyKind::PlainText => Ok(ctx.redact_lines(body)),
        }
    }
}

/// Redact a message body, choosing the grammar from `content_type` (the raw
/// header value, parameters included).
pub fn redact_body(body: &str, content_type: &str, ctx: &RedactionContext<'_>) -> String {
    if body.is_empty() {
        return String::new();
    }

    let declared = BodyKind::from_mime(content_type);
    match declared {
        Some(BodyKind::PlainText) => return ctx.redact_lines(body),
        Some(BodyKind::Multipart) => {
            let Some(boundary) = multipart::boundary(content_type) else {
                warn!("Multipart body without boundary, redacting as plain text");
                return ctx.redact_lines(body);
            };
            return multipart::redact(body, &boundary, ctx).unwrap_or_else(|err| {
                warn!("Multipart body could not be processed ({}), using plain text", err);
                ctx.redact_lines(body)
            });
        }
        _ => {}
    }

    let candidates = declared
        .into_iter()
        .chain(FALLBACK_ORDER.into_iter().filter(|kind| Some(*kind) != declared));
    for kind in candidates {
        // Almost any text splits into rows; only guess CSV when it looks tabular.
        if kind == BodyKind::Csv && declared != Some(kind) && !csv::is_likely_csv(body) {
            continue;
        }
        match kind.run(body, ctx) {
            Ok(redacted) => {
                debug!("Body redacted as {:?}", kind);
                return redacted;
            }
            Err(err) if Some(kind) == declared => {
                warn!("Declared {:?} body failed to parse: {}", kind, err);
            }
            Err(_) => {}
        }
    }

    debug!("Body redacted as plain text");
    ctx.redact_lines(body)
}

/// Body of a multipart file part. Nested multipart content is passed through.
pub fn redact_part_body(body: &str, content_type: &str, ctx: &RedactionContext<'_>) -> String {
    if essence(content_type).starts_with("multipart/") {
        return body.to_string();
    }
    redact_body(body, content_type, ctx)
}
