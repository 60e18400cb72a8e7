//! `multipart/*` bodies
//!
//! Parts are split on `--boundary`, redacted one by one and written back with
//! CRLF boundaries and a closing `--boundary--`.

use lazy_static::lazy_static;
use mimic_redact::RedactionContext;
use regex::Regex;

use crate::{CodecError, Result, body, disposition};

lazy_static! {
    static ref BOUNDARY: Regex = Regex::new(r#"(?i)boundary="?([^";]+)"?"#).unwrap();
}

/// `boundary` parameter of a `Content-Type` value.
pub fn boundary(content_type: &str) -> Option<String> {
    BOUNDARY
        .captures(content_type)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|b| !b.is_empty())
}

fn strip_line_break_start(text: &str) -> &str {
    text.strip_prefix("\r\n")
        .or_else(|| text.strip_prefix('\n'))
        .unwrap_or(text)
}

fn strip_line_break_end(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

pub fn redact(text: &str, boundary: &str, ctx: &RedactionContext<'_>) -> Result<String> {
    let marker = format!("--{}", boundary);
    if !text.contains(&marker) {
        return Err(CodecError::Multipart(format!(
            "boundary {} not found in body",
            boundary
        )));
    }

    let mut segments = text.split(marker.as_str());
    let preamble = segments.next().unwrap_or_default();

    let mut parts = Vec::new();
    for segment in segments {
        if segment.starts_with("--") {
            break;
        }
        let part = strip_line_break_end(strip_line_break_start(segment));
        if part.trim().is_empty() {
            continue;
        }
        parts.push(redact_part(part, ctx));
    }

    if parts.is_empty() {
        return Ok(text.to_string());
    }

    let mut out = String::with_capacity(text.len());
    if !preamble.trim().is_empty() {
        out.push_str(&ctx.redact_lines(preamble));
    }
    let rebuilt: Vec<String> = parts
        .iter()
        .map(|part| format!("{}\r\n{}", marker, part))
        .collect();
    out.push_str(&rebuilt.join("\r\n"));
    out.push_str("\r\n");
    out.push_str(&marker);
    out.push_str("--");
    Ok(out)
}

fn redact_part(part: &str, ctx: &RedactionContext<'_>) -> String {
    let (split, divider) = match part.find("\r\n\r\n") {
        Some(index) => (index, "\r\n\r\n"),
        None => match part.find("\n\n") {
            Some(index) => (index, "\n\n"),
            None => return ctx.redact_lines(part.trim()),
        },
    };
    let header_section = &part[..split];
    let body_section = &part[split + divider.len()..];

    let mut headers: Vec<String> = Vec::new();
    let mut disposition_at = None;
    let mut disposition_value = String::new();
    let mut content_type = String::new();

    for line in header_section.split('\n') {
        let line = line.strip_suffix('\r').unwrap_or(line);
        match line.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                let key = key.trim();
                let value = value.trim();
                if key.eq_ignore_ascii_case("content-disposition") {
                    disposition_at = Some(headers.len());
                    disposition_value = value.to_string();
                } else if key.eq_ignore_ascii_case("content-type") {
                    content_type = value.to_string();
                }
                headers.push(format!("{}: {}", key, value));
            }
            _ => headers.push(line.to_string()),
        }
    }

    let field_name = disposition::parameter(&disposition_value, "name");
    if field_name.as_deref().is_some_and(|name| ctx.is_protected(name)) {
        return part.to_string();
    }

    let has_filename = disposition::has_filename(&disposition_value);
    let redacted_name = field_name
        .filter(|_| ctx.settings.redact_param_names)
        .map(|name| ctx.redact_string(&name));

    let redacted_body = if has_filename {
        body::redact_part_body(body_section, &content_type, ctx)
    } else {
        ctx.redact_lines(body_section)
    };

    if let Some(index) = disposition_at {
        if has_filename || redacted_name.is_some() {
            headers[index] = disposition::format(
                &disposition_value,
                ctx,
                has_filename,
                redacted_name.as_deref(),
            );
        }
    }

    format!("{}{}{}", headers.join("\r\n"), divider, redacted_body)
}
