//! `Content-Disposition` header values.

use mimic_redact::RedactionContext;

/// One `;`-separated segment, trimmed.
fn segments(value: &str) -> Vec<String> {
    value.split(';').map(|part| part.trim().to_string()).collect()
}

/// Split `key=value` and strip surrounding quotes from the value.
fn split_param(segment: &str) -> Option<(&str, &str)> {
    let (key, value) = segment.split_once('=')?;
    let value = value.trim();
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    Some((key.trim(), value))
}

/// Value of parameter `name` (case-insensitive). `filename*` never matches
/// `filename`.
pub fn parameter(value: &str, name: &str) -> Option<String> {
    value
        .split(';')
        .skip(1)
        .filter_map(|segment| split_param(segment.trim()))
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.to_string())
        .filter(|v| !v.is_empty())
}

pub fn has_filename(value: &str) -> bool {
    parameter(value, "filename").is_some()
}

/// Keep the extension, redact the base name.
pub fn redact_filename(filename: &str, ctx: &RedactionContext<'_>) -> String {
    match filename.rfind('.') {
        Some(dot) => format!("{}{}", ctx.redact_string(&filename[..dot]), &filename[dot..]),
        None => ctx.redact_string(filename),
    }
}

/// Rewrite a `Content-Disposition` value into a full header line.
///
/// The filename is redacted when `force_filename` is set or the disposition
/// type is `attachment`; `field_name` replaces the `name` parameter.
pub fn format(
    value: &str,
    ctx: &RedactionContext<'_>,
    force_filename: bool,
    field_name: Option<&str>,
) -> String {
    let mut parts = segments(value);
    let mut modified = false;

    if let Some(field_name) = field_name {
        if let Some(index) = find_param(&parts, "name") {
            parts[index] = format!("name=\"{}\"", field_name);
            modified = true;
        }
    }

    let is_attachment = parts
        .first()
        .is_some_and(|kind| kind.eq_ignore_ascii_case("attachment"));
    if force_filename || is_attachment {
        if let Some(index) = find_param(&parts, "filename") {
            if let Some((_, original)) = split_param(&parts[index]) {
                if !original.is_empty() {
                    parts[index] = format!("filename=\"{}\"", redact_filename(original, ctx));
                    modified = true;
                }
            }
        }
    }

    if modified {
        format!("Content-Disposition: {}", parts.join("; "))
    } else {
        format!("Content-Disposition: {}", value)
    }
}

fn find_param(parts: &[String], name: &str) -> Option<usize> {
    parts
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, part)| split_param(part).is_some_and(|(key, _)| key.eq_ignore_ascii_case(name)))
        .map(|(index, _)| index)
}
