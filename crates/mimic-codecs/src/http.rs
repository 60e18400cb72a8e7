//! HTTP/1.x request and response messages
//!
//! The start line, each header and the body are redacted separately. Header
//! handling is driven by the header name; the body goes through the content
//! type dispatch in [`crate::body`].

use lazy_static::lazy_static;
use mimic_core::{FormatLabel, Preferences, RedactionResult};
use mimic_redact::RedactionContext;
use regex::Regex;

use crate::{CodecError, Result, body, disposition, form, json};

lazy_static! {
    static ref REQUEST_LINE: Regex = Regex::new(
        r"^(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS|TRACE|CONNECT)\s+(.+)\s+(HTTP/[12](?:\.\d)?)$"
    )
    .unwrap();
    static ref STATUS_LINE: Regex = Regex::new(r"^HTTP/[12](?:\.\d)?\s+(\d{3})(?:\s+.*)?$").unwrap();
}

const CSRF_HEADERS: &[&str] = &["x-csrf-token", "x-xsrf-token", "csrf-token"];

const SAFE_HEADERS: &[&str] = &[
    "content-type",
    "content-length",
    "connection",
    "accept",
    "user-agent",
    "date",
    "server",
    "accept-encoding",
    "accept-language",
];

const SET_COOKIE_ATTRIBUTES: &[&str] = &[
    "path", "domain", "expires", "max-age", "samesite", "secure", "httponly", "partitioned",
    "priority",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request {
        method: String,
        target: String,
        version: String,
    },
    Response(String),
}

impl StartLine {
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if let Some(caps) = REQUEST_LINE.captures(line) {
            let part = |i: usize| caps.get(i).map_or("", |m| m.as_str()).to_string();
            return Some(StartLine::Request {
                method: part(1),
                target: part(2).trim().to_string(),
                version: part(3),
            });
        }
        STATUS_LINE
            .is_match(line)
            .then(|| StartLine::Response(line.to_string()))
    }

    pub fn label(&self) -> FormatLabel {
        match self {
            StartLine::Request { .. } => FormatLabel::HttpRequest,
            StartLine::Response(_) => FormatLabel::HttpResponse,
        }
    }
}

/// Label for an HTTP start line, if `line` is one.
pub fn start_line_label(line: &str) -> Option<FormatLabel> {
    StartLine::parse(line).map(|start| start.label())
}

/// A message split into its raw pieces. Line endings are normalised to `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMessage<'a> {
    pub start: StartLine,
    pub start_raw: &'a str,
    pub headers: Vec<&'a str>,
    pub body: String,
}

impl HttpMessage<'_> {
    /// Raw `Content-Type` value, parameters included.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-type")
                .then(|| value.trim())
        })
    }

    fn header_block(&self) -> String {
        let mut lines = Vec::with_capacity(self.headers.len() + 1);
        lines.push(self.start_raw);
        lines.extend(self.headers.iter().copied());
        lines.join("\n")
    }
}

pub fn parse(text: &str) -> Result<HttpMessage<'_>> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .skip_while(|line| line.trim().is_empty())
        .collect();

    let start_raw = lines.first().copied().unwrap_or_default();
    let start = StartLine::parse(start_raw)
        .ok_or_else(|| CodecError::Http("not an HTTP request or status line".to_string()))?;

    let header_end = lines
        .iter()
        .position(|line| line.trim().is_empty())
        .unwrap_or(lines.len());
    let headers = lines[1..header_end].to_vec();
    let body = lines
        .get(header_end + 1..)
        .map(|rest| rest.join("\n"))
        .unwrap_or_default();

    Ok(HttpMessage {
        start,
        start_raw,
        headers,
        body,
    })
}

/// Redact a request target: the path when enabled, query values always
/// (unless the query toggle is off or the parameter is protected).
pub fn redact_target(target: &str, ctx: &RedactionContext<'_>) -> String {
    let settings = ctx.settings;
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    let mut out = if settings.redact_url_path {
        ctx.redact_string(path)
    } else {
        path.to_string()
    };
    if let Some(query) = query {
        out.push('?');
        if settings.redact_query_string {
            out.push_str(&form::redact_query(query, ctx));
        } else {
            out.push_str(query);
        }
    }
    out
}

fn redact_cookies(value: &str, set_cookie: bool, ctx: &RedactionContext<'_>) -> String {
    value
        .split(';')
        .enumerate()
        .map(|(index, pair)| {
            let pair = pair.trim();
            let Some((name, value)) = pair.split_once('=') else {
                return pair.to_string();
            };
            let name = name.trim();
            let is_attribute = set_cookie
                && index > 0
                && SET_COOKIE_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str());
            if is_attribute || ctx.is_protected(name) {
                pair.to_string()
            } else {
                format!("{}={}", name, ctx.redact_string(value))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rewrite one header line according to its name.
pub fn redact_header(line: &str, ctx: &RedactionContext<'_>) -> String {
    let settings = ctx.settings;
    let Some((key, value)) = line.split_once(':') else {
        return line.to_string();
    };
    let value = value.trim_start();
    let lower = key.trim().to_ascii_lowercase();

    if ctx.is_protected(key) {
        return line.to_string();
    }

    match lower.as_str() {
        "content-disposition" => disposition::format(value, ctx, false, None),
        "cookie" | "set-cookie" => {
            if settings.redact_cookies {
                format!("{}: {}", key, redact_cookies(value, lower == "set-cookie", ctx))
            } else {
                line.to_string()
            }
        }
        "authorization" | "proxy-authorization" => {
            format!("{}: {}", key, ctx.redact_string(value))
        }
        "host" if !settings.redact_host => line.to_string(),
        name if CSRF_HEADERS.contains(&name) && !settings.redact_csrf => line.to_string(),
        name if SAFE_HEADERS.contains(&name) => line.to_string(),
        _ => format!("{}: {}", key, ctx.redact_string(value)),
    }
}

fn looks_like_json_body(message: &HttpMessage<'_>) -> bool {
    match message.content_type() {
        Some(content_type) if !content_type.is_empty() => {
            body::essence(content_type).contains("json")
        }
        _ => message.body.trim_start().starts_with('{'),
    }
}

/// The input as shown to the user: a JSON body is pretty-printed.
fn display_input(text: &str, message: &HttpMessage<'_>, prefs: &Preferences) -> String {
    if !looks_like_json_body(message) {
        return text.to_string();
    }
    let Ok(value) = json::parse(&message.body) else {
        return text.to_string();
    };
    let value = if prefs.sort_keys {
        json::sort_keys(value)
    } else {
        value
    };
    match json::pretty(&value) {
        Ok(pretty) if pretty != message.body => {
            format!("{}\n\n{}", message.header_block(), pretty)
        }
        _ => text.to_string(),
    }
}

pub fn redact(
    text: &str,
    ctx: &RedactionContext<'_>,
    prefs: &Preferences,
) -> Result<RedactionResult> {
    let message = parse(text)?;

    let start = match &message.start {
        StartLine::Request {
            method,
            target,
            version,
        } => format!("{} {} {}", method, redact_target(target, ctx), version),
        StartLine::Response(line) => line.clone(),
    };

    let headers: Vec<String> = message
        .headers
        .iter()
        .map(|line| redact_header(line, ctx))
        .collect();

    let mut output = format!("{}\n{}", start, headers.join("\n"));
    if !message.body.is_empty() {
        let content_type = message.content_type().unwrap_or_default();
        output.push_str("\n\n");
        output.push_str(&body::redact_body(&message.body, content_type, ctx));
    }

    Ok(RedactionResult::new(
        display_input(text, &message, prefs),
        output,
        message.start.label(),
    ))
}
