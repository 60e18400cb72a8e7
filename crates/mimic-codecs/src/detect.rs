//! Format detection
//!
//! Probes run in a fixed order and each one either claims the text or lets
//! the next one try.

use lazy_static::lazy_static;
use mimic_core::{DetectOptions, FormatLabel};
use regex::Regex;
use serde::de::IgnoredAny;

use crate::{csv, form, http, xml, yaml};

lazy_static! {
    static ref DOCTYPE_START: Regex = Regex::new(r"(?i)^<!doctype\b").unwrap();
    static ref YAML_HINT: Regex = Regex::new(r":\s|\n\s*-").unwrap();
}

const BOM: char = '\u{FEFF}';

/// `text` without a leading byte order mark.
pub fn strip_bom(text: &str) -> &str {
    text.strip_prefix(BOM).unwrap_or(text)
}

pub fn detect(text: &str, options: DetectOptions) -> FormatLabel {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return FormatLabel::Empty;
    }
    let normalized = strip_bom(trimmed).trim_start();

    let first_line = normalized.lines().next().unwrap_or_default();
    if let Some(label) = http::start_line_label(first_line) {
        return label;
    }

    if DOCTYPE_START.is_match(normalized) {
        return FormatLabel::Xml;
    }

    if serde_json::from_str::<IgnoredAny>(normalized).is_ok() {
        return FormatLabel::Json;
    }

    if xml::parse(normalized, xml::ParseMode::Strict).is_ok() {
        return FormatLabel::Xml;
    }

    if YAML_HINT.is_match(text) && yaml::parse_document(normalized).is_ok() {
        return FormatLabel::Yaml;
    }

    if form::parse_document(normalized).is_ok() {
        return FormatLabel::FormUrlEncoded;
    }

    if csv::is_likely_csv(normalized) {
        return FormatLabel::csv(options.csv_has_header);
    }

    FormatLabel::PlainText
}
