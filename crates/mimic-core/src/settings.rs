use serde::{Deserialize, Serialize};

/// Toggles and word lists that steer one redaction call.
///
/// A value is immutable for the duration of a call; hosts build a fresh one
/// whenever the user edits their settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedactionSettings {
    #[serde(default)]
    pub redact_url_path: bool,

    #[serde(default = "enabled")]
    pub redact_host: bool,

    #[serde(default = "enabled")]
    pub redact_query_string: bool,

    #[serde(default)]
    pub redact_param_names: bool,

    #[serde(default = "enabled")]
    pub redact_cookies: bool,

    #[serde(default = "enabled")]
    pub redact_csrf: bool,

    #[serde(default = "enabled")]
    pub csv_has_header: bool,

    /// Words passed through verbatim, matched case-insensitively.
    #[serde(default)]
    pub ignored_words: Vec<String>,

    /// Field, header, column, cookie and parameter names exempt from redaction.
    #[serde(default)]
    pub protected_fields: Vec<String>,
}

impl Default for RedactionSettings {
    fn default() -> Self {
        Self {
            redact_url_path: false,
            redact_host: true,
            redact_query_string: true,
            redact_param_names: false,
            redact_cookies: true,
            redact_csrf: true,
            csv_has_header: true,
            ignored_words: Vec::new(),
            protected_fields: Vec::new(),
        }
    }
}

impl RedactionSettings {
    pub fn with_protected_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.protected_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ignored_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_words = words.into_iter().map(Into::into).collect();
        self
    }
}

/// Display preferences that do not change what gets redacted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Sort JSON object keys alphabetically in both input and output.
    #[serde(default)]
    pub sort_keys: bool,
}

fn enabled() -> bool {
    true
}

/// Split a comma-separated list, trimming items and dropping empty ones.
pub fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect()
}
