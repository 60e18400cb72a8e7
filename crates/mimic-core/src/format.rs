use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Document grammar a piece of text was recognised as.
///
/// Always re-derivable from the raw text, never stored as authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FormatLabel {
    #[serde(rename = "HTTP Request")]
    HttpRequest,
    #[serde(rename = "HTTP Response")]
    HttpResponse,
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "XML")]
    Xml,
    #[serde(rename = "YAML")]
    Yaml,
    #[serde(rename = "CSV (with header)")]
    CsvWithHeader,
    #[serde(rename = "CSV (no header)")]
    CsvNoHeader,
    #[serde(rename = "Form URL-Encoded")]
    FormUrlEncoded,
    #[serde(rename = "Plain Text")]
    PlainText,
    /// Blank input; nothing is redacted.
    #[serde(rename = "")]
    #[default]
    Empty,
}

impl FormatLabel {
    pub const ALL: [FormatLabel; 10] = [
        FormatLabel::HttpRequest,
        FormatLabel::HttpResponse,
        FormatLabel::Json,
        FormatLabel::Xml,
        FormatLabel::Yaml,
        FormatLabel::CsvWithHeader,
        FormatLabel::CsvNoHeader,
        FormatLabel::FormUrlEncoded,
        FormatLabel::PlainText,
        FormatLabel::Empty,
    ];

    pub fn csv(has_header: bool) -> Self {
        if has_header {
            FormatLabel::CsvWithHeader
        } else {
            FormatLabel::CsvNoHeader
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormatLabel::HttpRequest => "HTTP Request",
            FormatLabel::HttpResponse => "HTTP Response",
            FormatLabel::Json => "JSON",
            FormatLabel::Xml => "XML",
            FormatLabel::Yaml => "YAML",
            FormatLabel::CsvWithHeader => "CSV (with header)",
            FormatLabel::CsvNoHeader => "CSV (no header)",
            FormatLabel::FormUrlEncoded => "Form URL-Encoded",
            FormatLabel::PlainText => "Plain Text",
            FormatLabel::Empty => "",
        }
    }

    pub fn is_http(&self) -> bool {
        matches!(self, FormatLabel::HttpRequest | FormatLabel::HttpResponse)
    }

    pub fn is_csv(&self) -> bool {
        matches!(self, FormatLabel::CsvWithHeader | FormatLabel::CsvNoHeader)
    }
}

impl fmt::Display for FormatLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FormatLabel {
    type Err = String;

    /// Accepts display labels as well as short names such as `json` or `csv`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if let Some(label) = Self::ALL
            .iter()
            .find(|label| label.as_str().eq_ignore_ascii_case(wanted))
        {
            return Ok(*label);
        }

        match wanted.to_ascii_lowercase().as_str() {
            "request" | "http-request" => Ok(FormatLabel::HttpRequest),
            "response" | "http-response" => Ok(FormatLabel::HttpResponse),
            "yml" => Ok(FormatLabel::Yaml),
            "csv" => Ok(FormatLabel::CsvWithHeader),
            "csv-no-header" => Ok(FormatLabel::CsvNoHeader),
            "form" | "urlencoded" => Ok(FormatLabel::FormUrlEncoded),
            "text" | "plain" => Ok(FormatLabel::PlainText),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

/// Options that influence format detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectOptions {
    pub csv_has_header: bool,
}

impl Default for DetectOptions {
    fn default() -> Self {
        Self {
            csv_has_header: true,
        }
    }
}
