use serde::{Deserialize, Serialize};

use crate::FormatLabel;

/// Outcome of one redaction call.
///
/// `input` is the original text reformatted for display (for example
/// pretty-printed), `output` its redacted counterpart in matching layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RedactionResult {
    pub input: String,
    pub output: String,
    pub format: FormatLabel,
}

impl RedactionResult {
    pub fn new(input: impl Into<String>, output: impl Into<String>, format: FormatLabel) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            format,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// True when the document could not be handled by a structural codec.
    pub fn is_degraded(&self) -> bool {
        self.format == FormatLabel::PlainText
    }
}
