//! Format detection and structural codecs
//!
//! Each codec parses one document grammar, walks it calling the primitive
//! redactor per leaf and the protected-field policy per name, and writes it
//! back in the same layout. Probes return `Result` so callers can chain them
//! into an ordered fallback.

pub mod body;
pub mod csv;
pub mod detect;
pub mod disposition;
pub mod error;
pub mod form;
pub mod http;
pub mod json;
pub mod multipart;
pub mod xml;
pub mod yaml;

pub use body::BodyKind;
pub use detect::detect;
pub use error::{CodecError, Result};

use mimic_core::{FormatLabel, RedactionResult};
use mimic_redact::RedactionContext;

/// Line-wise plain-text redaction; the terminal fallback that cannot fail.
pub fn redact_plain_text(text: &str, ctx: &RedactionContext<'_>) -> RedactionResult {
    RedactionResult::new(text, ctx.redact_lines(text), FormatLabel::PlainText)
}
