//! Redaction orchestrator
//!
//! [`Redactor`] owns the dictionary cache, awaits the one-time dictionary
//! load and hands every call to the pure [`dispatch::compute`].

pub mod dispatch;
pub mod redactor;

pub use dispatch::compute;
pub use mimic_codecs::detect::detect as detect_format;
pub use redactor::Redactor;
