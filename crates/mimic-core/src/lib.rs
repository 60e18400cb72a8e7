//! Core domain models for mimic
//!
//! This crate contains:
//! - Redaction settings and display preferences
//! - Format labels and redaction results
//! - The protected-field policy
//! - The word dictionary used for same-length substitution

pub mod dictionary;
pub mod error;
pub mod format;
pub mod policy;
pub mod result;
pub mod settings;

pub use dictionary::Dictionary;
pub use error::{Error, Result};
pub use format::{DetectOptions, FormatLabel};
pub use policy::ProtectedFieldSet;
pub use result::RedactionResult;
pub use settings::{Preferences, RedactionSettings, parse_list};
