//! Dictionary sources
//!
//! A dictionary location is a string such as `builtin:`, `file:/path/words.txt`
//! or `https://host/words.txt`. Sources turn a location into raw word-list
//! text; [`DictionaryCache`] turns that text into a shared [`Dictionary`]
//! exactly once per process.
//!
//! [`Dictionary`]: mimic_core::Dictionary

pub mod builtin;
pub mod cache;
pub mod file;
pub mod handler;
pub mod url;

pub use builtin::{BUILTIN_LOCATION, BuiltinSource};
pub use cache::DictionaryCache;
pub use file::FileSource;
pub use handler::{DictionarySource, SourceRegistry};
pub use url::UrlSource;
