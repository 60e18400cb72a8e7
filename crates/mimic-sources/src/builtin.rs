use async_trait::async_trait;
use mimic_core::Result;

use crate::handler::DictionarySource;

pub const BUILTIN_LOCATION: &str = "builtin:";

/// Word list compiled into the binary.
pub const BUILTIN_WORDS: &str = include_str!("../assets/words.txt");

pub struct BuiltinSource;

#[async_trait]
impl DictionarySource for BuiltinSource {
    fn can_handle(&self, location: &str) -> bool {
        location.trim() == BUILTIN_LOCATION
    }

    async fn load(&self, _location: &str) -> Result<String> {
        Ok(BUILTIN_WORDS.to_string())
    }
}
