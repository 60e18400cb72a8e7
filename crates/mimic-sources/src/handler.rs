//! Dictionary source trait

use async_trait::async_trait;
use mimic_core::{Error, Result};

use crate::{BuiltinSource, FileSource, UrlSource};

/// Something that can fetch a newline-delimited word list.
#[async_trait]
pub trait DictionarySource: Send + Sync {
    /// Check if this source understands the given location
    fn can_handle(&self, location: &str) -> bool;

    /// Fetch the raw word-list text
    async fn load(&self, location: &str) -> Result<String>;
}

/// Ordered set of sources; the first one that accepts a location wins.
pub struct SourceRegistry {
    sources: Vec<Box<dyn DictionarySource>>,
}

impl SourceRegistry {
    pub fn empty() -> Self {
        Self {
            sources: Vec::new(),
        }
    }

    pub fn register(&mut self, source: impl DictionarySource + 'static) {
        self.sources.push(Box::new(source));
    }

    pub fn find(&self, location: &str) -> Option<&dyn DictionarySource> {
        self.sources
            .iter()
            .find(|source| source.can_handle(location))
            .map(|source| source.as_ref())
    }

    pub async fn load(&self, location: &str) -> Result<String> {
        let source = self
            .find(location)
            .ok_or_else(|| Error::InvalidSource(location.to_string()))?;
        source.load(location).await
    }
}

impl Default for SourceRegistry {
    /// Builtin, then remote, then the filesystem as catch-all.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(BuiltinSource);
        registry.register(UrlSource::new());
        registry.register(FileSource);
        registry
    }
}
