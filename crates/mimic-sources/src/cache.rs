//! Single-flight dictionary cache
//!
//! The first caller starts the load; everyone arriving while it is in flight
//! awaits the same shared future. A failed load clears the slot so the next
//! call fetches again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use mimic_core::{Dictionary, Error, Result};
use tracing::{debug, info, warn};

use crate::handler::SourceRegistry;

type LoadFuture = Shared<BoxFuture<'static, std::result::Result<Arc<Dictionary>, String>>>;

pub struct DictionaryCache {
    location: String,
    registry: Arc<SourceRegistry>,
    slot: Mutex<Option<LoadFuture>>,
}

impl DictionaryCache {
    pub fn new(location: impl Into<String>) -> Self {
        Self::with_registry(location, Arc::new(SourceRegistry::default()))
    }

    pub fn with_registry(location: impl Into<String>, registry: Arc<SourceRegistry>) -> Self {
        Self {
            location: location.into(),
            registry,
            slot: Mutex::new(None),
        }
    }

    /// A cache that never loads anything; `get` always yields `dictionary`.
    pub fn preloaded(dictionary: Dictionary) -> Self {
        let ready: BoxFuture<'static, std::result::Result<Arc<Dictionary>, String>> =
            futures_util::future::ready(Ok(Arc::new(dictionary))).boxed();
        Self {
            location: String::from("memory:"),
            registry: Arc::new(SourceRegistry::empty()),
            slot: Mutex::new(Some(ready.shared())),
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    fn lock(&self) -> MutexGuard<'_, Option<LoadFuture>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The loaded dictionary, loading it first if needed.
    pub async fn get(&self) -> Result<Arc<Dictionary>> {
        let pending = {
            let mut slot = self.lock();
            match slot.as_ref() {
                Some(pending) => {
                    debug!("Joining dictionary load for {}", self.location);
                    pending.clone()
                }
                None => {
                    let pending = self.start_load();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        match pending.clone().await {
            Ok(dictionary) => Ok(dictionary),
            Err(message) => {
                let mut slot = self.lock();
                // A retry may already have replaced the failed load.
                if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
                    *slot = None;
                    warn!("Dictionary load failed, cache reset: {}", message);
                }
                Err(Error::Dictionary(message))
            }
        }
    }

    /// The dictionary if a load already completed successfully.
    pub fn peek(&self) -> Option<Arc<Dictionary>> {
        self.lock()
            .as_ref()
            .and_then(|pending| pending.peek().cloned())
            .and_then(|outcome| outcome.ok())
    }

    /// Drop any cached or in-flight load.
    pub fn reset(&self) {
        *self.lock() = None;
    }

    fn start_load(&self) -> LoadFuture {
        let registry = Arc::clone(&self.registry);
        let location = self.location.clone();
        async move {
            let text = registry
                .load(&location)
                .await
                .map_err(|e| format!("{} ({})", e, location))?;
            let dictionary = Dictionary::from_text(&text);
            if dictionary.is_empty() {
                return Err(format!("no usable words in {}", location));
            }
            info!(words = dictionary.len(), source = %location, "Dictionary loaded");
            Ok(Arc::new(dictionary))
        }
        .boxed()
        .shared()
    }
}
