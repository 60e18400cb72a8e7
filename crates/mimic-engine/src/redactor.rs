use std::borrow::Cow;
use std::sync::Arc;

use mimic_codecs::detect::{detect, strip_bom};
use mimic_core::{
    DetectOptions, Dictionary, FormatLabel, Preferences, RedactionResult, RedactionSettings,
    Result,
};
use mimic_redact::RedactionContext;
use mimic_sources::DictionaryCache;
use tracing::debug;

use crate::dispatch;

/// Entry point for hosts: detection plus dictionary-backed redaction.
///
/// Cheap to share behind an `Arc`; concurrent calls only read the cached
/// dictionary.
pub struct Redactor {
    cache: Arc<DictionaryCache>,
    preferences: Preferences,
}

impl Redactor {
    pub fn new(cache: Arc<DictionaryCache>) -> Self {
        Self {
            cache,
            preferences: Preferences::default(),
        }
    }

    /// Redactor over the dictionary at `location` (`builtin:`, a path or a URL).
    pub fn from_location(location: impl Into<String>) -> Self {
        Self::new(Arc::new(DictionaryCache::new(location)))
    }

    pub fn with_preferences(mut self, preferences: Preferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn detect(&self, text: &str, settings: &RedactionSettings) -> FormatLabel {
        detect(
            text,
            DetectOptions {
                csv_has_header: settings.csv_has_header,
            },
        )
    }

    pub async fn dictionary(&self) -> Result<Arc<Dictionary>> {
        self.cache.get().await
    }

    /// Redact `text` as the already-known `format`. A leading byte order
    /// mark is dropped from both `text` and `trimmed`.
    ///
    /// Fails only when the dictionary cannot be loaded; codec failures end in
    /// a fallback result instead.
    pub async fn compute(
        &self,
        format: FormatLabel,
        text: &str,
        trimmed: &str,
        settings: &RedactionSettings,
    ) -> Result<RedactionResult> {
        let text = strip_bom(text);
        let trimmed = strip_bom(trimmed).trim_start();
        if format == FormatLabel::Empty || trimmed.is_empty() {
            return Ok(RedactionResult::empty());
        }
        let dictionary = self.dictionary().await?;
        let settings = settings_for(format, settings);
        let ctx = RedactionContext::new(&settings, &dictionary);
        Ok(dispatch::compute(format, text, trimmed, &ctx, &self.preferences))
    }

    /// Detect, then redact.
    pub async fn redact(&self, text: &str, settings: &RedactionSettings) -> Result<RedactionResult> {
        self.redact_as(None, text, settings).await
    }

    /// Redact with an explicit format instead of detecting one.
    pub async fn redact_as(
        &self,
        format: Option<FormatLabel>,
        text: &str,
        settings: &RedactionSettings,
    ) -> Result<RedactionResult> {
        let text = strip_bom(text);
        let format = format.unwrap_or_else(|| self.detect(text, settings));
        debug!("Redacting {} bytes as {}", text.len(), format);
        self.compute(format, text, text.trim(), settings).await
    }

    /// `count` independent redactions of one input, sharing a single
    /// detection and dictionary load.
    pub async fn redact_variants(
        &self,
        text: &str,
        settings: &RedactionSettings,
        count: usize,
        format: Option<FormatLabel>,
    ) -> Result<Vec<RedactionResult>> {
        let text = strip_bom(text);
        let format = format.unwrap_or_else(|| self.detect(text, settings));
        let trimmed = text.trim();
        if format == FormatLabel::Empty || trimmed.is_empty() {
            return Ok(vec![RedactionResult::empty(); count]);
        }

        let dictionary = self.dictionary().await?;
        let settings = settings_for(format, settings);
        let ctx = RedactionContext::new(&settings, &dictionary);
        Ok((0..count)
            .map(|_| dispatch::compute(format, text, trimmed, &ctx, &self.preferences))
            .collect())
    }
}

/// A CSV label carries its own header flag, which wins over the settings.
fn settings_for(format: FormatLabel, settings: &RedactionSettings) -> Cow<'_, RedactionSettings> {
    if format.is_csv() && settings.csv_has_header != (format == FormatLabel::CsvWithHeader) {
        let mut adjusted = settings.clone();
        adjusted.csv_has_header = format == FormatLabel::CsvWithHeader;
        return Cow::Owned(adjusted);
    }
    Cow::Borrowed(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::Error;
    use mimic_sources::SourceRegistry;

    fn redactor() -> Redactor {
        Redactor::new(Arc::new(DictionaryCache::preloaded(Dictionary::from_words([
            "river", "stone", "cloud",
        ]))))
    }

    #[test]
    fn test_settings_for_csv_label() {
        let settings = RedactionSettings::default();
        assert!(!settings_for(FormatLabel::CsvNoHeader, &settings).csv_has_header);
        assert!(settings_for(FormatLabel::CsvWithHeader, &settings).csv_has_header);
        assert!(matches!(settings_for(FormatLabel::Json, &settings), Cow::Borrowed(_)));
    }

    #[tokio::test]
    async fn test_empty_input_skips_dictionary() {
        let broken = Redactor::new(Arc::new(DictionaryCache::with_registry(
            "nowhere:",
            Arc::new(SourceRegistry::empty()),
        )));
        let result = broken.redact("  \n ", &RedactionSettings::default()).await.unwrap();
        assert_eq!(result.format, FormatLabel::Empty);
    }

    #[tokio::test]
    async fn test_dictionary_failure_surfaces() {
        let broken = Redactor::new(Arc::new(DictionaryCache::with_registry(
            "nowhere:",
            Arc::new(SourceRegistry::empty()),
        )));
        let err = broken
            .redact("{\"a\":1}", &RedactionSettings::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Dictionary(_)));
    }

    #[tokio::test]
    async fn test_forced_format() {
        let settings = RedactionSettings::default();
        let result = redactor()
            .redact_as(Some(FormatLabel::CsvNoHeader), "alpha,bravo\ncharlie,delta", &settings)
            .await
            .unwrap();
        assert_eq!(result.format, FormatLabel::CsvNoHeader);
        assert!(!result.output.starts_with("alpha,"));
    }

    #[tokio::test]
    async fn test_variants_are_independent() {
        let settings = RedactionSettings::default();
        let text = "{\"id\": 123456789012, \"note\": \"river\"}";
        let results = redactor().redact_variants(text, &settings, 4, None).await.unwrap();
        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.format == FormatLabel::Json));
        assert!(results.iter().all(|r| r.input == results[0].input));
        let distinct: std::collections::HashSet<_> =
            results.iter().map(|r| r.output.as_str()).collect();
        assert!(distinct.len() > 1);
    }

    #[tokio::test]
    async fn test_byte_order_mark_is_ignored() {
        let settings = RedactionSettings::default();
        let redactor = redactor();

        let json = "\u{FEFF}{\"a\": 1}";
        assert_eq!(redactor.detect(json, &settings), FormatLabel::Json);
        let result = redactor.redact(json, &settings).await.unwrap();
        assert_eq!(result.format, FormatLabel::Json);
        assert!(!result.output.contains('\u{FEFF}'));
        assert!(result.output.contains("\"a\""));

        let request = "\u{FEFF}GET /a?x=secret HTTP/1.1\nHost: h\n\n";
        assert_eq!(redactor.detect(request, &settings), FormatLabel::HttpRequest);
        let result = redactor.redact(request, &settings).await.unwrap();
        assert_eq!(result.format, FormatLabel::HttpRequest);
        assert!(result.output.starts_with("GET /a?x="));
        assert!(!result.output.contains("secret"));
    }

    #[tokio::test]
    async fn test_compute_drops_byte_order_mark() {
        let settings = RedactionSettings::default();
        let text = "\u{FEFF}{\"a\": 1}";
        let result = redactor()
            .compute(FormatLabel::Json, text, text.trim(), &settings)
            .await
            .unwrap();
        assert_eq!(result.format, FormatLabel::Json);
        assert!(result.input.starts_with('{'));
    }

    #[tokio::test]
    async fn test_sort_keys_preference() {
        let settings = RedactionSettings::default();
        let result = redactor()
            .with_preferences(Preferences { sort_keys: true })
            .redact("{\"b\": 1, \"a\": 2}", &settings)
            .await
            .unwrap();
        assert!(result.input.find("\"a\"") < result.input.find("\"b\""));
        assert!(result.output.find("\"a\"") < result.output.find("\"b\""));
    }
}
