use std::collections::HashSet;

use mimic_core::{Dictionary, ProtectedFieldSet, RedactionSettings};

use crate::number::{self, FakeNumber};
use crate::primitive::{self, FakeValue};
use crate::text;

/// Everything a redaction walk needs, passed explicitly down every recursive
/// call. Built once per top-level call and never mutated afterwards.
pub struct RedactionContext<'a> {
    pub settings: &'a RedactionSettings,
    dictionary: &'a Dictionary,
    protected: ProtectedFieldSet,
    ignored: HashSet<String>,
}

impl<'a> RedactionContext<'a> {
    pub fn new(settings: &'a RedactionSettings, dictionary: &'a Dictionary) -> Self {
        let ignored = settings
            .ignored_words
            .iter()
            .map(|word| word.trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();

        Self {
            settings,
            dictionary,
            protected: ProtectedFieldSet::new(&settings.protected_fields),
            ignored,
        }
    }

    pub fn dictionary(&self) -> &Dictionary {
        self.dictionary
    }

    pub fn is_protected(&self, name: &str) -> bool {
        self.protected.is_protected(name)
    }

    pub fn is_ignored(&self, word: &str) -> bool {
        !self.ignored.is_empty() && self.ignored.contains(&word.to_lowercase())
    }

    /// Classify a scalar and replace it with a fake of the same kind.
    pub fn redact_primitive(&self, value: &str) -> FakeValue {
        primitive::redact_primitive(self, value)
    }

    /// Word-by-word substitution that keeps every separator byte-for-byte.
    pub fn redact_string(&self, value: &str) -> String {
        text::redact_string(self, value)
    }

    /// Randomize the digits of a numeric literal; `None` if it is not one.
    pub fn redact_number(&self, literal: &str) -> Option<FakeNumber> {
        number::redact_number(literal)
    }

    /// Line-wise plain-text redaction.
    pub fn redact_lines(&self, value: &str) -> String {
        value
            .split('\n')
            .map(|line| self.redact_string(line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_words_are_case_insensitive() {
        let settings = RedactionSettings::default().with_ignored_words(["Acme", "  "]);
        let dictionary = Dictionary::default();
        let ctx = RedactionContext::new(&settings, &dictionary);
        assert!(ctx.is_ignored("ACME"));
        assert!(ctx.is_ignored("acme"));
        assert!(!ctx.is_ignored(""));
        assert!(!ctx.is_ignored("widget"));
    }

    #[test]
    fn test_redact_lines_keeps_line_structure() {
        let settings = RedactionSettings::default();
        let dictionary = Dictionary::from_words(["alpha", "omega"]);
        let ctx = RedactionContext::new(&settings, &dictionary);
        let out = ctx.redact_lines("hello\r\nworld\n\nbye");
        let lines: Vec<_> = out.split('\n').collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with('\r'));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3].len(), 3);
    }
}
