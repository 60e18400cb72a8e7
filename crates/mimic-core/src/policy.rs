//! Protected-field policy
//!
//! Names are compared in two forms: trimmed and lowercased, and a slug made of
//! the ASCII alphanumerics of that normalized form. `User-Id`, `user id` and
//! `userid` therefore all match an entry of `user_id`.

use std::collections::HashSet;

#[derive(Debug, Clone, Default)]
pub struct ProtectedFieldSet {
    entries: HashSet<String>,
}

impl ProtectedFieldSet {
    /// Build the set from configured names; blank entries are ignored.
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut entries = HashSet::new();
        for field in fields {
            let normalized = normalize(field.as_ref());
            if normalized.is_empty() {
                continue;
            }
            let slug = slugify(&normalized);
            if !slug.is_empty() && slug != normalized {
                entries.insert(slug);
            }
            entries.insert(normalized);
        }
        Self { entries }
    }

    pub fn is_protected(&self, name: &str) -> bool {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return false;
        }
        if self.entries.contains(&normalized) {
            return true;
        }
        let slug = slugify(&normalized);
        !slug.is_empty() && self.entries.contains(&slug)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn slugify(value: &str) -> String {
    value.chars().filter(char::is_ascii_alphanumeric).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_and_case_insensitive_match() {
        let set = ProtectedFieldSet::new(["Theme"]);
        assert!(set.is_protected("theme"));
        assert!(set.is_protected("  THEME "));
        assert!(!set.is_protected("session"));
    }

    #[test]
    fn test_slug_match_ignores_punctuation() {
        let set = ProtectedFieldSet::new(["user_id"]);
        assert!(set.is_protected("user_id"));
        assert!(set.is_protected("User-Id"));
        assert!(set.is_protected("user id"));
        assert!(set.is_protected("userid"));
    }

    #[test]
    fn test_blank_entries_ignored() {
        let set = ProtectedFieldSet::new(["", "   "]);
        assert!(set.is_empty());
        assert!(!set.is_protected(""));
    }

    #[test]
    fn test_punctuation_only_name_is_not_protected_by_empty_slug() {
        let set = ProtectedFieldSet::new(["id"]);
        assert!(!set.is_protected("--"));
    }
}
