//! Free-text redaction
//!
//! Text is cut into runs of word characters (letters, digits, underscore) and
//! runs of everything else. Separators are kept as-is. A pure-letter run is
//! replaced by a dictionary word with the same letter count and case pattern;
//! any other run is rewritten character by character.

use rand::Rng;

use crate::context::RedactionContext;

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePattern {
    Upper,
    Title,
    Lower,
}

impl CasePattern {
    pub fn of(word: &str) -> Self {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return CasePattern::Lower;
        };

        let has_upper = word.chars().any(char::is_uppercase);
        let has_lower = word.chars().any(char::is_lowercase);
        if has_upper && !has_lower {
            return CasePattern::Upper;
        }
        if first.is_uppercase() && !chars.any(char::is_uppercase) {
            return CasePattern::Title;
        }
        CasePattern::Lower
    }

    pub fn apply(&self, word: &str) -> String {
        match self {
            CasePattern::Upper => word.to_uppercase(),
            CasePattern::Lower => word.to_lowercase(),
            CasePattern::Title => {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first
                        .to_uppercase()
                        .chain(chars.as_str().to_lowercase().chars())
                        .collect(),
                    None => String::new(),
                }
            }
        }
    }
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric() || c == '_'
}

/// Split `text` into alternating word and separator runs.
pub fn runs(text: &str) -> Vec<(&str, bool)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut current: Option<bool> = None;

    for (i, c) in text.char_indices() {
        let word = is_word_char(c);
        match current {
            Some(kind) if kind == word => {}
            Some(kind) => {
                out.push((&text[start..i], kind));
                start = i;
                current = Some(word);
            }
            None => current = Some(word),
        }
    }
    if let Some(kind) = current {
        out.push((&text[start..], kind));
    }
    out
}

pub fn redact_string(ctx: &RedactionContext<'_>, text: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut out = String::with_capacity(text.len());

    for (run, is_word) in runs(text) {
        if !is_word || ctx.is_ignored(run) {
            out.push_str(run);
            continue;
        }
        out.push_str(&redact_word(ctx, run, &mut rng));
    }
    out
}

fn redact_word<R: Rng + ?Sized>(ctx: &RedactionContext<'_>, word: &str, rng: &mut R) -> String {
    let chars = word.chars().count();
    let letters = word.chars().filter(|c| c.is_alphabetic()).count();

    if letters == chars {
        if let Some(replacement) = ctx.dictionary().pick(letters, rng) {
            return CasePattern::of(word).apply(replacement);
        }
    }
    scramble(word, rng)
}

/// Per-character fallback: digits become random digits, letters random ASCII
/// letters of the same case, anything else is kept.
pub fn scramble<R: Rng + ?Sized>(word: &str, rng: &mut R) -> String {
    word.chars()
        .map(|c| {
            if c.is_numeric() {
                char::from(b'0' + rng.gen_range(0..10u8))
            } else if c.is_alphabetic() {
                let pool = if c.is_uppercase() { UPPER } else { LOWER };
                char::from(pool[rng.gen_range(0..pool.len())])
            } else {
                c
            }
        })
        .collect()
}
