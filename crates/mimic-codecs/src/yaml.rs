//! YAML codec
//!
//! Documents are loaded from `yaml-rust2` parser events into a small node
//! tree that keeps every plain scalar's source text, so numbers are redacted
//! from the literal as written. The tree is dumped by a block-style writer
//! that double-quotes every string value. Sequences under a mapping key are
//! not indented.

use std::collections::HashMap;

use lazy_static::lazy_static;
use mimic_core::{FormatLabel, RedactionResult};
use mimic_redact::RedactionContext;
use rand::Rng;
use regex::Regex;
use yaml_rust2::parser::{Event, EventReceiver, Parser, Tag};
use yaml_rust2::scanner::TScalarStyle;

use crate::json::is_csrf_key;
use crate::{CodecError, Result};

const INDENT: &str = "  ";
const CORE_TAG: &str = "tag:yaml.org,2002:";

lazy_static! {
    static ref DECIMAL: Regex =
        Regex::new(r"^[-+]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][-+]?[0-9]+)?$").unwrap();
    static ref SPECIAL_NUMBER: Regex = Regex::new(
        r"^(?:[-+]?(?:0x[0-9a-fA-F]+|0o[0-7]+|0b[01]+|\.inf|\.Inf|\.INF)|\.nan|\.NaN|\.NAN)$"
    )
    .unwrap();
}

/// Document tree. Numbers carry their literal text.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlNode {
    Null,
    Bool(bool),
    Number(String),
    String(String),
    Seq(Vec<YamlNode>),
    Map(Vec<(YamlNode, YamlNode)>),
}

impl YamlNode {
    fn is_block(&self) -> bool {
        match self {
            YamlNode::Seq(items) => !items.is_empty(),
            YamlNode::Map(entries) => !entries.is_empty(),
            _ => false,
        }
    }

    fn scalar_text(&self) -> Option<String> {
        match self {
            YamlNode::String(s) | YamlNode::Number(s) => Some(s.clone()),
            YamlNode::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

fn is_null(value: &str) -> bool {
    matches!(value, "" | "~" | "null" | "Null" | "NULL")
}

/// Leading zeros followed by digits only is a string in YAML 1.2.
fn digits_but_not_number(value: &str) -> bool {
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    unsigned.len() > 1 && unsigned.starts_with('0') && unsigned.bytes().all(|b| b.is_ascii_digit())
}

fn is_number(value: &str) -> bool {
    (DECIMAL.is_match(value) && !digits_but_not_number(value)) || SPECIAL_NUMBER.is_match(value)
}

/// Resolve a plain scalar with the YAML 1.2 core schema.
fn resolve_plain(value: String) -> YamlNode {
    if is_null(&value) {
        YamlNode::Null
    } else if let Some(b) = parse_bool(&value) {
        YamlNode::Bool(b)
    } else if is_number(&value) {
        YamlNode::Number(value)
    } else {
        YamlNode::String(value)
    }
}

fn resolve_scalar(value: String, style: TScalarStyle, tag: Option<Tag>) -> Result<YamlNode> {
    let Some(tag) = tag else {
        return Ok(match style {
            TScalarStyle::Plain => resolve_plain(value),
            _ => YamlNode::String(value),
        });
    };
    if tag.handle != CORE_TAG {
        return Err(unsupported_tag(&tag));
    }
    Ok(match tag.suffix.as_str() {
        "str" => YamlNode::String(value),
        "null" if is_null(&value) => YamlNode::Null,
        "bool" => match parse_bool(&value) {
            Some(b) => YamlNode::Bool(b),
            None => return Err(invalid_scalar(&value, &tag)),
        },
        "int" | "float" if is_number(&value) => YamlNode::Number(value),
        _ => return Err(invalid_scalar(&value, &tag)),
    })
}

fn invalid_scalar(value: &str, tag: &Tag) -> CodecError {
    CodecError::Unsupported(format!("{:?} is not a valid !!{}", value, tag.suffix))
}

fn check_collection_tag(tag: Option<&Tag>, suffix: &str) -> Result<()> {
    match tag {
        None => Ok(()),
        Some(tag) if tag.handle == CORE_TAG && tag.suffix == suffix => Ok(()),
        Some(tag) => Err(unsupported_tag(tag)),
    }
}

fn unsupported_tag(tag: &Tag) -> CodecError {
    CodecError::Unsupported(format!("YAML tag {}{} is not supported", tag.handle, tag.suffix))
}

enum Frame {
    Seq(usize, Vec<YamlNode>),
    Map(usize, Vec<(YamlNode, YamlNode)>, Option<YamlNode>),
}

/// Builds one node tree per document from parser events. Aliases are
/// expanded to a copy of the anchored node.
#[derive(Default)]
struct TreeBuilder {
    stack: Vec<Frame>,
    anchors: HashMap<usize, YamlNode>,
    documents: Vec<YamlNode>,
    error: Option<CodecError>,
}

impl TreeBuilder {
    fn handle(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Scalar(value, style, anchor, tag) => {
                let node = resolve_scalar(value, style, tag)?;
                self.insert(node, anchor)?;
            }
            Event::SequenceStart(anchor, tag) => {
                check_collection_tag(tag.as_ref(), "seq")?;
                self.stack.push(Frame::Seq(anchor, Vec::new()));
            }
            Event::MappingStart(anchor, tag) => {
                check_collection_tag(tag.as_ref(), "map")?;
                self.stack.push(Frame::Map(anchor, Vec::new(), None));
            }
            Event::SequenceEnd | Event::MappingEnd => match self.stack.pop() {
                Some(Frame::Seq(anchor, items)) => self.insert(YamlNode::Seq(items), anchor)?,
                Some(Frame::Map(anchor, entries, None)) => {
                    self.insert(YamlNode::Map(entries), anchor)?
                }
                _ => return Err(CodecError::Unsupported("unbalanced YAML events".to_string())),
            },
            Event::Alias(id) => {
                let node = self
                    .anchors
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| CodecError::Unsupported("unknown YAML alias".to_string()))?;
                self.insert(node, 0)?;
            }
            _ => {}
        }
        Ok(())
    }

    fn insert(&mut self, node: YamlNode, anchor: usize) -> Result<()> {
        if anchor > 0 {
            self.anchors.insert(anchor, node.clone());
        }
        match self.stack.last_mut() {
            None => self.documents.push(node),
            Some(Frame::Seq(_, items)) => items.push(node),
            Some(Frame::Map(_, entries, pending)) => match pending.take() {
                None => *pending = Some(node),
                Some(key) => {
                    if entries.iter().any(|(existing, _)| *existing == key) {
                        return Err(CodecError::Unsupported(format!(
                            "duplicate YAML key {}",
                            inline(&key)
                        )));
                    }
                    entries.push((key, node));
                }
            },
        }
        Ok(())
    }
}

impl EventReceiver for TreeBuilder {
    fn on_event(&mut self, event: Event) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.handle(event) {
            self.error = Some(e);
        }
    }
}

/// Load a single document that is a non-empty mapping or sequence.
pub fn parse_document(text: &str) -> Result<YamlNode> {
    let mut builder = TreeBuilder::default();
    let mut parser = Parser::new_from_str(text);
    parser.load(&mut builder, true)?;
    if let Some(error) = builder.error {
        return Err(error);
    }

    let mut documents = builder.documents.into_iter();
    let (Some(document), None) = (documents.next(), documents.next()) else {
        return Err(CodecError::Unsupported(
            "expected exactly one YAML document".to_string(),
        ));
    };
    if document.is_block() {
        Ok(document)
    } else {
        Err(CodecError::Unsupported(
            "YAML document is not a collection".to_string(),
        ))
    }
}

/// Replace every digit, keeping a non-zero leading digit non-zero.
fn scramble_digits(literal: &str) -> String {
    let mut rng = rand::thread_rng();
    let mut seen_digit = false;
    literal
        .chars()
        .map(|c| {
            if !c.is_ascii_digit() {
                return c;
            }
            let low = if !seen_digit && c != '0' { 1 } else { 0 };
            seen_digit = true;
            char::from(b'0' + rng.gen_range(low..10u8))
        })
        .collect()
}

fn redact_number(literal: &str, ctx: &RedactionContext<'_>) -> String {
    if SPECIAL_NUMBER.is_match(literal) {
        return literal.to_string();
    }
    let (plus, unsigned) = match literal.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", literal),
    };
    match ctx.redact_number(unsigned) {
        Some(fake) => format!("{}{}", plus, fake.literal()),
        None => scramble_digits(literal),
    }
}

pub fn redact_value(node: &YamlNode, key: Option<&str>, ctx: &RedactionContext<'_>) -> YamlNode {
    if *node == YamlNode::Null {
        return YamlNode::Null;
    }
    if let Some(key) = key {
        if ctx.is_protected(key) {
            return node.clone();
        }
        if is_csrf_key(key, ctx) {
            let text = node
                .scalar_text()
                .unwrap_or_else(|| dump(node).trim_end().to_string());
            return YamlNode::String(ctx.redact_string(&text));
        }
    }

    match node {
        YamlNode::Null => YamlNode::Null,
        YamlNode::Bool(_) => YamlNode::Bool(rand::thread_rng().r#gen()),
        YamlNode::Number(literal) => YamlNode::Number(redact_number(literal, ctx)),
        YamlNode::String(s) => YamlNode::String(ctx.redact_primitive(s).into_text()),
        YamlNode::Seq(items) => {
            YamlNode::Seq(items.iter().map(|item| redact_value(item, None, ctx)).collect())
        }
        YamlNode::Map(entries) => YamlNode::Map(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), redact_value(v, k.scalar_text().as_deref(), ctx)))
                .collect(),
        ),
    }
}

/// Double-quoted scalar with YAML escapes.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\x{:02X}", c as u32)),
            '\u{FEFF}' => out.push_str("\\uFEFF"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

const AMBIGUOUS: &[&str] = &[
    "true", "false", "yes", "no", "on", "off", "null", "y", "n", "~",
];

fn is_plain_key(key: &str) -> bool {
    let Some(first) = key.chars().next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_')
        && !key.ends_with(' ')
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | ' '))
        && !AMBIGUOUS.contains(&key.to_lowercase().as_str())
}

fn render_key(key: &YamlNode) -> String {
    match key {
        YamlNode::String(s) if is_plain_key(s) => s.clone(),
        YamlNode::String(s) => quote(s),
        other => inline(other),
    }
}

/// Flow rendering for scalars, empty collections and complex keys.
fn inline(node: &YamlNode) -> String {
    match node {
        YamlNode::Null => "null".to_string(),
        YamlNode::Bool(b) => b.to_string(),
        YamlNode::Number(n) => n.clone(),
        YamlNode::String(s) => quote(s),
        YamlNode::Seq(items) => format!(
            "[{}]",
            items.iter().map(inline).collect::<Vec<_>>().join(", ")
        ),
        YamlNode::Map(entries) => format!(
            "{{{}}}",
            entries
                .iter()
                .map(|(k, v)| format!("{}: {}", render_key(k), inline(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

fn lines(node: &YamlNode) -> Vec<String> {
    match node {
        YamlNode::Map(entries) if !entries.is_empty() => {
            let mut out = Vec::new();
            for (key, value) in entries {
                let key = render_key(key);
                match value {
                    YamlNode::Map(_) if value.is_block() => {
                        out.push(format!("{}:", key));
                        out.extend(lines(value).into_iter().map(|l| format!("{}{}", INDENT, l)));
                    }
                    YamlNode::Seq(_) if value.is_block() => {
                        out.push(format!("{}:", key));
                        out.extend(lines(value));
                    }
                    _ => out.push(format!("{}: {}", key, inline(value))),
                }
            }
            out
        }
        YamlNode::Seq(items) if !items.is_empty() => {
            let mut out = Vec::new();
            for item in items {
                if item.is_block() {
                    let mut nested = lines(item).into_iter();
                    if let Some(first) = nested.next() {
                        out.push(format!("- {}", first));
                    }
                    out.extend(nested.map(|l| format!("{}{}", INDENT, l)));
                } else {
                    out.push(format!("- {}", inline(item)));
                }
            }
            out
        }
        other => vec![inline(other)],
    }
}

pub fn dump(node: &YamlNode) -> String {
    let mut out = lines(node).join("\n");
    out.push('\n');
    out
}

pub fn redact(text: &str, ctx: &RedactionContext<'_>) -> Result<RedactionResult> {
    let output = redact_body(text, ctx)?;
    Ok(RedactionResult::new(text, output, FormatLabel::Yaml))
}

pub fn redact_body(text: &str, ctx: &RedactionContext<'_>) -> Result<String> {
    let document = parse_document(text)?;
    Ok(dump(&redact_value(&document, None, ctx)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{Dictionary, RedactionSettings};

    fn entry<'a>(node: &'a YamlNode, key: &str) -> &'a YamlNode {
        let YamlNode::Map(entries) = node else {
            panic!("expected a mapping, got {:?}", node);
        };
        entries
            .iter()
            .find(|(k, _)| k.scalar_text().as_deref() == Some(key))
            .map(|(_, v)| v)
            .unwrap()
    }

    #[test]
    fn test_parse_document_requires_collection() {
        assert!(parse_document("a: 1").is_ok());
        assert!(parse_document("- x").is_ok());
        assert!(parse_document("just text").is_err());
        assert!(parse_document("{}").is_err());
        assert!(parse_document("a: [1").is_err());
        assert!(parse_document("a: 1\n---\nb: 2\n").is_err());
        assert!(parse_document("a: 1\na: 2\n").is_err());
    }

    #[test]
    fn test_plain_scalars_keep_source_text() {
        let doc = parse_document(
            "price: 10.50\nsci: 1.5e10\nbig: 123456789012345678901234\nzip: 007\nquoted: \"12\"\non: yes\nnone: ~\nflag: True\n",
        )
        .unwrap();
        assert_eq!(entry(&doc, "price"), &YamlNode::Number("10.50".into()));
        assert_eq!(entry(&doc, "sci"), &YamlNode::Number("1.5e10".into()));
        assert_eq!(
            entry(&doc, "big"),
            &YamlNode::Number("123456789012345678901234".into())
        );
        assert_eq!(entry(&doc, "zip"), &YamlNode::String("007".into()));
        assert_eq!(entry(&doc, "quoted"), &YamlNode::String("12".into()));
        assert_eq!(entry(&doc, "on"), &YamlNode::String("yes".into()));
        assert_eq!(entry(&doc, "none"), &YamlNode::Null);
        assert_eq!(entry(&doc, "flag"), &YamlNode::Bool(true));
    }

    #[test]
    fn test_aliases_are_expanded() {
        let doc = parse_document("base: &b\n  x: 1\ncopy: *b\n").unwrap();
        assert_eq!(entry(&doc, "base"), entry(&doc, "copy"));
    }

    #[test]
    fn test_dump_layout() {
        let node = YamlNode::Map(vec![
            (YamlNode::String("name".into()), YamlNode::String("x".into())),
            (
                YamlNode::String("tags".into()),
                YamlNode::Seq(vec![
                    YamlNode::String("a".into()),
                    YamlNode::Map(vec![
                        (YamlNode::String("k".into()), YamlNode::Number("1".into())),
                        (YamlNode::String("on".into()), YamlNode::Bool(true)),
                    ]),
                ]),
            ),
            (
                YamlNode::String("inner".into()),
                YamlNode::Map(vec![(YamlNode::String("z".into()), YamlNode::Null)]),
            ),
            (YamlNode::String("empty".into()), YamlNode::Seq(vec![])),
        ]);
        let expected = "name: \"x\"\ntags:\n- \"a\"\n- k: 1\n  \"on\": true\ninner:\n  z: null\nempty: []\n";
        assert_eq!(dump(&node), expected);
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("a\"b\\c\nd"), "\"a\\\"b\\\\c\\nd\"");
    }

    #[test]
    fn test_redact_keeps_shape_and_quotes_strings() {
        let settings = RedactionSettings::default().with_protected_fields(["id"]);
        let dictionary = Dictionary::from_words(["null", "true"]);
        let ctx = RedactionContext::new(&settings, &dictionary);

        let text = "id: keep-me\nname: Alex\ncount: 12\nactive: false\nitems:\n  - one\n  - two\n";
        let result = redact(text, &ctx).unwrap();
        assert_eq!(result.input, text);

        let reloaded = parse_document(&result.output).unwrap();
        assert_eq!(entry(&reloaded, "id"), &YamlNode::String("keep-me".into()));
        assert!(matches!(entry(&reloaded, "name"), YamlNode::String(_)));
        assert!(matches!(entry(&reloaded, "count"), YamlNode::Number(n) if n.len() == 2));
        assert!(matches!(entry(&reloaded, "active"), YamlNode::Bool(_)));
        let YamlNode::Seq(items) = entry(&reloaded, "items") else {
            panic!("items is not a sequence");
        };
        assert_eq!(items.len(), 2);
        assert!(matches!(items[0], YamlNode::String(_)));
        assert!(result.output.contains("items:\n- \""));
    }

    #[test]
    fn test_number_literals_keep_their_shape() {
        let settings = RedactionSettings::default();
        let dictionary = Dictionary::default();
        let ctx = RedactionContext::new(&settings, &dictionary);
        let shape = Regex::new(
            r"^price: [0-9]{2}\.[0-9]{2}\nsci: [0-9]\.[0-9]e[0-9]{2}\nbig: [1-9][0-9]{23}\nneg: -[0-9]\nplus: \+[1-9][0-9]\n$",
        )
        .unwrap();

        for _ in 0..20 {
            let output = redact_body(
                "price: 10.50\nsci: 1.5e10\nbig: 123456789012345678901234\nneg: -3\nplus: +42\n",
                &ctx,
            )
            .unwrap();
            assert!(shape.is_match(&output), "unexpected output {:?}", output);
        }
    }

    #[test]
    fn test_protected_number_is_untouched() {
        let settings = RedactionSettings::default().with_protected_fields(["big"]);
        let dictionary = Dictionary::default();
        let ctx = RedactionContext::new(&settings, &dictionary);
        let output = redact_body("big: 123456789012345678901234\nsmall: 1\n", &ctx).unwrap();
        assert!(output.starts_with("big: 123456789012345678901234\n"));
    }

    #[test]
    fn test_tags_are_rejected() {
        let settings = RedactionSettings::default();
        let dictionary = Dictionary::default();
        let ctx = RedactionContext::new(&settings, &dictionary);
        assert!(redact_body("a: !custom 1", &ctx).is_err());
        assert!(redact_body("a: !!str 1", &ctx).is_ok());
    }
}
