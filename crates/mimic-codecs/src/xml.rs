//! XML codec
//!
//! The XML declaration and DOCTYPE are cut off as raw text and glued back on
//! after serialization. The body is read with `quick-xml` into a small tree,
//! strictly first and then in a lenient HTML-like mode (void elements,
//! unquoted attributes, unmatched end tags). Comments, CDATA, processing
//! instructions and doctypes are kept as verbatim markup and never redacted.

use lazy_static::lazy_static;
use mimic_core::{FormatLabel, RedactionResult};
use mimic_redact::RedactionContext;
use quick_xml::escape::{escape, partial_escape, unescape};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;

use crate::{CodecError, Result};

lazy_static! {
    static ref DECLARATION: Regex = Regex::new(r"(?i)^\s*(<\?xml[^>]*\?>\s*)").unwrap();
    static ref DOCTYPE: Regex =
        Regex::new(r"(?i)^\s*<!DOCTYPE(?:[^\[>]|\[[^\]]*\])*>\s*").unwrap();
    static ref TAG_BOUNDARY: Regex = Regex::new(r">\s*<").unwrap();
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Strict,
    Lenient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    /// Written as `<name/>` in the source.
    pub empty_tag: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    /// Comment, CDATA section, processing instruction or doctype, verbatim.
    Markup(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlDocument {
    /// XML declaration and DOCTYPE exactly as they appeared.
    pub prolog: String,
    pub nodes: Vec<XmlNode>,
}

/// Split off the declaration and DOCTYPE, returning `(prolog, body)`.
pub fn split_prolog(text: &str) -> (String, &str) {
    let mut prolog = String::new();
    let mut rest = text;

    if let Some(caps) = DECLARATION.captures(rest) {
        if let (Some(all), Some(decl)) = (caps.get(0), caps.get(1)) {
            prolog.push_str(decl.as_str());
            rest = &rest[all.end()..];
        }
    }
    if let Some(m) = DOCTYPE.find(rest) {
        prolog.push_str(m.as_str());
        rest = &rest[m.end()..];
    }
    (prolog, rest)
}

fn xml_error(err: impl std::fmt::Display) -> CodecError {
    CodecError::Xml(err.to_string())
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(xml_error)
}

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

fn element(start: &BytesStart<'_>, mode: ParseMode, empty_tag: bool) -> Result<XmlElement> {
    let name = utf8(start.name().as_ref())?;
    let mut attributes = Vec::new();

    let attrs = match mode {
        ParseMode::Strict => start.attributes(),
        ParseMode::Lenient => start.html_attributes(),
    };
    for attr in attrs {
        let attr = match (attr, mode) {
            (Ok(attr), _) => attr,
            (Err(err), ParseMode::Strict) => return Err(xml_error(err)),
            (Err(_), ParseMode::Lenient) => continue,
        };
        let key = utf8(attr.key.as_ref())?;
        let raw = utf8(&attr.value)?;
        let value = match unescape(&raw) {
            Ok(value) => value.into_owned(),
            Err(err) if mode == ParseMode::Strict => return Err(xml_error(err)),
            Err(_) => raw.clone(),
        };
        attributes.push((key, value));
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
        empty_tag,
    })
}

struct TreeBuilder {
    stack: Vec<XmlElement>,
    nodes: Vec<XmlNode>,
}

impl TreeBuilder {
    fn push(&mut self, node: XmlNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.nodes.push(node),
        }
    }

    fn close_top(&mut self) {
        if let Some(done) = self.stack.pop() {
            self.push(XmlNode::Element(done));
        }
    }
}

/// Parse the part of a document that follows the prolog.
pub fn parse_body(text: &str, mode: ParseMode) -> Result<Vec<XmlNode>> {
    let mut reader = Reader::from_str(text);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = mode == ParseMode::Strict;
    config.allow_unmatched_ends = mode == ParseMode::Lenient;

    let mut tree = TreeBuilder {
        stack: Vec::new(),
        nodes: Vec::new(),
    };

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader.read_event().map_err(xml_error)?;
        let end = reader.buffer_position() as usize;
        let raw = text.get(start..end).unwrap_or_default();

        match event {
            Event::Start(e) => {
                let el = element(&e, mode, false)?;
                if mode == ParseMode::Lenient && is_void(&el.name) {
                    tree.push(XmlNode::Element(XmlElement { empty_tag: true, ..el }));
                } else {
                    tree.stack.push(el);
                }
            }
            Event::Empty(e) => {
                let el = element(&e, mode, true)?;
                tree.push(XmlNode::Element(el));
            }
            Event::End(e) => {
                let name = utf8(e.name().as_ref())?;
                match mode {
                    ParseMode::Strict => tree.close_top(),
                    ParseMode::Lenient => {
                        if let Some(index) = tree.stack.iter().rposition(|el| el.name == name) {
                            while tree.stack.len() > index {
                                tree.close_top();
                            }
                        }
                    }
                }
            }
            Event::Text(_) => {
                let value = match unescape(raw) {
                    Ok(value) => value.into_owned(),
                    Err(err) if mode == ParseMode::Strict => return Err(xml_error(err)),
                    Err(_) => raw.to_string(),
                };
                if mode == ParseMode::Strict && tree.stack.is_empty() && !value.trim().is_empty()
                {
                    return Err(CodecError::Xml("text outside the root element".to_string()));
                }
                tree.push(XmlNode::Text(value));
            }
            Event::CData(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => {
                tree.push(XmlNode::Markup(raw.to_string()));
            }
            Event::Decl(_) => {
                if mode == ParseMode::Strict {
                    return Err(CodecError::Xml("misplaced XML declaration".to_string()));
                }
            }
            Event::Eof => break,
        }
    }

    if !tree.stack.is_empty() {
        if mode == ParseMode::Strict {
            return Err(CodecError::Xml("unclosed element".to_string()));
        }
        while !tree.stack.is_empty() {
            tree.close_top();
        }
    }

    let roots = tree
        .nodes
        .iter()
        .filter(|node| matches!(node, XmlNode::Element(_)))
        .count();
    match (mode, roots) {
        (_, 0) => Err(CodecError::Xml("no root element".to_string())),
        (ParseMode::Strict, n) if n > 1 => {
            Err(CodecError::Xml("more than one root element".to_string()))
        }
        _ => Ok(tree.nodes),
    }
}

pub fn parse(text: &str, mode: ParseMode) -> Result<XmlDocument> {
    let (prolog, body) = split_prolog(text);
    Ok(XmlDocument {
        prolog,
        nodes: parse_body(body, mode)?,
    })
}

/// Strict parse, then the lenient one.
pub fn parse_any(text: &str) -> Result<XmlDocument> {
    parse(text, ParseMode::Strict).or_else(|strict| {
        tracing::debug!("Strict XML parse failed ({}), retrying leniently", strict);
        parse(text, ParseMode::Lenient)
    })
}

fn redact_node(node: &mut XmlNode, parent: Option<&str>, ctx: &RedactionContext<'_>) {
    match node {
        XmlNode::Text(text) => {
            let parent_protected = parent.is_some_and(|name| ctx.is_protected(name));
            if !text.trim().is_empty() && !parent_protected {
                *text = ctx.redact_primitive(text).into_text();
            }
        }
        XmlNode::Element(el) => {
            for (name, value) in el.attributes.iter_mut() {
                if !ctx.is_protected(name) {
                    *value = ctx.redact_primitive(value).into_text();
                }
            }
            let XmlElement { name, children, .. } = el;
            for child in children.iter_mut() {
                redact_node(child, Some(name.as_str()), ctx);
            }
        }
        XmlNode::Markup(_) => {}
    }
}

pub fn redact_document(doc: &mut XmlDocument, ctx: &RedactionContext<'_>) {
    for node in doc.nodes.iter_mut() {
        redact_node(node, None, ctx);
    }
}

fn write_node(node: &XmlNode, out: &mut String) {
    match node {
        XmlNode::Text(text) => out.push_str(&partial_escape(text.as_str())),
        XmlNode::Markup(raw) => out.push_str(raw),
        XmlNode::Element(el) => {
            out.push('<');
            out.push_str(&el.name);
            for (name, value) in &el.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape(value.as_str()));
                out.push('"');
            }
            if el.empty_tag && el.children.is_empty() {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in &el.children {
                write_node(child, out);
            }
            out.push_str("</");
            out.push_str(&el.name);
            out.push('>');
        }
    }
}

/// Single-line serialization of the body, without the prolog.
pub fn serialize(nodes: &[XmlNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

/// Re-indent serialized markup with two spaces per open element.
pub fn pretty_print(xml: &str) -> String {
    let parts: Vec<&str> = TAG_BOUNDARY.split(xml).collect();
    if parts.len() == 1 {
        return xml.to_string();
    }

    let last = parts.len() - 1;
    let mut out = String::with_capacity(xml.len() + parts.len() * 4);
    let mut depth = 0usize;

    for (index, part) in parts.iter().enumerate() {
        let closing = part.starts_with('/');
        if closing {
            depth = depth.saturating_sub(1);
        }

        let rebuilt = if index == 0 {
            format!("{}>", part)
        } else if index == last {
            format!("<{}", part)
        } else {
            format!("<{}>", part)
        };

        if !rebuilt.trim().is_empty() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&INDENT.repeat(depth));
            out.push_str(&rebuilt);
        }

        let opens = !closing
            && !part.ends_with('/')
            && !rebuilt.contains("</")
            && !part.starts_with('!')
            && !part.starts_with('?')
            && !part.trim_start_matches('<').starts_with(['!', '?']);
        if opens {
            depth += 1;
        }
    }
    out
}

pub fn redact(text: &str, ctx: &RedactionContext<'_>) -> Result<RedactionResult> {
    let mut doc = parse_any(text)?;
    let input = format!("{}{}", doc.prolog, pretty_print(&serialize(&doc.nodes)));
    redact_document(&mut doc, ctx);
    let output = format!("{}{}", doc.prolog, pretty_print(&serialize(&doc.nodes)));
    Ok(RedactionResult::new(input, output, FormatLabel::Xml))
}

/// Message body: strict parse only, single-line output.
pub fn redact_body(text: &str, ctx: &RedactionContext<'_>) -> Result<String> {
    let mut doc = parse(text, ParseMode::Strict)?;
    redact_document(&mut doc, ctx);
    Ok(format!("{}{}", doc.prolog, serialize(&doc.nodes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mimic_core::{Dictionary, RedactionSettings};

    fn with_ctx<F: FnOnce(&RedactionContext<'_>)>(settings: RedactionSettings, f: F) {
        let dictionary = Dictionary::from_words(["river", "stone", "cloud", "ember"]);
        let ctx = RedactionContext::new(&settings, &dictionary);
        f(&ctx);
    }

    #[test]
    fn test_split_prolog() {
        let text = "<?xml version=\"1.0\"?>\n<!DOCTYPE note [\n<!ELEMENT note (#PCDATA)>\n]>\n<note>x</note>";
        let (prolog, body) = split_prolog(text);
        assert!(prolog.starts_with("<?xml"));
        assert!(prolog.contains("<!ELEMENT note"));
        assert_eq!(body, "<note>x</note>");
    }

    #[test]
    fn test_strict_rejects_ill_formed() {
        assert!(parse("<a><b></a>", ParseMode::Strict).is_err());
        assert!(parse("<a></a><b></b>", ParseMode::Strict).is_err());
        assert!(parse("hello <a/>", ParseMode::Strict).is_err());
        assert!(parse("plain words", ParseMode::Strict).is_err());
        assert!(parse("<a>1</a>", ParseMode::Strict).is_ok());
    }

    #[test]
    fn test_lenient_accepts_html() {
        let doc = parse("<div class=main><br><p>Hi</div>", ParseMode::Lenient).unwrap();
        let html = serialize(&doc.nodes);
        assert_eq!(html, "<div class=\"main\"><br/><p>Hi</p></div>");
        assert!(parse("no markup here", ParseMode::Lenient).is_err());
    }

    #[test]
    fn test_pretty_print() {
        let xml = "<root><a x=\"1\">text</a><b/><c><d>v</d></c></root>";
        let expected = "<root>\n  <a x=\"1\">text</a>\n  <b/>\n  <c>\n    <d>v</d>\n  </c>\n</root>";
        assert_eq!(pretty_print(xml), expected);
        assert_eq!(pretty_print("<single/>"), "<single/>");
    }

    #[test]
    fn test_pretty_print_comment_does_not_indent() {
        let xml = "<root><!-- note --><a>1</a></root>";
        assert_eq!(
            pretty_print(xml),
            "<root>\n  <!-- note -->\n  <a>1</a>\n</root>"
        );
    }

    #[test]
    fn test_redact_respects_protected_names() {
        let settings = RedactionSettings::default().with_protected_fields(["id", "code"]);
        with_ctx(settings, |ctx| {
            let text = "<?xml version=\"1.0\"?><user id=\"u-1\" name=\"Alice\"><code>ABC</code><city>Paris</city><!-- keep --></user>";
            let result = redact(text, ctx).unwrap();
            assert_eq!(result.format, FormatLabel::Xml);
            assert!(result.input.starts_with("<?xml version=\"1.0\"?><user"));
            assert!(result.output.starts_with("<?xml version=\"1.0\"?>"));

            let (_, body) = split_prolog(&result.output);
            let nodes = parse_body(body, ParseMode::Strict).unwrap();
            let XmlNode::Element(user) = &nodes[0] else {
                panic!("expected element");
            };
            assert_eq!(user.attributes[0], ("id".to_string(), "u-1".to_string()));
            assert_eq!(user.attributes[1].1.len(), 5);
            assert_ne!(user.attributes[1].1, "Alice");

            let texts: Vec<String> = user
                .children
                .iter()
                .filter_map(|child| match child {
                    XmlNode::Element(el) => match el.children.first() {
                        Some(XmlNode::Text(t)) => Some(t.clone()),
                        _ => None,
                    },
                    _ => None,
                })
                .collect();
            assert_eq!(texts[0], "ABC");
            assert_eq!(texts[1].len(), 5);
            assert!(result.output.contains("<!-- keep -->"));
        });
    }

    #[test]
    fn test_body_is_compact_and_escaped() {
        with_ctx(RedactionSettings::default(), |ctx| {
            let out = redact_body("<a note=\"x &amp; y\">1 &lt; 2</a>", ctx).unwrap();
            assert!(out.starts_with("<a note=\""));
            assert!(out.contains("&amp;"));
            assert!(out.contains("&lt;"));
            assert!(!out.contains('\n'));
        });
    }
}
