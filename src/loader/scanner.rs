//! Markup scanner producing a small element tree.
//!
//! The scanner accepts the subset of XML that Qt Linguist writes: an XML
//! declaration, a doctype, comments, processing instructions, CDATA sections
//! and elements with quoted attributes. Text nodes keep their escaped form;
//! attribute values are decoded. Every node records its byte offset so load
//! errors can point at the source.

use super::diagnostics::ParseErrorKind;
use crate::markup::{escape_text, first_invalid_entity, unescape};

/// Deepest element nesting accepted. `.ts` files use four levels.
pub(super) const MAX_DEPTH: usize = 64;

/// A decoded attribute.
#[derive(Debug)]
pub(super) struct Attribute {
    pub(super) name: String,
    pub(super) value: String,
}

/// Element or text child.
#[derive(Debug)]
pub(super) enum Node {
    Element(Element),
    Text { raw: String, offset: usize },
}

/// A parsed element with its children.
#[derive(Debug)]
pub(super) struct Element {
    pub(super) name: String,
    pub(super) attributes: Vec<Attribute>,
    pub(super) children: Vec<Node>,
    /// Byte offset of the opening `<`.
    pub(super) offset: usize,
    /// Length of the start tag in bytes.
    pub(super) tag_len: usize,
}

impl Element {
    pub(super) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }
}

/// Scanner failure before it is bound to a source name.
#[derive(Debug)]
pub(super) struct Failure {
    pub(super) kind: ParseErrorKind,
    pub(super) offset: usize,
    pub(super) len: usize,
}

impl Failure {
    pub(super) const fn new(kind: ParseErrorKind, offset: usize, len: usize) -> Self {
        Self { kind, offset, len }
    }
}

type Scan<T> = Result<T, Failure>;

/// Parse `src` into its root element.
pub(super) fn parse_document(src: &str) -> Scan<Element> {
    let mut scanner = Scanner { src, pos: 0 };
    scanner.skip_misc()?;
    let rest = scanner.rest();
    if rest.is_empty() {
        return Err(Failure::new(ParseErrorKind::MissingRoot, 0, 0));
    }
    if !rest.starts_with('<') {
        return Err(Failure::new(
            ParseErrorKind::UnexpectedText {
                parent: String::from("document"),
            },
            scanner.pos,
            1,
        ));
    }
    let root = scanner.element(1)?;
    scanner.skip_misc()?;
    if !scanner.rest().is_empty() {
        return Err(Failure::new(ParseErrorKind::TrailingContent, scanner.pos, 1));
    }
    Ok(root)
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn rest(&self) -> &'a str {
        self.src.get(self.pos..).unwrap_or_default()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Advance past `terminator`, returning the text before it.
    fn take_until(&mut self, terminator: &str, construct: &'static str, start: usize) -> Scan<&'a str> {
        let rest = self.rest();
        let Some(end) = rest.find(terminator) else {
            return Err(Failure::new(
                ParseErrorKind::Unterminated { construct },
                start,
                self.pos.saturating_sub(start),
            ));
        };
        self.pos += end + terminator.len();
        Ok(rest.get(..end).unwrap_or_default())
    }

    /// Skip whitespace, comments, processing instructions and the doctype.
    fn skip_misc(&mut self) -> Scan<()> {
        loop {
            self.skip_whitespace();
            let start = self.pos;
            if self.eat("<?") {
                self.take_until("?>", "processing instruction", start)?;
            } else if self.eat("<!--") {
                self.take_until("-->", "comment", start)?;
            } else if self.eat("<!DOCTYPE") {
                self.skip_doctype(start)?;
            } else {
                return Ok(());
            }
        }
    }

    fn skip_doctype(&mut self, start: usize) -> Scan<()> {
        let rest = self.rest();
        let subset = rest.find('[');
        let close = rest.find('>');
        match (subset, close) {
            (Some(open), Some(end)) if open < end => {
                self.pos += open + 1;
                self.take_until("]", "doctype", start)?;
                self.take_until(">", "doctype", start)?;
            }
            _ => {
                self.take_until(">", "doctype", start)?;
            }
        }
        Ok(())
    }

    fn name(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest
            .find(|c: char| c.is_whitespace() || matches!(c, '/' | '>' | '=' | '<' | '"' | '\''))
            .unwrap_or(rest.len());
        self.pos += len;
        rest.get(..len).unwrap_or_default()
    }

    fn element(&mut self, depth: usize) -> Scan<Element> {
        let start = self.pos;
        if depth > MAX_DEPTH {
            return Err(Failure::new(ParseErrorKind::TooDeep { limit: MAX_DEPTH }, start, 1));
        }
        self.pos += 1;
        let name = self.name();
        if name.is_empty() {
            return Err(Failure::new(
                ParseErrorKind::MalformedTag {
                    detail: "missing element name",
                },
                start,
                1,
            ));
        }
        let mut element = Element {
            name: name.to_owned(),
            attributes: Vec::new(),
            children: Vec::new(),
            offset: start,
            tag_len: 0,
        };

        loop {
            self.skip_whitespace();
            let rest = self.rest();
            if rest.is_empty() {
                return Err(Failure::new(
                    ParseErrorKind::UnclosedElement {
                        name: element.name,
                    },
                    start,
                    self.pos - start,
                ));
            }
            if self.eat("/>") {
                element.tag_len = self.pos - start;
                return Ok(element);
            }
            if self.eat(">") {
                break;
            }
            let attribute = self.attribute(&element)?;
            element.attributes.push(attribute);
        }

        element.tag_len = self.pos - start;
        self.content(&mut element, depth)?;
        Ok(element)
    }

    fn attribute(&mut self, element: &Element) -> Scan<Attribute> {
        let start = self.pos;
        let name = self.name();
        if name.is_empty() {
            return Err(Failure::new(
                ParseErrorKind::MalformedTag {
                    detail: "expected an attribute name",
                },
                start,
                1,
            ));
        }
        if element.attribute(name).is_some() {
            return Err(Failure::new(
                ParseErrorKind::DuplicateAttribute {
                    element: element.name.clone(),
                    attribute: name.to_owned(),
                },
                start,
                name.len(),
            ));
        }
        self.skip_whitespace();
        if !self.eat("=") {
            return Err(Failure::new(
                ParseErrorKind::MalformedTag {
                    detail: "expected `=` after the attribute name",
                },
                self.pos,
                1,
            ));
        }
        self.skip_whitespace();
        let quote = match self.rest().chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => {
                return Err(Failure::new(
                    ParseErrorKind::MalformedTag {
                        detail: "attribute values must be quoted",
                    },
                    self.pos,
                    1,
                ));
            }
        };
        self.pos += 1;
        let value_start = self.pos;
        let rest = self.rest();
        let Some(end) = rest.find(quote) else {
            return Err(Failure::new(
                ParseErrorKind::Unterminated {
                    construct: "attribute value",
                },
                start,
                value_start - start,
            ));
        };
        let raw = rest.get(..end).unwrap_or_default();
        if let Some(at) = raw.find('<') {
            return Err(Failure::new(
                ParseErrorKind::MalformedTag {
                    detail: "`<` is not allowed in attribute values",
                },
                value_start + at,
                1,
            ));
        }
        if let Some(at) = first_invalid_entity(raw) {
            return Err(Failure::new(ParseErrorKind::InvalidEntity, value_start + at, 1));
        }
        self.pos += end + 1;
        Ok(Attribute {
            name: name.to_owned(),
            value: unescape(raw).into_owned(),
        })
    }

    fn content(&mut self, element: &mut Element, depth: usize) -> Scan<()> {
        loop {
            let start = self.pos;
            let rest = self.rest();
            if rest.is_empty() {
                return Err(Failure::new(
                    ParseErrorKind::UnclosedElement {
                        name: element.name.clone(),
                    },
                    element.offset,
                    element.tag_len,
                ));
            }
            if self.eat("</") {
                let found = self.name();
                self.skip_whitespace();
                if !self.eat(">") {
                    return Err(Failure::new(
                        ParseErrorKind::Unterminated {
                            construct: "end tag",
                        },
                        start,
                        self.pos - start,
                    ));
                }
                if found != element.name {
                    return Err(Failure::new(
                        ParseErrorKind::MismatchedEndTag {
                            expected: element.name.clone(),
                            found: found.to_owned(),
                        },
                        start,
                        self.pos - start,
                    ));
                }
                return Ok(());
            }
            if self.eat("<!--") {
                self.take_until("-->", "comment", start)?;
            } else if self.eat("<![CDATA[") {
                let body = self.take_until("]]>", "CDATA section", start)?;
                element.children.push(Node::Text {
                    raw: escape_text(body).into_owned(),
                    offset: start,
                });
            } else if self.eat("<?") {
                self.take_until("?>", "processing instruction", start)?;
            } else if rest.starts_with('<') {
                let child = self.element(depth + 1)?;
                element.children.push(Node::Element(child));
            } else {
                let len = rest.find('<').unwrap_or(rest.len());
                let raw = rest.get(..len).unwrap_or_default();
                if let Some(at) = first_invalid_entity(raw) {
                    return Err(Failure::new(ParseErrorKind::InvalidEntity, start + at, 1));
                }
                self.pos += len;
                element.children.push(Node::Text {
                    raw: raw.to_owned(),
                    offset: start,
                });
            }
        }
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests fail loudly on unexpected parse results")]
mod tests {
    use super::*;

    fn kind_of(src: &str) -> ParseErrorKind {
        match parse_document(src) {
            Ok(root) => panic!("expected failure, parsed <{}>", root.name),
            Err(failure) => failure.kind,
        }
    }

    #[test]
    fn parses_prolog_attributes_and_text() {
        let src = concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n",
            "<!DOCTYPE TS>\n",
            "<!-- generated -->\n",
            "<TS version='2.0' language=\"it_IT\">",
            "<context><name>A &amp; B</name></context>",
            "</TS>\n",
        );
        let root = parse_document(src).expect("document parses");
        assert_eq!(root.name, "TS");
        assert_eq!(root.attribute("version"), Some("2.0"));
        assert_eq!(root.attribute("language"), Some("it_IT"));
        let Some(Node::Element(context)) = root.children.first() else {
            panic!("expected context element");
        };
        let Some(Node::Element(name)) = context.children.first() else {
            panic!("expected name element");
        };
        assert!(matches!(
            name.children.first(),
            Some(Node::Text { raw, .. }) if raw == "A &amp; B"
        ));
    }

    #[test]
    fn cdata_is_stored_escaped() {
        let root = parse_document("<source><![CDATA[<b>&</b>]]></source>").expect("parses");
        assert!(matches!(
            root.children.first(),
            Some(Node::Text { raw, .. }) if raw == "&lt;b&gt;&amp;&lt;/b&gt;"
        ));
    }

    #[test]
    fn doctype_with_internal_subset_is_skipped() {
        let root = parse_document("<!DOCTYPE TS [ <!ENTITY x \"y\"> ]><TS/>").expect("parses");
        assert_eq!(root.name, "TS");
        assert_eq!(root.tag_len, 5);
    }

    #[test]
    fn reports_unclosed_element_at_its_start_tag() {
        let failure = parse_document("<TS>\n<context>").expect_err("unclosed");
        assert_eq!(
            failure.kind,
            ParseErrorKind::UnclosedElement {
                name: "context".into()
            }
        );
        assert_eq!(failure.offset, 5);
    }

    #[test]
    fn rejects_structural_errors() {
        assert!(matches!(kind_of("<TS></ts>"), ParseErrorKind::MismatchedEndTag { .. }));
        assert!(matches!(kind_of("<TS a=\"1\" a=\"2\"/>"), ParseErrorKind::DuplicateAttribute { .. }));
        assert!(matches!(kind_of("<TS a=1/>"), ParseErrorKind::MalformedTag { .. }));
        assert!(matches!(kind_of("<TS>&nbsp;</TS>"), ParseErrorKind::InvalidEntity));
        assert!(matches!(kind_of("<TS/><TS/>"), ParseErrorKind::TrailingContent));
        assert!(matches!(kind_of("<!-- open"), ParseErrorKind::Unterminated { .. }));
        assert!(matches!(kind_of("   "), ParseErrorKind::MissingRoot));
        assert!(matches!(kind_of("text"), ParseErrorKind::UnexpectedText { .. }));
    }

    #[test]
    fn rejects_excessive_nesting() {
        let depth = MAX_DEPTH + 1;
        let src = format!("{}{}", "<a>".repeat(depth), "</a>".repeat(depth));
        assert!(matches!(kind_of(&src), ParseErrorKind::TooDeep { .. }));
    }
}
