//! Catalogue loading.
//!
//! Turns the bytes of a Qt Linguist `.ts` file into a [`Catalog`]. Decoding
//! happens first (UTF-8 only, with an optional byte order mark), then the
//! markup is scanned into an element tree, and finally the tree is read into
//! contexts and messages. Duplicate messages are not an error: the last
//! declaration wins and a [`LoadWarning`] is recorded.

use std::fmt;
use std::fs;

use camino::Utf8Path;
use tracing::{debug, warn};

use crate::catalog::{
    Catalog, CatalogHeader, Duplicate, Location, Message, MessageStatus, Translation,
};
use crate::markup::unescape;

mod diagnostics;
mod scanner;

pub use diagnostics::{EncodingError, LoadError, ParseError, ParseErrorKind};
pub(crate) use diagnostics::line_column;

use scanner::{Element, Failure, Node};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
const DEFAULT_NAME: &str = "catalog.ts";

/// Non-fatal findings reported while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A message key was declared more than once.
    ///
    /// The later declaration wins unless it is obsolete and the earlier one
    /// is live.
    DuplicateMessage {
        /// Context name.
        context: String,
        /// Decoded source text.
        source: String,
        /// Decoded disambiguation comment.
        disambiguation: Option<String>,
        /// Line of the later declaration.
        line: usize,
        /// The later declaration was obsolete and was dropped.
        obsolete_ignored: bool,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateMessage {
                context,
                source,
                disambiguation,
                line,
                obsolete_ignored,
            } => {
                write!(f, "line {line}: duplicate message {source:?} in context {context}")?;
                if let Some(comment) = disambiguation {
                    write!(f, " ({comment})")?;
                }
                if *obsolete_ignored {
                    f.write_str("; the obsolete later declaration is ignored")
                } else {
                    f.write_str("; the later declaration wins")
                }
            }
        }
    }
}

/// A loaded catalogue with the warnings produced while reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    /// The catalogue.
    pub catalog: Catalog,
    /// Non-fatal findings, in file order.
    pub warnings: Vec<LoadWarning>,
}

/// Parse catalogue markup.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] when the markup is malformed.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::loader;
///
/// let loaded = loader::from_str(
///     "<TS version=\"2.1\" language=\"it_IT\"><context><name>MainWindow</name>\
///      <message><source>Quit</source><translation>Chiudi</translation></message>\
///      </context></TS>",
/// )?;
/// assert_eq!(loaded.catalog.resolve("MainWindow", "Quit", &[] as &[&str]), "Chiudi");
/// # Ok::<(), metaterm_l10n::loader::LoadError>(())
/// ```
pub fn from_str(src: &str) -> Result<Loaded, LoadError> {
    from_str_named(src, DEFAULT_NAME)
}

/// Parse catalogue markup, naming it `name` in diagnostics.
///
/// # Errors
///
/// Returns [`LoadError::Parse`] when the markup is malformed.
pub fn from_str_named(src: &str, name: &str) -> Result<Loaded, LoadError> {
    let bind = |failure: Failure| {
        ParseError::new(failure.kind, name, src, failure.offset, failure.len)
    };
    let root = scanner::parse_document(src).map_err(bind)?;
    let mut reader = TreeReader {
        src,
        catalog: Catalog::empty(),
        warnings: Vec::new(),
    };
    reader.read_root(&root).map_err(bind)?;
    Ok(Loaded {
        catalog: reader.catalog,
        warnings: reader.warnings,
    })
}

/// Decode and parse catalogue bytes.
///
/// # Errors
///
/// Returns [`LoadError::Encoding`] when the bytes are not UTF-8 or declare
/// another encoding, and [`LoadError::Parse`] when the markup is malformed.
pub fn from_bytes(bytes: &[u8], name: &str) -> Result<Loaded, LoadError> {
    let text = decode(bytes, name)?;
    from_str_named(text, name)
}

/// Read and parse the catalogue at `path`.
///
/// # Errors
///
/// Returns [`LoadError::Io`] when the file cannot be read, otherwise the
/// errors of [`from_bytes`].
pub fn from_path(path: impl AsRef<Utf8Path>) -> Result<Loaded, LoadError> {
    let path_ref = path.as_ref();
    let bytes = fs::read(path_ref).map_err(|source| LoadError::Io {
        path: path_ref.to_owned(),
        source,
    })?;
    let loaded = from_bytes(&bytes, path_ref.as_str())?;
    debug!(path = %path_ref, messages = loaded.catalog.len(), "loaded catalogue");
    Ok(loaded)
}

/// Decode catalogue bytes as UTF-8.
///
/// # Errors
///
/// Returns [`EncodingError`] for UTF-16 input, a non-UTF-8 encoding
/// declaration, or invalid UTF-8 sequences.
pub fn decode<'a>(bytes: &'a [u8], name: &str) -> Result<&'a str, EncodingError> {
    if bytes.starts_with(&[0xFF, 0xFE]) || bytes.starts_with(&[0xFE, 0xFF]) {
        return Err(EncodingError::Unsupported {
            name: name.to_owned(),
            encoding: String::from("UTF-16"),
        });
    }
    let (body, skipped) = bytes
        .strip_prefix(UTF8_BOM)
        .map_or((bytes, 0), |rest| (rest, UTF8_BOM.len()));

    let head_len = body.len().min(256);
    let head = String::from_utf8_lossy(body.get(..head_len).unwrap_or_default());
    let foreign = declared_encoding(&head)
        .filter(|encoding| !matches!(encoding.to_ascii_lowercase().as_str(), "utf-8" | "utf8"));
    if let Some(encoding) = foreign {
        return Err(EncodingError::Unsupported {
            name: name.to_owned(),
            encoding: encoding.to_owned(),
        });
    }

    std::str::from_utf8(body).map_err(|source| EncodingError::InvalidUtf8 {
        name: name.to_owned(),
        offset: source.valid_up_to() + skipped,
        source,
    })
}

/// Extract the `encoding` pseudo-attribute from an XML declaration.
fn declared_encoding(text: &str) -> Option<&str> {
    let after_open = text.strip_prefix("<?xml")?;
    let declaration = after_open.get(..after_open.find("?>")?)?;
    let key = declaration.find("encoding")?;
    let value = declaration
        .get(key + "encoding".len()..)?
        .trim_start()
        .strip_prefix('=')?
        .trim_start();
    let quote = value.chars().next().filter(|c| matches!(c, '"' | '\''))?;
    let body = value.get(1..)?;
    body.get(..body.find(quote)?)
}

struct TreeReader<'a> {
    src: &'a str,
    catalog: Catalog,
    warnings: Vec<LoadWarning>,
}

impl TreeReader<'_> {
    fn read_root(&mut self, root: &Element) -> Result<(), Failure> {
        if root.name != "TS" {
            return Err(Failure::new(
                ParseErrorKind::UnexpectedRoot {
                    found: root.name.clone(),
                },
                root.offset,
                root.tag_len,
            ));
        }
        self.catalog = Catalog::with_header(CatalogHeader {
            version: root.attribute("version").map(ToOwned::to_owned),
            language: root.attribute("language").map(ToOwned::to_owned),
            source_language: root.attribute("sourcelanguage").map(ToOwned::to_owned),
        });

        for node in &root.children {
            match node {
                Node::Text { raw, offset } => ensure_blank(raw, *offset, &root.name)?,
                Node::Element(child) if child.name == "context" => self.read_context(child)?,
                Node::Element(child) => {
                    debug!(element = %child.name, "skipping unsupported element in <TS>");
                }
            }
        }
        Ok(())
    }

    fn read_context(&mut self, element: &Element) -> Result<(), Failure> {
        let mut name = None;
        let mut comment = None;
        let mut messages = Vec::new();
        for node in &element.children {
            match node {
                Node::Text { raw, offset } => ensure_blank(raw, *offset, &element.name)?,
                Node::Element(child) => match child.name.as_str() {
                    "name" => name = Some(text_of(child)?),
                    "comment" => comment = Some(text_of(child)?),
                    "message" => messages.push(child),
                    other => debug!(element = other, "skipping unsupported element in <context>"),
                },
            }
        }
        let Some(raw_name) = name else {
            return Err(Failure::new(
                ParseErrorKind::MissingElement {
                    element: "context",
                    child: "name",
                },
                element.offset,
                element.tag_len,
            ));
        };
        let context_name = unescape(&raw_name).into_owned();
        if self.catalog.context(&context_name).is_some() {
            debug!(context = %context_name, "merging repeated context block");
        }
        let context = self.catalog.context_mut(&context_name);
        if let Some(text) = comment {
            context.set_comment(text);
        }

        for child in messages {
            let message = read_message(child)?;
            let source = unescape(message.source()).into_owned();
            let disambiguation = message
                .disambiguation()
                .map(|d| unescape(d).into_owned())
                .filter(|d| !d.is_empty());
            let Some(duplicate) = self.catalog.insert(&context_name, message) else {
                continue;
            };
            let (line, _) = line_column(self.src, child.offset);
            let obsolete_ignored = matches!(duplicate, Duplicate::Ignored(_));
            warn!(
                context = %context_name,
                source = %source,
                line,
                obsolete_ignored,
                "duplicate message"
            );
            self.warnings.push(LoadWarning::DuplicateMessage {
                context: context_name.clone(),
                source,
                disambiguation,
                line,
                obsolete_ignored,
            });
        }
        Ok(())
    }
}

fn read_message(element: &Element) -> Result<Message, Failure> {
    let numerus = element.attribute("numerus") == Some("yes");
    let mut source = None;
    let mut disambiguation = None;
    let mut translator_comment = None;
    let mut extra_comment = None;
    let mut translation = None;
    let mut locations = Vec::new();

    for node in &element.children {
        let child = match node {
            Node::Text { raw, offset } => {
                ensure_blank(raw, *offset, &element.name)?;
                continue;
            }
            Node::Element(child) => child,
        };
        match child.name.as_str() {
            "location" => locations.push(read_location(child)?),
            "source" => source = Some(text_of(child)?),
            "comment" => disambiguation = Some(text_of(child)?),
            "translatorcomment" => translator_comment = Some(text_of(child)?),
            "extracomment" => extra_comment = Some(text_of(child)?),
            "translation" => translation = Some(read_translation(child, numerus)?),
            other => debug!(element = other, "skipping unsupported element in <message>"),
        }
    }

    let Some(source) = source else {
        return Err(Failure::new(
            ParseErrorKind::MissingElement {
                element: "message",
                child: "source",
            },
            element.offset,
            element.tag_len,
        ));
    };
    let (text, status) = translation.unwrap_or_else(|| {
        let empty = if numerus {
            Translation::Numerus(Vec::new())
        } else {
            Translation::Single(String::new())
        };
        (empty, MessageStatus::Unfinished)
    });

    let mut message = Message::with_translation(source, text).with_status(status);
    if let Some(comment) = disambiguation {
        message = message.with_disambiguation(comment);
    }
    if let Some(comment) = translator_comment {
        message = message.with_translator_comment(comment);
    }
    if let Some(comment) = extra_comment {
        message = message.with_extra_comment(comment);
    }
    Ok(locations
        .into_iter()
        .fold(message, Message::with_location))
}

fn read_translation(element: &Element, numerus: bool) -> Result<(Translation, MessageStatus), Failure> {
    let kind = element.attribute("type");
    let status = MessageStatus::from_type_attribute(kind).ok_or_else(|| {
        Failure::new(
            ParseErrorKind::InvalidAttributeValue {
                element: "translation",
                attribute: "type",
                value: kind.unwrap_or_default().to_owned(),
            },
            element.offset,
            element.tag_len,
        )
    })?;
    if !numerus {
        return Ok((Translation::Single(text_of(element)?), status));
    }
    let mut forms = Vec::new();
    for node in &element.children {
        match node {
            Node::Text { raw, offset } => ensure_blank(raw, *offset, &element.name)?,
            Node::Element(child) if child.name == "numerusform" => forms.push(text_of(child)?),
            Node::Element(child) => {
                debug!(element = %child.name, "skipping unsupported element in <translation>");
            }
        }
    }
    Ok((Translation::Numerus(forms), status))
}

fn read_location(element: &Element) -> Result<Location, Failure> {
    let Some(line) = element.attribute("line") else {
        return Err(Failure::new(
            ParseErrorKind::MissingAttribute {
                element: "location",
                attribute: "line",
            },
            element.offset,
            element.tag_len,
        ));
    };
    Ok(Location {
        filename: element.attribute("filename").map(ToOwned::to_owned),
        line: line.to_owned(),
    })
}

/// Concatenate the text children of a text-only element.
fn text_of(element: &Element) -> Result<String, Failure> {
    let mut text = String::new();
    for node in &element.children {
        match node {
            Node::Text { raw, .. } => text.push_str(raw),
            Node::Element(child) => {
                return Err(Failure::new(
                    ParseErrorKind::UnexpectedElement {
                        parent: element.name.clone(),
                        found: child.name.clone(),
                    },
                    child.offset,
                    child.tag_len,
                ));
            }
        }
    }
    Ok(text)
}

fn ensure_blank(raw: &str, offset: usize, parent: &str) -> Result<(), Failure> {
    let trimmed = raw.trim_start();
    if trimmed.trim_end().is_empty() {
        return Ok(());
    }
    Err(Failure::new(
        ParseErrorKind::UnexpectedText {
            parent: parent.to_owned(),
        },
        offset + (raw.len() - trimmed.len()),
        1,
    ))
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "tests fail loudly on fixture errors")]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<?xml version=\"1.0\" encoding=\"utf-8\"?>", Some("utf-8"))]
    #[case("<?xml version='1.0' encoding = 'ISO-8859-1' ?>", Some("ISO-8859-1"))]
    #[case("<?xml version=\"1.0\"?><TS/>", None)]
    #[case("<TS/>", None)]
    fn declared_encoding_reads_declaration(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(declared_encoding(text), expected);
    }

    #[test]
    fn decode_strips_bom_and_reports_offsets() {
        let text = decode(b"\xEF\xBB\xBF<TS/>", "bom.ts").expect("BOM is accepted");
        assert_eq!(text, "<TS/>");

        let err = decode(b"\xEF\xBB\xBF<TS>\xFF</TS>", "bad.ts").expect_err("invalid UTF-8");
        assert!(matches!(err, EncodingError::InvalidUtf8 { offset: 7, .. }));
    }

    #[test]
    fn decode_rejects_other_encodings() {
        let latin = decode(b"<?xml version=\"1.0\" encoding=\"latin1\"?><TS/>", "x.ts");
        assert!(matches!(latin, Err(EncodingError::Unsupported { ref encoding, .. }) if encoding == "latin1"));
        let utf16 = decode(&[0xFF, 0xFE, b'<', 0], "y.ts");
        assert!(matches!(utf16, Err(EncodingError::Unsupported { .. })));
    }

    #[test]
    fn missing_translation_is_unfinished() {
        let loaded = from_str(
            "<TS><context><name>A</name><message><source>x</source></message></context></TS>",
        )
        .expect("parses");
        let context = loaded.catalog.context("A").expect("context A");
        let message = context.get("x", None).expect("message x");
        assert_eq!(message.status(), MessageStatus::Unfinished);
        assert!(message.translation().is_empty());
    }
}
