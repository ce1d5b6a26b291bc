//! Error types raised while loading a catalogue.
//!
//! Parse failures carry the catalogue text and a span so miette can point at
//! the offending markup.

// miette/thiserror derive expansion trips `unused_assignments` on some
// toolchains; `#[expect]` cannot be used because the lint is not stable
// across versions.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// What went wrong while parsing catalogue markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// The input contains no root element.
    #[error("document has no root element")]
    MissingRoot,
    /// The root element is not `<TS>`.
    #[error("expected root element <TS> but found <{found}>")]
    UnexpectedRoot {
        /// Name of the root element found.
        found: String,
    },
    /// An element was opened and never closed.
    #[error("unclosed <{name}> element")]
    UnclosedElement {
        /// Name of the unclosed element.
        name: String,
    },
    /// An end tag does not match the open element.
    #[error("expected </{expected}> but found </{found}>")]
    MismatchedEndTag {
        /// Element that is open.
        expected: String,
        /// End tag that was found.
        found: String,
    },
    /// A comment, CDATA section or similar construct never ends.
    #[error("unterminated {construct}")]
    Unterminated {
        /// Human-readable name of the construct.
        construct: &'static str,
    },
    /// A start or end tag is syntactically invalid.
    #[error("malformed tag: {detail}")]
    MalformedTag {
        /// What the scanner expected.
        detail: &'static str,
    },
    /// The same attribute appears twice on one element.
    #[error("duplicate attribute `{attribute}` on <{element}>")]
    DuplicateAttribute {
        /// Element carrying the attribute.
        element: String,
        /// Repeated attribute name.
        attribute: String,
    },
    /// A required attribute is absent.
    #[error("<{element}> is missing the required `{attribute}` attribute")]
    MissingAttribute {
        /// Element lacking the attribute.
        element: &'static str,
        /// Attribute name.
        attribute: &'static str,
    },
    /// An attribute has a value outside its allowed set.
    #[error("invalid value `{value}` for `{attribute}` on <{element}>")]
    InvalidAttributeValue {
        /// Element carrying the attribute.
        element: &'static str,
        /// Attribute name.
        attribute: &'static str,
        /// Rejected value.
        value: String,
    },
    /// A required child element is absent.
    #[error("<{element}> is missing the required <{child}> element")]
    MissingElement {
        /// Parent element.
        element: &'static str,
        /// Missing child.
        child: &'static str,
    },
    /// An element appears where only text is allowed.
    #[error("unexpected <{found}> inside <{parent}>")]
    UnexpectedElement {
        /// Enclosing element.
        parent: String,
        /// Element that was found.
        found: String,
    },
    /// Non-whitespace text appears where only elements are allowed.
    #[error("unexpected text inside <{parent}>")]
    UnexpectedText {
        /// Enclosing element, or `document` at the top level.
        parent: String,
    },
    /// An `&` does not start a known entity or character reference.
    #[error("malformed entity reference")]
    InvalidEntity,
    /// Markup continues after the root element closed.
    #[error("content after the root element")]
    TrailingContent,
    /// Elements are nested deeper than the loader accepts.
    #[error("elements nested deeper than {limit} levels")]
    TooDeep {
        /// Maximum accepted depth.
        limit: usize,
    },
}

impl ParseErrorKind {
    fn hint(&self) -> Option<String> {
        match self {
            Self::UnclosedElement { name } => Some(format!("add the matching </{name}> end tag")),
            Self::MismatchedEndTag { expected, .. } => Some(format!(
                "close every element opened inside <{expected}> before </{expected}>"
            )),
            Self::InvalidEntity => Some(String::from(
                "write a literal `&` as `&amp;`; only &lt; &gt; &amp; &apos; &quot; and numeric references are allowed",
            )),
            Self::InvalidAttributeValue { .. } => Some(String::from(
                "translation types are `unfinished`, `obsolete` and `vanished`",
            )),
            Self::MissingElement { child, .. } => Some(format!("add a <{child}> element")),
            _ => None,
        }
    }
}

/// One-based line and column (in characters) of byte `offset` in `src`.
pub(crate) fn line_column(src: &str, offset: usize) -> (usize, usize) {
    let clamped = offset.min(src.len());
    let before = src.get(..clamped).unwrap_or(src);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |at| at + 1);
    let column = before.get(line_start..).map_or(0, |text| text.chars().count()) + 1;
    (line, column)
}

/// Malformed catalogue markup.
#[derive(Debug, Error, Diagnostic)]
#[error("{kind} at line {line}, column {column}")]
#[diagnostic(code(metaterm_l10n::catalog::parse))]
pub struct ParseError {
    kind: ParseErrorKind,
    line: usize,
    column: usize,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
}

impl ParseError {
    /// Build a parse error for `src` (displayed as `name`) at byte `offset`.
    #[must_use]
    pub fn new(kind: ParseErrorKind, name: &str, src: &str, offset: usize, len: usize) -> Self {
        let start = offset.min(src.len());
        let length = len.min(src.len() - start);
        let (line, column) = line_column(src, start);
        let help = kind.hint();
        Self {
            kind,
            line,
            column,
            src: NamedSource::new(name, src.to_owned()),
            span: SourceSpan::new(start.into(), length),
            help,
        }
    }

    /// The specific failure.
    #[must_use]
    pub const fn kind(&self) -> &ParseErrorKind {
        &self.kind
    }

    /// One-based line of the failure.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }

    /// One-based column (in characters) of the failure.
    #[must_use]
    pub const fn column(&self) -> usize {
        self.column
    }
}

/// Catalogue bytes could not be decoded as text.
#[derive(Debug, Error, Diagnostic)]
pub enum EncodingError {
    /// The bytes are not valid UTF-8.
    #[error("{name} is not valid UTF-8 (invalid byte sequence at offset {offset})")]
    #[diagnostic(
        code(metaterm_l10n::catalog::encoding),
        help("save the catalogue as UTF-8, as Qt Linguist does")
    )]
    InvalidUtf8 {
        /// Display name of the catalogue.
        name: String,
        /// Byte offset of the first invalid sequence.
        offset: usize,
        /// Underlying decoding error.
        #[source]
        source: std::str::Utf8Error,
    },
    /// The catalogue uses or declares an encoding other than UTF-8.
    #[error("{name} uses unsupported encoding `{encoding}`")]
    #[diagnostic(
        code(metaterm_l10n::catalog::encoding),
        help("convert the catalogue to UTF-8")
    )]
    Unsupported {
        /// Display name of the catalogue.
        name: String,
        /// Declared or detected encoding.
        encoding: String,
    },
}

/// Any failure to produce a catalogue.
#[derive(Debug, Error, Diagnostic)]
pub enum LoadError {
    /// The catalogue file could not be read.
    #[error("failed to read catalogue {path}")]
    #[diagnostic(code(metaterm_l10n::catalog::io))]
    Io {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not UTF-8 text.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Encoding(#[from] EncodingError),
    /// The markup is malformed.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(Box<ParseError>),
}

impl From<ParseError> for LoadError {
    fn from(err: ParseError) -> Self {
        Self::Parse(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("abc", 0, (1, 1))]
    #[case("abc\ndef", 5, (2, 2))]
    #[case("àè\nx", 4, (1, 3))]
    #[case("abc", 99, (1, 4))]
    fn line_column_counts_characters(
        #[case] src: &str,
        #[case] offset: usize,
        #[case] expected: (usize, usize),
    ) {
        assert_eq!(line_column(src, offset), expected);
    }

    #[test]
    fn parse_error_reports_position_and_hint() {
        let src = "<TS>\n  <context>\n</TS>";
        let err = ParseError::new(
            ParseErrorKind::MismatchedEndTag {
                expected: "context".into(),
                found: "TS".into(),
            },
            "it_IT.ts",
            src,
            17,
            5,
        );
        assert_eq!(err.line(), 3);
        assert_eq!(err.column(), 1);
        assert!(err.to_string().contains("expected </context> but found </TS>"));
        assert!(err.help().is_some());
    }
}
