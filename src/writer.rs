//! Catalogue serialisation in the layout `lupdate` produces.
//!
//! Message text is stored in markup form and written back unchanged, so a
//! load followed by a write preserves every entity the translator typed.
//! Context names and attribute values are stored decoded and are escaped on
//! the way out.

use std::io;

use crate::catalog::{Catalog, Context, Location, Message, Translation};
use crate::markup::{escape_attribute, escape_text};

const INDENT: &str = "    ";

struct Out {
    text: String,
}

impl Out {
    fn line(&mut self, depth: usize, parts: &[&str]) {
        for _ in 0..depth {
            self.text.push_str(INDENT);
        }
        for part in parts {
            self.text.push_str(part);
        }
        self.text.push('\n');
    }

    fn element(&mut self, depth: usize, name: &str, body: &str) {
        self.line(depth, &["<", name, ">", body, "</", name, ">"]);
    }
}

fn attribute(name: &str, value: Option<&str>) -> String {
    value.map_or_else(String::new, |v| {
        format!(" {name}=\"{}\"", escape_attribute(v))
    })
}

/// Render `catalog` as `.ts` markup.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::catalog::{Catalog, Message};
/// use metaterm_l10n::writer::to_ts_string;
///
/// let mut catalog = Catalog::for_language("it_IT");
/// catalog.insert("MainWindow", Message::new("Quit", "Chiudi"));
/// let text = to_ts_string(&catalog);
/// assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n"));
/// assert!(text.contains("        <translation>Chiudi</translation>\n"));
/// ```
#[must_use]
pub fn to_ts_string(catalog: &Catalog) -> String {
    let mut out = Out {
        text: String::new(),
    };
    out.line(0, &["<?xml version=\"1.0\" encoding=\"utf-8\"?>"]);
    out.line(0, &["<!DOCTYPE TS>"]);
    let header = catalog.header();
    let root = format!(
        "<TS{}{}{}>",
        attribute("version", header.version.as_deref()),
        attribute("language", header.language.as_deref()),
        attribute("sourcelanguage", header.source_language.as_deref()),
    );
    out.line(0, &[&root]);
    for context in catalog.contexts() {
        write_context(&mut out, context);
    }
    out.line(0, &["</TS>"]);
    out.text
}

/// Write `catalog` as `.ts` markup to `writer`.
///
/// # Errors
///
/// Returns any error raised by `writer`.
pub fn write_ts<W: io::Write>(catalog: &Catalog, writer: &mut W) -> io::Result<()> {
    writer.write_all(to_ts_string(catalog).as_bytes())?;
    writer.flush()
}

fn write_context(out: &mut Out, context: &Context) {
    out.line(0, &["<context>"]);
    out.element(1, "name", &escape_text(context.name()));
    if let Some(comment) = context.comment() {
        out.element(1, "comment", comment);
    }
    for message in context.messages() {
        write_message(out, message);
    }
    out.line(0, &["</context>"]);
}

fn write_message(out: &mut Out, message: &Message) {
    if message.is_numerus() {
        out.line(1, &["<message numerus=\"yes\">"]);
    } else {
        out.line(1, &["<message>"]);
    }
    for location in message.locations() {
        write_location(out, location);
    }
    out.element(2, "source", message.source());
    if let Some(comment) = message.disambiguation() {
        out.element(2, "comment", comment);
    }
    if let Some(comment) = message.extra_comment() {
        out.element(2, "extracomment", comment);
    }
    if let Some(comment) = message.translator_comment() {
        out.element(2, "translatorcomment", comment);
    }
    let open = format!(
        "<translation{}>",
        attribute("type", message.status().type_attribute())
    );
    match message.translation() {
        Translation::Single(text) => out.line(2, &[&open, text, "</translation>"]),
        Translation::Numerus(forms) => {
            out.line(2, &[&open]);
            for form in forms {
                out.element(3, "numerusform", form);
            }
            out.line(2, &["</translation>"]);
        }
    }
    out.line(1, &["</message>"]);
}

fn write_location(out: &mut Out, location: &Location) {
    let tag = format!(
        "<location{}{}/>",
        attribute("filename", location.filename.as_deref()),
        attribute("line", Some(&location.line)),
    );
    out.line(2, &[&tag]);
}
