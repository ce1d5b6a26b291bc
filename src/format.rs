//! Positional placeholder substitution.
//!
//! Templates reference arguments as `{0}`, `{1}`, and so on. Plural
//! templates may also use `%n` for the count. Substitution splits the
//! template into [`Segment`]s so entity decoding can be applied to template
//! text alone: argument text is inserted verbatim and never decoded.

use std::collections::BTreeSet;

use crate::markup::unescape;

/// One piece of a substituted template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Template text, still in markup form.
    Template(&'a str),
    /// Caller-supplied argument text.
    Argument(&'a str),
}

/// Parse a `{N}` placeholder body. `rest` starts just after the `{`.
///
/// Returns the argument index and the bytes consumed, including the `}`.
fn parse_index(rest: &str) -> Option<(usize, usize)> {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || !rest.get(digits..)?.starts_with('}') {
        return None;
    }
    let index = rest.get(..digits)?.parse::<usize>().ok()?;
    Some((index, digits + 1))
}

/// Split `template` into literal and argument segments.
///
/// Placeholders whose index has no matching argument stay in the template
/// text. `%n` is only recognised when `count` is supplied.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::format::{Segment, segments};
///
/// let parts = segments("Termbase {0} has been deleted.", &["Sports"], None);
/// assert_eq!(
///     parts,
///     vec![
///         Segment::Template("Termbase "),
///         Segment::Argument("Sports"),
///         Segment::Template(" has been deleted."),
///     ]
/// );
/// ```
#[must_use]
pub fn segments<'a, S: AsRef<str>>(
    template: &'a str,
    args: &'a [S],
    count: Option<&'a str>,
) -> Vec<Segment<'a>> {
    let mut parts = Vec::new();
    let mut literal_start = 0usize;
    let mut cursor = 0usize;
    let is_marker = |c: char| c == '{' || (count.is_some() && c == '%');

    while let Some(found) = template.get(cursor..).and_then(|rest| rest.find(is_marker)) {
        let at = cursor + found;
        let after = template.get(at + 1..).unwrap_or_default();
        let marker = template.get(at..).and_then(|t| t.chars().next());
        let replacement = match marker {
            Some('%') if after.starts_with('n') => count.map(|c| (c, 2)),
            Some('{') => parse_index(after).and_then(|(index, consumed)| {
                args.get(index).map(|arg| (arg.as_ref(), consumed + 1))
            }),
            _ => None,
        };

        if let Some((text, consumed)) = replacement {
            if let Some(literal) = template.get(literal_start..at).filter(|l| !l.is_empty()) {
                parts.push(Segment::Template(literal));
            }
            parts.push(Segment::Argument(text));
            cursor = at + consumed;
            literal_start = cursor;
        } else {
            cursor = at + 1;
        }
    }

    if let Some(literal) = template.get(literal_start..).filter(|l| !l.is_empty()) {
        parts.push(Segment::Template(literal));
    }
    parts
}

fn render(parts: &[Segment<'_>], decode: bool) -> String {
    parts.iter().fold(String::new(), |mut out, part| {
        match part {
            Segment::Template(text) if decode => out.push_str(&unescape(text)),
            Segment::Template(text) | Segment::Argument(text) => out.push_str(text),
        }
        out
    })
}

/// Substitute arguments into a markup template and decode its entities.
///
/// Decoding runs after substitution and only touches template text, so an
/// argument such as `&lt;` is displayed exactly as supplied.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::format::render_markup;
///
/// let text = render_markup("&lt;small&gt;ID scheda: {0}&lt;/small&gt;", &["&lt;42&gt;"]);
/// assert_eq!(text, "<small>ID scheda: &lt;42&gt;</small>");
/// ```
#[must_use]
pub fn render_markup<S: AsRef<str>>(template: &str, args: &[S]) -> String {
    render(&segments(template, args, None), true)
}

/// Substitute arguments into plain text without decoding entities.
#[must_use]
pub fn render_plain<S: AsRef<str>>(template: &str, args: &[S]) -> String {
    render(&segments(template, args, None), false)
}

/// Substitute arguments and the `%n` count into a markup template.
#[must_use]
pub fn render_counted<S: AsRef<str>>(
    template: &str,
    args: &[S],
    count: u64,
    decode: bool,
) -> String {
    let count_text = count.to_string();
    render(&segments(template, args, Some(&count_text)), decode)
}

/// Collect the placeholder indices referenced by `template`.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::format::placeholder_indices;
///
/// let found: Vec<usize> = placeholder_indices("{1} of {0}, then {1}").into_iter().collect();
/// assert_eq!(found, vec![0, 1]);
/// ```
#[must_use]
pub fn placeholder_indices(template: &str) -> BTreeSet<usize> {
    let mut found = BTreeSet::new();
    let mut rest = template;
    while let Some(at) = rest.find('{') {
        let after = rest.get(at + 1..).unwrap_or_default();
        if let Some((index, consumed)) = parse_index(after) {
            found.insert(index);
            rest = after.get(consumed..).unwrap_or_default();
        } else {
            rest = after;
        }
    }
    found
}
