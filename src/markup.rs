//! Markup entity handling for catalogue text.
//!
//! Catalogue text is kept in its escaped form (`&lt;strong&gt;`) from load
//! until a string is about to be displayed. These helpers decode and encode
//! the five predefined entities plus decimal and hexadecimal character
//! references.

use std::borrow::Cow;

/// Decode the entity reference at the start of `rest`.
///
/// `rest` must begin immediately after the `&`. Returns the decoded character
/// and the number of bytes consumed, including the terminating `;`.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::markup::decode_entity;
///
/// assert_eq!(decode_entity("lt;b"), Some(('<', 3)));
/// assert_eq!(decode_entity("#x41;"), Some(('A', 5)));
/// assert_eq!(decode_entity("nbsp;"), None);
/// ```
#[must_use]
pub fn decode_entity(rest: &str) -> Option<(char, usize)> {
    let end = rest.find(';')?;
    let name = rest.get(..end)?;
    let decoded = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "apos" => '\'',
        "quot" => '"',
        _ => decode_char_reference(name)?,
    };
    Some((decoded, end + 1))
}

/// Decode `#NNN` or `#xHHH`. Signs and NUL are not valid references.
fn decode_char_reference(name: &str) -> Option<char> {
    let body = name.strip_prefix('#')?;
    let (digits, radix) = body
        .strip_prefix(['x', 'X'])
        .map_or((body, 10), |hex| (hex, 16));
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix)
        .ok()
        .filter(|&code| code != 0)
        .and_then(char::from_u32)
}

/// Decode entity references in `text`.
///
/// Unknown or malformed references are kept literally, so decoding never
/// fails. Text without an `&` is returned borrowed.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::markup::unescape;
///
/// assert_eq!(unescape("&lt;strong&gt;Term&lt;/strong&gt;"), "<strong>Term</strong>");
/// assert_eq!(unescape("L&apos;operazione"), "L'operazione");
/// assert_eq!(unescape("AT&T"), "AT&T");
/// ```
#[must_use]
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        out.push_str(rest.get(..at).unwrap_or_default());
        let after = rest.get(at + 1..).unwrap_or_default();
        if let Some((ch, consumed)) = decode_entity(after) {
            out.push(ch);
            rest = after.get(consumed..).unwrap_or_default();
        } else {
            out.push('&');
            rest = after;
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn escape_with(text: &str, quote: bool) -> Cow<'_, str> {
    let needs_escape = |c: char| matches!(c, '&' | '<' | '>') || (quote && c == '"');
    if !text.contains(needs_escape) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quote => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

/// Escape plain text so it can be stored as element content.
#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape_with(text, false)
}

/// Escape plain text for use inside a double-quoted attribute value.
#[must_use]
pub fn escape_attribute(text: &str) -> Cow<'_, str> {
    escape_with(text, true)
}

/// Return the byte offset of the first malformed entity reference in `text`.
///
/// Loaders use this to reject markup that a conforming reader would refuse.
pub(crate) fn first_invalid_entity(text: &str) -> Option<usize> {
    let mut offset = 0usize;
    let mut rest = text;
    while let Some(at) = rest.find('&') {
        let after = rest.get(at + 1..).unwrap_or_default();
        let Some((_, consumed)) = decode_entity(after) else {
            return Some(offset + at);
        };
        offset += at + 1 + consumed;
        rest = after.get(consumed..).unwrap_or_default();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("&amp;gt;", "&gt;")]
    #[case("&#233;", "é")]
    #[case("&#xE8;", "è")]
    #[case("a & b", "a & b")]
    #[case("&lt;unterminated", "<unterminated")]
    #[case("&lt", "&lt")]
    #[case("&#+65;", "&#+65;")]
    #[case("&#x00;", "&#x00;")]
    fn unescape_decodes_once(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(unescape(raw), expected);
    }

    #[test]
    fn escape_text_leaves_quotes_alone() {
        assert_eq!(escape_text("\"<b>\" & co"), "\"&lt;b&gt;\" &amp; co");
        assert_eq!(escape_attribute("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn escape_then_unescape_is_identity() {
        let plain = "<h1>Welcome to MetaTerm!</h1> Termbase > New...";
        assert_eq!(unescape(&escape_text(plain)), plain);
    }

    #[rstest]
    #[case("plain text", None)]
    #[case("&lt;b&gt; &amp; &#65;", None)]
    #[case("bad &nbsp; entity", Some(4))]
    #[case("&lt;ok&gt; then &", Some(16))]
    #[case("&#+65;", Some(0))]
    #[case("A &#x+42;", Some(2))]
    #[case("&#0;", Some(0))]
    #[case("&#x;", Some(0))]
    #[case("&#-1;", Some(0))]
    #[case("&#x1F600;", None)]
    fn first_invalid_entity_reports_offset(#[case] text: &str, #[case] expected: Option<usize>) {
        assert_eq!(first_invalid_entity(text), expected);
    }
}
