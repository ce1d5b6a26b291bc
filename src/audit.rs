//! Consistency checks for translated catalogues.
//!
//! Compares the `{N}` placeholders of each source string with those of its
//! translation. A translation that drops a placeholder hides a value from
//! the user; one that invents a placeholder shows a literal `{N}`.

use std::collections::BTreeSet;
use std::fmt;

use crate::catalog::{Catalog, Message, Translation};
use crate::format::placeholder_indices;
use crate::markup::unescape;

/// A translation whose placeholders differ from its source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderMismatch {
    /// Context name.
    pub context: String,
    /// Decoded source text.
    pub source: String,
    /// Indices used by the source but absent from the translation.
    pub missing: Vec<usize>,
    /// Indices used by the translation but absent from the source.
    pub unexpected: Vec<usize>,
}

impl fmt::Display for PlaceholderMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "placeholder mismatch for {:?} in context {}",
            self.source, self.context
        )?;
        if !self.missing.is_empty() {
            write!(f, "; missing {}", braces(&self.missing))?;
        }
        if !self.unexpected.is_empty() {
            write!(f, "; unexpected {}", braces(&self.unexpected))?;
        }
        Ok(())
    }
}

fn braces(indices: &[usize]) -> String {
    indices
        .iter()
        .map(|index| format!("{{{index}}}"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn translated_forms(message: &Message) -> Vec<&str> {
    match message.translation() {
        Translation::Single(text) => vec![text.as_str()],
        Translation::Numerus(forms) => forms.iter().map(String::as_str).collect(),
    }
}

/// Report every live translation whose placeholders differ from its source.
///
/// Obsolete entries and empty translations are ignored because lookup never
/// returns them.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::audit::placeholder_mismatches;
/// use metaterm_l10n::catalog::{Catalog, Message};
///
/// let mut catalog = Catalog::for_language("it_IT");
/// catalog.insert("MainWindow", Message::new("Termbase {0} has been deleted.", "Termbase eliminato."));
/// let found = placeholder_mismatches(&catalog);
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].missing, vec![0]);
/// ```
#[must_use]
pub fn placeholder_mismatches(catalog: &Catalog) -> Vec<PlaceholderMismatch> {
    let mut found = Vec::new();
    for context in catalog.contexts() {
        for message in context.messages() {
            if message.status().is_obsolete() || message.translation().is_empty() {
                continue;
            }
            let declared = placeholder_indices(message.source());
            let mut missing = BTreeSet::new();
            let mut unexpected = BTreeSet::new();
            for form in translated_forms(message).into_iter().filter(|f| !f.is_empty()) {
                let used = placeholder_indices(form);
                missing.extend(declared.difference(&used).copied());
                unexpected.extend(used.difference(&declared).copied());
            }
            if missing.is_empty() && unexpected.is_empty() {
                continue;
            }
            found.push(PlaceholderMismatch {
                context: context.name().to_owned(),
                source: unescape(message.source()).into_owned(),
                missing: missing.into_iter().collect(),
                unexpected: unexpected.into_iter().collect(),
            });
        }
    }
    found
}
