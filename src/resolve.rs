//! Lookup service.
//!
//! Resolution never fails. When no usable translation exists the caller's
//! source text is returned with its placeholders substituted, so the UI shows
//! the English string rather than a blank label.
//!
//! A message is usable when it is not obsolete, has translated text, and
//! (under the default policy) regardless of whether it is unfinished. An
//! exact `(context, source, disambiguation)` match is tried first; otherwise
//! the other entries sharing the source text are tried in file order.

use tracing::debug;

use crate::catalog::{Catalog, Message, MessageStatus};
use crate::format::{render_counted, render_markup, render_plain};
use crate::plural::PluralRule;

/// Which messages lookup may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupPolicy {
    /// Return unfinished translations. `lrelease` includes them by default.
    pub include_unfinished: bool,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self {
            include_unfinished: true,
        }
    }
}

impl LookupPolicy {
    /// Whether `message` may be shown to the user.
    #[must_use]
    pub fn accepts(self, message: &Message) -> bool {
        let status = message.status();
        !status.is_obsolete()
            && (self.include_unfinished || status != MessageStatus::Unfinished)
            && !message.translation().is_empty()
    }
}

impl Catalog {
    /// Find the message lookup would use, under the default policy.
    #[must_use]
    pub fn lookup(&self, context: &str, source: &str, disambiguation: Option<&str>) -> Option<&Message> {
        self.lookup_with(LookupPolicy::default(), context, source, disambiguation)
    }

    /// Find the message lookup would use under `policy`.
    ///
    /// `source` and `disambiguation` are plain text, as the application
    /// holds them.
    #[must_use]
    pub fn lookup_with(
        &self,
        policy: LookupPolicy,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
    ) -> Option<&Message> {
        let Some(entries) = self.context(context) else {
            debug!(context, source, "unknown context; using source text");
            return None;
        };
        if let Some(exact) = entries
            .get(source, disambiguation)
            .filter(|message| policy.accepts(message))
        {
            return Some(exact);
        }
        let found = entries.siblings(source).find(|message| policy.accepts(message));
        if found.is_none() {
            debug!(context, source, "no active translation; using source text");
        }
        found
    }

    /// Resolve `source` in `context`, substituting `{0}`, `{1}`, ... with
    /// `args`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metaterm_l10n::catalog::{Catalog, Message};
    ///
    /// let source = "Termbase {0} has been deleted.";
    /// let untranslated = Catalog::empty();
    /// assert_eq!(
    ///     untranslated.resolve("MainWindow", source, &["Sports"]),
    ///     "Termbase Sports has been deleted."
    /// );
    ///
    /// let mut italian = Catalog::for_language("it_IT");
    /// italian.insert("MainWindow", Message::new(source, "Il termbase {0} è stato eliminato."));
    /// assert_eq!(
    ///     italian.resolve("MainWindow", source, &["Sports"]),
    ///     "Il termbase Sports è stato eliminato."
    /// );
    /// ```
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, context: &str, source: &str, args: &[S]) -> String {
        self.resolve_with(LookupPolicy::default(), context, source, None, args)
    }

    /// Resolve a source string that carries a disambiguation comment.
    #[must_use]
    pub fn resolve_disambiguated<S: AsRef<str>>(
        &self,
        context: &str,
        source: &str,
        disambiguation: &str,
        args: &[S],
    ) -> String {
        self.resolve_with(
            LookupPolicy::default(),
            context,
            source,
            Some(disambiguation),
            args,
        )
    }

    /// Resolve under an explicit policy.
    #[must_use]
    pub fn resolve_with<S: AsRef<str>>(
        &self,
        policy: LookupPolicy,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        args: &[S],
    ) -> String {
        self.lookup_with(policy, context, source, disambiguation)
            .and_then(|message| message.translation().form(0))
            .map_or_else(
                || render_plain(source, args),
                |template| render_markup(template, args),
            )
    }

    /// Plural rule for the catalogue's language.
    #[must_use]
    pub fn plural_rule(&self) -> PluralRule {
        self.language()
            .map_or(PluralRule::OneOther, PluralRule::for_language)
    }

    /// Resolve a plural message, selecting the form for `count` and
    /// replacing `%n` with it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metaterm_l10n::catalog::{Catalog, Message};
    ///
    /// let source = "%n entries";
    /// let mut italian = Catalog::for_language("it_IT");
    /// italian.insert(
    ///     "TermbasePropertyDialog",
    ///     Message::numerus(source, vec!["%n scheda".into(), "%n schede".into()]),
    /// );
    /// let no_args: &[&str] = &[];
    /// assert_eq!(italian.resolve_plural("TermbasePropertyDialog", source, 1, no_args), "1 scheda");
    /// assert_eq!(italian.resolve_plural("TermbasePropertyDialog", source, 4, no_args), "4 schede");
    /// assert_eq!(Catalog::empty().resolve_plural("X", source, 4, no_args), "4 entries");
    /// ```
    #[must_use]
    pub fn resolve_plural<S: AsRef<str>>(
        &self,
        context: &str,
        source: &str,
        count: u64,
        args: &[S],
    ) -> String {
        self.resolve_plural_with(LookupPolicy::default(), context, source, None, count, args)
    }

    /// Resolve a plural message under an explicit policy.
    #[must_use]
    pub fn resolve_plural_with<S: AsRef<str>>(
        &self,
        policy: LookupPolicy,
        context: &str,
        source: &str,
        disambiguation: Option<&str>,
        count: u64,
        args: &[S],
    ) -> String {
        let index = self.plural_rule().form_index(count);
        self.lookup_with(policy, context, source, disambiguation)
            .and_then(|message| message.translation().form(index))
            .map_or_else(
                || render_counted(source, args, count, false),
                |template| render_counted(template, args, count, true),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Translation;

    const NO_ARGS: &[&str] = &[];

    fn catalog() -> Catalog {
        let mut catalog = Catalog::for_language("it_IT");
        catalog.insert("ExportWizard", Message::new("Tab-separated values", "Valori separati da tabulazione").with_status(MessageStatus::Obsolete));
        catalog.insert(
            "ExportWizard",
            Message::new("Tab-separated values", "Valori separati da tab").with_disambiguation("format"),
        );
        catalog.insert("ExportWizard", Message::new("Finish", "").with_status(MessageStatus::Unfinished));
        catalog.insert("ExportWizard", Message::new("Back", "Indietro").with_status(MessageStatus::Unfinished));
        catalog
    }

    #[test]
    fn obsolete_exact_match_falls_through_to_active_sibling() {
        assert_eq!(
            catalog().resolve("ExportWizard", "Tab-separated values", NO_ARGS),
            "Valori separati da tab"
        );
    }

    #[test]
    fn empty_translation_falls_back_to_source() {
        assert_eq!(catalog().resolve("ExportWizard", "Finish", NO_ARGS), "Finish");
    }

    #[test]
    fn policy_can_exclude_unfinished() {
        let strict = LookupPolicy {
            include_unfinished: false,
        };
        let catalog = catalog();
        assert_eq!(catalog.resolve("ExportWizard", "Back", NO_ARGS), "Indietro");
        assert_eq!(
            catalog.resolve_with(strict, "ExportWizard", "Back", None, NO_ARGS),
            "Back"
        );
    }

    #[test]
    fn plural_form_uses_catalogue_language() {
        let mut catalog = Catalog::for_language("ro_RO");
        catalog.insert(
            "TermbasePropertyDialog",
            Message::with_translation(
                "%n entries",
                Translation::Numerus(vec!["%n fișă".into(), "%n fișe".into(), "%n de fișe".into()]),
            ),
        );
        let resolve = |n| catalog.resolve_plural("TermbasePropertyDialog", "%n entries", n, NO_ARGS);
        assert_eq!(resolve(1), "1 fișă");
        assert_eq!(resolve(5), "5 fișe");
        assert_eq!(resolve(25), "25 de fișe");
    }

    #[test]
    fn unknown_context_returns_substituted_source() {
        assert_eq!(
            Catalog::empty().resolve("Nowhere", "{0} &amp; {1}", &["a", "b"]),
            "a &amp; b"
        );
    }
}
