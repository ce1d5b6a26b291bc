//! Plural form selection for numerus messages.
//!
//! Qt Linguist stores one `<numerusform>` per plural form of the target
//! language, in the order defined by the language's rule. The rules here
//! cover the languages MetaTerm ships with plus the common CLDR families.

/// Plural rule families, named after the forms they distinguish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluralRule {
    /// No plural distinction (Japanese, Chinese, Korean, ...).
    Single,
    /// `n == 1` is singular, everything else plural (English, Italian, ...).
    OneOther,
    /// `n <= 1` is singular (French, Brazilian Portuguese).
    ZeroOneOther,
    /// Singular, "few" (0, or 1 to 19 modulo 100) and "other" (Romanian).
    Romanian,
    /// Singular, "few" and "many" by the last digits (Russian, Ukrainian).
    Slavic,
}

impl PluralRule {
    /// Select the rule for a language subtag or full locale name.
    ///
    /// Accepts `it`, `it_IT` and `it-IT` alike. Unknown languages use
    /// [`PluralRule::OneOther`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metaterm_l10n::plural::PluralRule;
    ///
    /// assert_eq!(PluralRule::for_language("ro_RO"), PluralRule::Romanian);
    /// assert_eq!(PluralRule::for_language("pt-BR"), PluralRule::ZeroOneOther);
    /// assert_eq!(PluralRule::for_language("it"), PluralRule::OneOther);
    /// ```
    #[must_use]
    pub fn for_language(locale: &str) -> Self {
        let mut parts = locale.split(['_', '-']);
        let language = parts.next().unwrap_or_default().to_ascii_lowercase();
        let region = parts.next().map(str::to_ascii_uppercase);
        match (language.as_str(), region.as_deref()) {
            ("ja" | "zh" | "ko" | "th" | "vi" | "id", _) => Self::Single,
            ("fr", _) | ("pt", Some("BR")) => Self::ZeroOneOther,
            ("ro" | "mo", _) => Self::Romanian,
            ("ru" | "uk" | "be", _) => Self::Slavic,
            _ => Self::OneOther,
        }
    }

    /// Number of plural forms a complete translation provides.
    #[must_use]
    pub const fn form_count(self) -> usize {
        match self {
            Self::Single => 1,
            Self::OneOther | Self::ZeroOneOther => 2,
            Self::Romanian | Self::Slavic => 3,
        }
    }

    /// Index of the plural form used for `n`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use metaterm_l10n::plural::PluralRule;
    ///
    /// assert_eq!(PluralRule::OneOther.form_index(1), 0);
    /// assert_eq!(PluralRule::OneOther.form_index(0), 1);
    /// assert_eq!(PluralRule::Romanian.form_index(19), 1);
    /// assert_eq!(PluralRule::Romanian.form_index(20), 2);
    /// ```
    #[must_use]
    pub fn form_index(self, n: u64) -> usize {
        match self {
            Self::Single => 0,
            Self::OneOther => {
                if n == 1 {
                    0
                } else {
                    1
                }
            }
            Self::ZeroOneOther => {
                if n <= 1 {
                    0
                } else {
                    1
                }
            }
            Self::Romanian => {
                let rem100 = n.rem_euclid(100);
                if n == 1 {
                    0
                } else if n == 0 || (1..=19).contains(&rem100) {
                    1
                } else {
                    2
                }
            }
            Self::Slavic => {
                let rem10 = n.rem_euclid(10);
                let rem100 = n.rem_euclid(100);
                if rem10 == 1 && rem100 != 11 {
                    0
                } else if (2..=4).contains(&rem10) && !(12..=14).contains(&rem100) {
                    1
                } else {
                    2
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PluralRule::Slavic, 1, 0)]
    #[case(PluralRule::Slavic, 11, 2)]
    #[case(PluralRule::Slavic, 22, 1)]
    #[case(PluralRule::Slavic, 112, 2)]
    #[case(PluralRule::ZeroOneOther, 0, 0)]
    #[case(PluralRule::ZeroOneOther, 2, 1)]
    #[case(PluralRule::Romanian, 0, 1)]
    #[case(PluralRule::Romanian, 101, 1)]
    #[case(PluralRule::Romanian, 120, 2)]
    #[case(PluralRule::Single, 5, 0)]
    fn form_index_follows_rule(#[case] rule: PluralRule, #[case] n: u64, #[case] index: usize) {
        assert_eq!(rule.form_index(n), index);
    }

    #[rstest]
    #[case("el_GR", PluralRule::OneOther)]
    #[case("es", PluralRule::OneOther)]
    #[case("pt_PT", PluralRule::OneOther)]
    #[case("zh_CN", PluralRule::Single)]
    #[case("", PluralRule::OneOther)]
    fn for_language_maps_metaterm_languages(#[case] locale: &str, #[case] rule: PluralRule) {
        assert_eq!(PluralRule::for_language(locale), rule);
    }

    #[test]
    fn form_index_stays_below_form_count() {
        for rule in [
            PluralRule::Single,
            PluralRule::OneOther,
            PluralRule::ZeroOneOther,
            PluralRule::Romanian,
            PluralRule::Slavic,
        ] {
            assert!((0..250).all(|n| rule.form_index(n) < rule.form_count()));
        }
    }
}
