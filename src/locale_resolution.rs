//! Locale resolution helpers.
//!
//! These helpers centralize locale precedence rules and normalization so the
//! CLI, the configuration layer and the locale session agree on which
//! catalogue to load.

use std::str::FromStr;

use unic_langid::LanguageIdentifier;

/// Environment variable name used to override the locale.
pub const METATERM_LOCALE_ENV: &str = "METATERM_LOCALE";

/// Read-only environment access used for locale resolution.
pub trait EnvProvider {
    /// Fetch the environment variable value for `key`.
    fn var(&self, key: &str) -> Option<String>;
}

/// Environment provider backed by the process environment.
#[derive(Debug, Default, Copy, Clone)]
pub struct SystemEnv;

impl EnvProvider for SystemEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// System locale provider for the current host.
pub trait SystemLocale {
    /// Return the system locale string when available.
    fn system_locale(&self) -> Option<String>;
}

/// System locale provider backed by `sys-locale`.
#[derive(Debug, Default, Copy, Clone)]
pub struct SysLocale;

impl SystemLocale for SysLocale {
    fn system_locale(&self) -> Option<String> {
        sys_locale::get_locale()
    }
}

/// Normalize a raw locale string into a valid BCP 47 language tag.
///
/// This strips encoding suffixes (for example `.UTF-8`), removes variant
/// sections (for example `@latin`), replaces underscores with hyphens, and
/// validates the result using `LanguageIdentifier`.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::locale_resolution::normalize_locale_tag;
///
/// assert_eq!(normalize_locale_tag("it_IT.UTF-8"), Some("it-IT".to_string()));
/// assert_eq!(normalize_locale_tag("pt-BR"), Some("pt-BR".to_string()));
/// assert_eq!(normalize_locale_tag("C"), None);
/// ```
#[must_use]
pub fn normalize_locale_tag(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = trimmed.split(['.', '@']).next().unwrap_or_default().trim();
    if stripped.is_empty() {
        return None;
    }
    let candidate = stripped.replace('_', "-");
    LanguageIdentifier::from_str(&candidate)
        .ok()
        .map(|lang| lang.to_string())
}

/// Convert a normalized tag into the Qt file-name form (`it-IT` to `it_IT`).
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::locale_resolution::qt_locale_name;
///
/// assert_eq!(qt_locale_name("it-IT"), "it_IT");
/// assert_eq!(qt_locale_name("ja"), "ja");
/// ```
#[must_use]
pub fn qt_locale_name(tag: &str) -> String {
    tag.replace('-', "_")
}

/// Primary language subtag of a normalized tag (`it-IT` to `it`).
#[must_use]
pub fn primary_language(tag: &str) -> &str {
    tag.split(['-', '_']).next().unwrap_or(tag)
}

fn select_locale<'a>(candidates: impl IntoIterator<Item = Option<&'a str>>) -> Option<String> {
    for raw in candidates.into_iter().flatten() {
        if let Some(normalized) = normalize_locale_tag(raw) {
            return Some(normalized);
        }
    }
    None
}

/// Resolve the locale whose catalogue should be loaded.
///
/// Precedence is the explicit value (from `--locale` or the configuration
/// file), then `METATERM_LOCALE`, and finally the system default. Invalid
/// candidates are skipped. When no valid locale is found, `None` is returned
/// so callers fall back to the source language.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::locale_resolution::{resolve_locale, EnvProvider, SystemLocale};
///
/// struct StubEnv(Option<String>);
/// impl EnvProvider for StubEnv {
///     fn var(&self, key: &str) -> Option<String> {
///         (key == "METATERM_LOCALE").then(|| self.0.clone()).flatten()
///     }
/// }
///
/// struct StubSystem(Option<String>);
/// impl SystemLocale for StubSystem {
///     fn system_locale(&self) -> Option<String> {
///         self.0.clone()
///     }
/// }
///
/// let locale = resolve_locale(
///     None,
///     &StubEnv(Some("it_IT.UTF-8".into())),
///     &StubSystem(Some("en_US".into())),
/// );
/// assert_eq!(locale.as_deref(), Some("it-IT"));
/// ```
#[must_use]
pub fn resolve_locale(
    explicit: Option<&str>,
    env: &impl EnvProvider,
    system: &impl SystemLocale,
) -> Option<String> {
    let env_locale = env.var(METATERM_LOCALE_ENV);
    let system_locale = system.system_locale();
    select_locale([explicit, env_locale.as_deref(), system_locale.as_deref()])
}
