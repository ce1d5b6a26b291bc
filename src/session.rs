//! Locale session: choosing, loading and publishing the active catalogue.
//!
//! A session owns the configuration and catalogue store and publishes
//! catalogues through an [`ActiveCatalog`] handle that the rest of the
//! application clones. Switching locale loads the new catalogue first and
//! only then swaps it in, so a failed switch under the `abort` policy leaves
//! the previous catalogue in place.

// miette/thiserror derive expansion trips `unused_assignments` on some
// toolchains; `#[expect]` cannot be used because the lint is not stable
// across versions.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::active::ActiveCatalog;
use crate::catalog::Catalog;
use crate::config::{L10nConfig, LoadFailurePolicy};
use crate::loader::{LoadError, LoadWarning};
use crate::locale_resolution::{
    EnvProvider, SystemLocale, normalize_locale_tag, primary_language, resolve_locale,
};
use crate::store::CatalogStore;

/// Errors surfaced by a locale session.
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    /// The catalogue for the locale failed to load under the `abort` policy.
    #[error("failed to load the catalogue for locale {locale}")]
    #[diagnostic(
        code(metaterm_l10n::session::load),
        help("fix the catalogue, or set `on-load-error` to `fallback` to start with source text")
    )]
    Load {
        /// Locale being loaded.
        locale: String,
        /// Underlying load failure.
        #[source]
        #[diagnostic_source]
        source: LoadError,
    },
    /// The requested locale is not a valid language tag.
    #[error("`{raw}` is not a valid locale tag")]
    #[diagnostic(
        code(metaterm_l10n::session::invalid_locale),
        help("use a tag such as `it-IT` or `it_IT`")
    )]
    InvalidLocale {
        /// Rejected input.
        raw: String,
    },
}

/// Tracks the selected locale and publishes its catalogue.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::config::L10nConfig;
/// use metaterm_l10n::locale_resolution::{EnvProvider, SystemLocale};
/// use metaterm_l10n::session::LocaleSession;
///
/// struct NoEnv;
/// impl EnvProvider for NoEnv {
///     fn var(&self, _key: &str) -> Option<String> {
///         None
///     }
/// }
///
/// struct Italian;
/// impl SystemLocale for Italian {
///     fn system_locale(&self) -> Option<String> {
///         Some("it_IT.UTF-8".into())
///     }
/// }
///
/// let mut session = LocaleSession::start(L10nConfig::default(), &NoEnv, &Italian)?;
/// let ui = session.active().clone();
/// assert_eq!(ui.resolve("MainWindow", "Quit", &[] as &[&str]), "Chiudi");
///
/// session.switch_locale("en-US")?;
/// assert_eq!(ui.resolve("MainWindow", "Quit", &[] as &[&str]), "Quit");
/// # Ok::<(), metaterm_l10n::session::SessionError>(())
/// ```
#[derive(Debug)]
pub struct LocaleSession {
    config: L10nConfig,
    store: CatalogStore,
    active: ActiveCatalog,
    locale: Option<String>,
    warnings: Vec<LoadWarning>,
}

impl LocaleSession {
    /// Resolve the locale, load its catalogue and publish it.
    ///
    /// The locale comes from the configuration, then `METATERM_LOCALE`,
    /// then the system locale.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Load`] when the catalogue directory or the
    /// catalogue cannot be loaded and the policy is
    /// [`LoadFailurePolicy::Abort`].
    pub fn start(
        config: L10nConfig,
        env: &impl EnvProvider,
        system: &impl SystemLocale,
    ) -> Result<Self, SessionError> {
        let locale = resolve_locale(config.locale.as_deref(), env, system);
        let store = config.catalog_dir.as_deref().map_or_else(
            || Ok(CatalogStore::bundled()),
            |dir| {
                CatalogStore::open(dir).or_else(|err| {
                    let label = locale.as_deref().unwrap_or(&config.source_language);
                    tolerate(config.on_load_error, label, err).map(|()| CatalogStore::bundled())
                })
            },
        )?;
        let mut session = Self {
            active: ActiveCatalog::with_policy(Catalog::empty(), config.lookup_policy()),
            config,
            store,
            locale: None,
            warnings: Vec::new(),
        };
        session.publish(locale)?;
        Ok(session)
    }

    /// Load and publish the catalogue for `tag`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidLocale`] for a malformed tag, and
    /// [`SessionError::Load`] when loading fails under the `abort` policy.
    /// The published catalogue is unchanged on error.
    pub fn switch_locale(&mut self, tag: &str) -> Result<(), SessionError> {
        let normalized = normalize_locale_tag(tag).ok_or_else(|| SessionError::InvalidLocale {
            raw: tag.to_owned(),
        })?;
        self.publish(Some(normalized))
    }

    /// Handle to the published catalogue.
    #[must_use]
    pub const fn active(&self) -> &ActiveCatalog {
        &self.active
    }

    /// Snapshot of the published catalogue.
    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        self.active.current()
    }

    /// Normalized tag of the current locale, if one was resolved.
    #[must_use]
    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    /// Warnings produced while loading the current catalogue.
    #[must_use]
    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    /// Settings the session was started with.
    #[must_use]
    pub const fn config(&self) -> &L10nConfig {
        &self.config
    }

    fn is_source_language(&self, tag: &str) -> bool {
        primary_language(tag).eq_ignore_ascii_case(primary_language(&self.config.source_language))
    }

    fn publish(&mut self, locale: Option<String>) -> Result<(), SessionError> {
        let mut warnings = Vec::new();
        let catalog = match locale.as_deref() {
            None => {
                debug!("no locale resolved; using source text");
                Catalog::empty()
            }
            Some(tag) if self.is_source_language(tag) => {
                debug!(locale = tag, "source language selected; no catalogue needed");
                Catalog::empty()
            }
            Some(tag) => match self.store.load(tag) {
                Ok(Some(loaded)) => {
                    warnings = loaded.warnings;
                    loaded.catalog
                }
                Ok(None) => {
                    info!(locale = tag, "no catalogue for locale; using source text");
                    Catalog::empty()
                }
                Err(err) => {
                    tolerate(self.config.on_load_error, tag, err)?;
                    Catalog::empty()
                }
            },
        };
        debug!(locale = ?locale, messages = catalog.len(), "publishing catalogue");
        self.active.publish(catalog);
        self.locale = locale;
        self.warnings = warnings;
        Ok(())
    }
}

fn tolerate(policy: LoadFailurePolicy, locale: &str, err: LoadError) -> Result<(), SessionError> {
    match policy {
        LoadFailurePolicy::Abort => Err(SessionError::Load {
            locale: locale.to_owned(),
            source: err,
        }),
        LoadFailurePolicy::Fallback => {
            warn!(locale, error = %err, "catalogue failed to load; using source text");
            Ok(())
        }
    }
}
