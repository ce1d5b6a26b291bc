//! Runtime configuration for the localisation layer.
//!
//! Values are layered in increasing precedence with `ortho_config`: built-in
//! defaults, a TOML configuration file, `METATERM_*` environment variables,
//! and finally command-line overrides.

// miette/thiserror derive expansion trips `unused_assignments` on some
// toolchains; `#[expect]` cannot be used because the lint is not stable
// across versions.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use miette::Diagnostic;
use ortho_config::declarative::LayerComposition;
use ortho_config::figment::{Figment, providers::Env};
use ortho_config::uncased::Uncased;
use ortho_config::{
    ConfigDiscovery, MergeComposer, OrthoConfig, OrthoError, OrthoMergeExt, sanitize_value,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::resolve::LookupPolicy;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "METATERM_CONFIG_PATH";
const ENV_PREFIX: &str = "METATERM_";

/// What to do when the catalogue for the selected locale fails to load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadFailurePolicy {
    /// Report the error and refuse to start.
    Abort,
    /// Log the error and continue with source-language text.
    #[default]
    Fallback,
}

impl FromStr for LoadFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "fallback" => Ok(Self::Fallback),
            other => Err(format!("expected `abort` or `fallback`, got `{other}`")),
        }
    }
}

impl fmt::Display for LoadFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Abort => "abort",
            Self::Fallback => "fallback",
        })
    }
}

/// Localisation settings.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::config::{L10nConfig, LoadFailurePolicy};
/// use ortho_config::{MergeComposer, sanitize_value};
/// use serde_json::json;
///
/// let mut composer = MergeComposer::new();
/// composer.push_defaults(sanitize_value(&L10nConfig::default())?);
/// composer.push_environment(json!({ "locale": "it_IT", "on_load_error": "abort" }));
/// let config = L10nConfig::merge_from_layers(composer.layers())?;
/// assert_eq!(config.locale.as_deref(), Some("it_IT"));
/// assert_eq!(config.on_load_error, LoadFailurePolicy::Abort);
/// assert!(config.include_unfinished);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "METATERM")]
#[serde(default)]
pub struct L10nConfig {
    /// Locale tag to load; the system locale is used when absent.
    pub locale: Option<String>,
    /// Directory searched for `.ts` catalogues before the bundled set.
    pub catalog_dir: Option<Utf8PathBuf>,
    /// Behaviour when the selected catalogue fails to load.
    #[ortho_config(default = LoadFailurePolicy::Fallback)]
    pub on_load_error: LoadFailurePolicy,
    /// Show translations still marked unfinished.
    #[ortho_config(default = true)]
    pub include_unfinished: bool,
    /// Language the source strings are written in; it needs no catalogue.
    #[ortho_config(default = default_source_language())]
    pub source_language: String,
}

impl Default for L10nConfig {
    fn default() -> Self {
        Self {
            locale: None,
            catalog_dir: None,
            on_load_error: LoadFailurePolicy::default(),
            include_unfinished: true,
            source_language: default_source_language(),
        }
    }
}

fn default_source_language() -> String {
    String::from("en")
}

/// Settings supplied on the command line; unset fields leave lower layers
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfigOverrides {
    /// Locale tag to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Directory searched for `.ts` catalogues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_dir: Option<Utf8PathBuf>,
    /// Behaviour when the selected catalogue fails to load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_load_error: Option<LoadFailurePolicy>,
    /// Show translations still marked unfinished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_unfinished: Option<bool>,
}

/// Errors raised while assembling configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// A configuration layer could not be read or merged.
    #[error("failed to assemble configuration")]
    #[diagnostic(
        code(metaterm_l10n::config::layering),
        help(
            "configuration files are TOML; keys are `locale`, `catalog_dir`, `on_load_error`, `include_unfinished` and `source_language`"
        )
    )]
    Layering {
        /// Underlying discovery, parse or merge error.
        #[source]
        source: Arc<OrthoError>,
    },
}

impl L10nConfig {
    /// Merge defaults, the configuration file, `METATERM_*` environment
    /// variables and `overrides`, in that order of precedence.
    ///
    /// The file is `explicit` when given; otherwise it is discovered from
    /// `METATERM_CONFIG_PATH` and the usual configuration directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Layering`] when a file cannot be read or
    /// parsed, or when a layer holds a value of the wrong type.
    pub fn load(
        explicit: Option<&Utf8Path>,
        overrides: &ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();
        let mut composer = MergeComposer::with_capacity(4);

        match sanitize_value(&Self::default()) {
            Ok(value) => composer.push_defaults(value),
            Err(err) => errors.push(err),
        }

        let mut file_layers = config_discovery(explicit).compose_layers();
        errors.append(&mut file_layers.required_errors);
        if file_layers.value.is_empty() {
            errors.append(&mut file_layers.optional_errors);
        }
        for layer in file_layers.value {
            composer.push_layer(layer);
        }

        let env_provider = Env::prefixed(ENV_PREFIX)
            .map(|key| Uncased::new(key.as_str().to_ascii_uppercase()))
            .split("__");
        match Figment::from(env_provider)
            .extract::<serde_json::Value>()
            .into_ortho_merge()
        {
            Ok(value) => composer.push_environment(value),
            Err(err) => errors.push(err),
        }

        match sanitize_value(overrides) {
            Ok(value) if !is_empty_value(&value) => composer.push_cli(value),
            Ok(_) => {}
            Err(err) => errors.push(err),
        }

        let composition = LayerComposition::new(composer.layers(), errors);
        let config = composition
            .into_merge_result(Self::merge_from_layers)
            .map_err(|source| ConfigError::Layering { source })?;
        debug!(?config, "merged configuration layers");
        Ok(config)
    }

    /// Lookup policy implied by these settings.
    #[must_use]
    pub const fn lookup_policy(&self) -> LookupPolicy {
        LookupPolicy {
            include_unfinished: self.include_unfinished,
        }
    }
}

/// Discovery of `metaterm` configuration files, pinned to `explicit` when
/// the caller names one.
fn config_discovery(explicit: Option<&Utf8Path>) -> ConfigDiscovery {
    let mut builder = ConfigDiscovery::builder("metaterm").env_var(CONFIG_ENV_VAR);
    if let Some(path) = explicit {
        builder = builder.add_required_path(path.as_std_path());
    }
    builder.build()
}

/// An empty object means no command-line overrides were given.
fn is_empty_value(value: &serde_json::Value) -> bool {
    matches!(value, serde_json::Value::Object(map) if map.is_empty())
}
