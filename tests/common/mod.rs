//! Shared helpers for integration tests.
//!
//! Integration tests under `tests/` compile as independent crates. This module
//! is included via `mod common;` in individual test files to share fixtures and
//! helpers while keeping test modules small and avoiding duplication.
#![expect(dead_code, reason = "each test crate uses a subset of the helpers")]

use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use metaterm_l10n::catalog::Catalog;
use metaterm_l10n::locale_resolution::{EnvProvider, SystemLocale};
use metaterm_l10n::loader::{self, Loaded};
use rstest::fixture;
use std::collections::HashMap;

/// Absolute path of a file under `tests/data`.
pub fn data_path(name: &str) -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Load a catalogue from `tests/data`.
pub fn load_fixture(name: &str) -> Result<Loaded> {
    let path = data_path(name);
    loader::from_path(&path).map_err(|err| anyhow!("{err:?}")).with_context(|| format!("load {path}"))
}

/// Fixture: the lifecycle catalogue covering every message status.
#[fixture]
pub fn lifecycle() -> Catalog {
    load_fixture("lifecycle.ts")
        .map(|loaded| loaded.catalog)
        .unwrap_or_else(|err| panic!("lifecycle fixture must load: {err:#}"))
}

/// Wrap context markup in a minimal `<TS>` document.
pub fn ts_document(body: &str) -> String {
    format!("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n<TS version=\"2.1\" language=\"it_IT\">\n{body}</TS>\n")
}

/// Environment stub backed by a map.
#[derive(Debug, Default)]
pub struct StubEnv(pub HashMap<&'static str, String>);

impl StubEnv {
    /// Build a stub exposing the given variables.
    pub fn with(vars: &[(&'static str, &str)]) -> Self {
        Self(vars.iter().map(|(key, value)| (*key, (*value).to_owned())).collect())
    }
}

impl EnvProvider for StubEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

/// System locale stub.
#[derive(Debug, Default)]
pub struct StubSystem(pub Option<&'static str>);

impl SystemLocale for StubSystem {
    fn system_locale(&self) -> Option<String> {
        self.0.map(ToOwned::to_owned)
    }
}
