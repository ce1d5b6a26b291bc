//! Unit tests for locale resolution helpers.

mod common;

use anyhow::{Result, ensure};
use common::{StubEnv, StubSystem};
use metaterm_l10n::locale_resolution::{
    METATERM_LOCALE_ENV, normalize_locale_tag, primary_language, qt_locale_name, resolve_locale,
};
use rstest::rstest;

#[rstest]
#[case("it_IT.UTF-8", Some("it-IT"))]
#[case("it_IT", Some("it-IT"))]
#[case("pt_BR@latin", Some("pt-BR"))]
#[case("  en-GB  ", Some("en-GB"))]
#[case("ja", Some("ja"))]
#[case("C", None)]
#[case("bad locale", None)]
#[case("", None)]
fn normalize_locale_tag_handles_common_formats(
    #[case] raw: &str,
    #[case] expected: Option<&str>,
) -> Result<()> {
    let normalized = normalize_locale_tag(raw);
    ensure!(
        normalized.as_deref() == expected,
        "expected {raw:?} to normalize to {expected:?}, got {normalized:?}"
    );
    Ok(())
}

#[rstest]
#[case("it-IT", "it_IT", "it")]
#[case("pt-BR", "pt_BR", "pt")]
#[case("ro", "ro", "ro")]
fn tags_map_to_qt_names(
    #[case] tag: &str,
    #[case] qt_name: &str,
    #[case] language: &str,
) -> Result<()> {
    ensure!(qt_locale_name(tag) == qt_name, "qt name for {tag}");
    ensure!(primary_language(tag) == language, "language of {tag}");
    Ok(())
}

#[rstest]
fn explicit_locale_wins_over_env_and_system() -> Result<()> {
    let env = StubEnv::with(&[(METATERM_LOCALE_ENV, "ro_RO")]);
    let resolved = resolve_locale(Some("it-IT"), &env, &StubSystem(Some("en_US")));
    ensure!(
        resolved.as_deref() == Some("it-IT"),
        "expected explicit locale to win, got {resolved:?}"
    );
    Ok(())
}

#[rstest]
fn env_then_system_locale_are_consulted() -> Result<()> {
    let system = StubSystem(Some("it_IT.UTF-8"));
    let env = StubEnv::with(&[(METATERM_LOCALE_ENV, "ro_RO")]);
    let resolved = resolve_locale(None, &env, &system);
    ensure!(
        resolved.as_deref() == Some("ro-RO"),
        "expected env locale to win, got {resolved:?}"
    );

    let fallback = resolve_locale(None, &StubEnv::default(), &system);
    ensure!(
        fallback.as_deref() == Some("it-IT"),
        "expected system locale fallback, got {fallback:?}"
    );
    Ok(())
}

#[rstest]
fn invalid_candidates_are_skipped() -> Result<()> {
    let env = StubEnv::with(&[(METATERM_LOCALE_ENV, "C")]);
    let resolved = resolve_locale(Some("bad locale"), &env, &StubSystem(Some("it_IT")));
    ensure!(
        resolved.as_deref() == Some("it-IT"),
        "expected invalid candidates to be skipped, got {resolved:?}"
    );

    let none = resolve_locale(None, &StubEnv::default(), &StubSystem(None));
    ensure!(none.is_none(), "no candidates resolves to the source language");
    Ok(())
}
