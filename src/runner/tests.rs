//! Unit tests for the command-line configuration layer and command dispatch.

use super::*;
use anyhow::{Context, Result, ensure};
use clap::Parser;
use ortho_config::{MergeComposer, sanitize_value};
use rstest::rstest;
use serde_json::json;
use std::collections::HashMap;

#[derive(Default)]
struct StubEnv(HashMap<&'static str, &'static str>);

impl EnvProvider for StubEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.0.get(key).map(|value| (*value).to_owned())
    }
}

struct StubSystem(Option<&'static str>);

impl SystemLocale for StubSystem {
    fn system_locale(&self) -> Option<String> {
        self.0.map(ToOwned::to_owned)
    }
}

fn run_to_string(args: &[&str], env: &StubEnv, system: &StubSystem) -> Result<String> {
    let cli = Cli::try_parse_from(args.iter().copied()).context("parse CLI arguments")?;
    let mut out = Vec::new();
    run_with(&cli, env, system, &mut out).map_err(|report| anyhow::anyhow!("{report:?}"))?;
    String::from_utf8(out).context("decode command output")
}

#[rstest]
fn command_line_flags_override_environment() -> Result<()> {
    let cli = Cli::try_parse_from([
        "metaterm-l10n",
        "--locale",
        "it-IT",
        "--on-load-error",
        "abort",
        "--skip-unfinished",
        "resolve",
        "-c",
        "MainWindow",
        "Quit",
    ])?;
    let overrides = cli_overrides(&cli)?;
    let mut composer = MergeComposer::new();
    composer.push_defaults(sanitize_value(&L10nConfig::default())?);
    composer.push_environment(json!({ "locale": "ro_RO", "on_load_error": "fallback" }));
    composer.push_cli(sanitize_value(&overrides)?);
    let config = L10nConfig::merge_from_layers(composer.layers())?;
    ensure!(config.locale.as_deref() == Some("it-IT"), "CLI locale should win");
    ensure!(config.on_load_error == LoadFailurePolicy::Abort, "CLI policy should win");
    ensure!(!config.include_unfinished, "--skip-unfinished should disable unfinished entries");
    Ok(())
}

#[rstest]
fn unset_flags_leave_lower_layers_alone() -> Result<()> {
    let cli = Cli::try_parse_from(["metaterm-l10n", "resolve", "-c", "MainWindow", "Quit"])?;
    let overrides = cli_overrides(&cli)?;
    ensure!(overrides == ConfigOverrides::default(), "no flags, no overrides: {overrides:?}");
    Ok(())
}

#[rstest]
#[case(&["metaterm-l10n", "--locale", "it-IT", "resolve", "-c", "MainWindow", "Quit"], "Chiudi\n")]
#[case(&["metaterm-l10n", "--locale", "en-US", "resolve", "-c", "MainWindow", "Quit"], "Quit\n")]
#[case(
    &["metaterm-l10n", "--locale", "it-IT", "resolve", "-c", "EntryScreen", "<small>Entry ID: {0}</small>", "42"],
    "<small>ID scheda: 42</small>\n"
)]
#[case(
    &["metaterm-l10n", "--locale", "it-IT", "resolve", "-c", "MainWindow", "Termbase {0} has been deleted.", "Sports"],
    "Termbase Sports has been deleted.\n"
)]
fn resolve_uses_bundled_catalogue(#[case] args: &[&str], #[case] expected: &str) -> Result<()> {
    let output = run_to_string(args, &StubEnv::default(), &StubSystem(None))?;
    ensure!(output == expected, "expected {expected:?}, got {output:?}");
    Ok(())
}

#[rstest]
fn resolve_falls_back_to_system_locale() -> Result<()> {
    let output = run_to_string(
        &["metaterm-l10n", "resolve", "-c", "SelectFileInput", "Browse"],
        &StubEnv::default(),
        &StubSystem(Some("it_IT.UTF-8")),
    )?;
    ensure!(output == "Sfoglia\n", "unexpected output {output:?}");
    Ok(())
}
