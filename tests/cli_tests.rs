//! End-to-end tests that invoke the compiled `metaterm-l10n` binary.

mod common;

use anyhow::{Context, Result, ensure};
use assert_cmd::Command;
use common::data_path;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const ENV_VARS: &[&str] = &[
    "METATERM_CONFIG_PATH",
    "METATERM_LOCALE",
    "METATERM_CATALOG_DIR",
    "METATERM_ON_LOAD_ERROR",
    "METATERM_INCLUDE_UNFINISHED",
];

fn metaterm() -> Result<Command> {
    let mut cmd = Command::cargo_bin("metaterm-l10n").context("locate metaterm-l10n binary")?;
    for var in ENV_VARS {
        cmd.env_remove(var);
    }
    Ok(cmd)
}

#[test]
fn resolve_prints_italian_translation() -> Result<()> {
    metaterm()?
        .args(["--locale", "it-IT", "resolve", "-c", "MainWindow", "Quit"])
        .assert()
        .success()
        .stdout("Chiudi\n");
    Ok(())
}

#[test]
fn resolve_substitutes_arguments() -> Result<()> {
    metaterm()?
        .args(["--locale", "it_IT.UTF-8", "resolve", "-c", "EntryScreen"])
        .arg("<small>Entry ID: {0}</small>")
        .arg("42")
        .assert()
        .success()
        .stdout("<small>ID scheda: 42</small>\n");
    Ok(())
}

#[test]
fn resolve_reads_locale_from_environment() -> Result<()> {
    metaterm()?
        .env("METATERM_LOCALE", "it-IT")
        .args(["resolve", "-c", "SelectFileInput", "Browse"])
        .assert()
        .success()
        .stdout("Sfoglia\n");
    Ok(())
}

#[test]
fn resolve_aborts_on_malformed_catalogue_when_asked() -> Result<()> {
    let temp = tempdir().context("create catalogue dir")?;
    fs::copy(data_path("malformed.ts"), temp.path().join("it_IT.ts")).context("copy catalogue")?;

    metaterm()?
        .arg("--catalog-dir")
        .arg(temp.path())
        .args(["--locale", "it-IT", "resolve", "-c", "MainWindow", "Quit"])
        .assert()
        .success()
        .stdout("Quit\n");

    let output = metaterm()?
        .arg("--catalog-dir")
        .arg(temp.path())
        .args(["--locale", "it-IT", "--on-load-error", "abort"])
        .args(["resolve", "-c", "MainWindow", "Quit"])
        .output()
        .context("run resolve with abort policy")?;
    ensure!(!output.status.success(), "abort policy should fail");
    let stderr = String::from_utf8(strip_ansi_escapes::strip(&output.stderr))
        .context("stderr is UTF-8")?;
    ensure!(
        stderr.contains("failed to load the catalogue for locale it-IT"),
        "stderr should name the failing locale, got: {stderr}"
    );
    Ok(())
}

#[test]
fn configuration_layers_apply_in_order() -> Result<()> {
    let temp = tempdir().context("create config dir")?;
    let catalogue = concat!(
        "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n",
        "<TS version=\"2.1\" language=\"ro_RO\">\n<context>\n<name>MainWindow</name>\n",
        "<message>\n<source>Quit</source>\n<translation>Ieșire</translation>\n</message>\n",
        "</context>\n</TS>\n",
    );
    fs::write(temp.path().join("ro.ts"), catalogue).context("write catalogue")?;
    let config = temp.path().join("metaterm.toml");
    let catalog_dir = temp.path().to_str().context("temp dir is UTF-8")?;
    fs::write(&config, format!("locale = \"ro\"\ncatalog_dir = \"{catalog_dir}\"\n"))
        .context("write metaterm.toml")?;

    metaterm()?
        .env("METATERM_CONFIG_PATH", &config)
        .args(["resolve", "-c", "MainWindow", "Quit"])
        .assert()
        .success()
        .stdout("Ieșire\n");

    metaterm()?
        .env("METATERM_CONFIG_PATH", &config)
        .env("METATERM_LOCALE", "it-IT")
        .args(["resolve", "-c", "MainWindow", "Quit"])
        .assert()
        .success()
        .stdout("Chiudi\n");

    metaterm()?
        .env("METATERM_CONFIG_PATH", &config)
        .env("METATERM_LOCALE", "it-IT")
        .args(["--locale", "ro", "resolve", "-c", "MainWindow", "Quit"])
        .assert()
        .success()
        .stdout("Ieșire\n");
    Ok(())
}

#[test]
fn check_reports_summary_and_warnings() -> Result<()> {
    let file = data_path("duplicates.ts");
    metaterm()?
        .arg("check")
        .arg(file.as_str())
        .assert()
        .success()
        .stdout(
            predicate::str::contains("1 contexts, 3 messages (3 active, 0 unfinished, 0 obsolete)")
                .and(predicate::str::contains(
                    "warning: line 14: duplicate message \"Quit\" in context MainWindow",
                ))
                .and(predicate::str::contains("placeholder mismatch")),
        );
    Ok(())
}

#[test]
fn strict_check_fails_on_findings() -> Result<()> {
    let file = data_path("duplicates.ts");
    metaterm()?
        .args(["check", "--strict"])
        .arg(file.as_str())
        .assert()
        .failure()
        .stderr(predicate::str::contains("warning"));

    metaterm()?
        .args(["check", "--strict"])
        .arg(data_path("lifecycle.ts").as_str())
        .assert()
        .success();
    Ok(())
}

#[test]
fn check_rejects_malformed_catalogue() -> Result<()> {
    let output = metaterm()?
        .arg("check")
        .arg(data_path("malformed.ts").as_str())
        .output()
        .context("run check on malformed catalogue")?;
    ensure!(!output.status.success(), "malformed catalogue should fail");
    let stderr = String::from_utf8(strip_ansi_escapes::strip(&output.stderr))
        .context("stderr is UTF-8")?;
    ensure!(
        stderr.contains("expected </translation> but found </source>"),
        "stderr should describe the mismatch, got: {stderr}"
    );
    Ok(())
}

#[test]
fn dump_emits_json() -> Result<()> {
    let output = metaterm()?
        .arg("dump")
        .arg(data_path("lifecycle.ts").as_str())
        .output()
        .context("run dump")?;
    ensure!(output.status.success(), "dump should succeed");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).context("dump output is JSON")?;
    ensure!(
        value.pointer("/header/language").and_then(serde_json::Value::as_str) == Some("it_IT"),
        "header language, got {value}"
    );
    ensure!(
        value.pointer("/contexts/0/name").and_then(serde_json::Value::as_str) == Some("MainWindow"),
        "first context, got {value}"
    );
    Ok(())
}

#[test]
fn normalize_writes_output_file() -> Result<()> {
    let temp = tempdir().context("create output dir")?;
    let target = temp.path().join("it_IT.ts");
    let bundled = concat!(env!("CARGO_MANIFEST_DIR"), "/l10n/it_IT.ts");
    metaterm()?
        .args(["normalize", bundled, "-o"])
        .arg(&target)
        .assert()
        .success()
        .stdout("");
    let written = fs::read_to_string(&target).context("read normalised catalogue")?;
    let original = fs::read_to_string(bundled).context("read bundled catalogue")?;
    ensure!(written == original, "bundled catalogue is already normalised");
    Ok(())
}

#[test]
fn normalize_streams_to_stdout_when_dash() -> Result<()> {
    let temp = tempdir().context("create working dir")?;
    metaterm()?
        .current_dir(temp.path())
        .arg("normalize")
        .arg(data_path("duplicates.ts").as_str())
        .args(["-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<?xml").and(predicate::str::contains("<name>MainWindow</name>")));
    ensure!(!temp.path().join("-").exists(), "no file named '-' is created");
    Ok(())
}
