//! CLI execution and command dispatch logic.
//!
//! This module keeps `main` minimal by providing a single entry point that
//! handles command execution. Command output goes to the supplied writer;
//! logs and diagnostics go to stderr.

mod error;

pub use error::RunnerError;

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use camino::{Utf8Path, Utf8PathBuf};
use miette::Result;
use tracing::{debug, info};

use crate::audit::placeholder_mismatches;
use crate::cli::{CheckArgs, Cli, Commands, OnLoadError, ResolveArgs};
use crate::config::{ConfigOverrides, L10nConfig, LoadFailurePolicy};
use crate::diagnostics::ResultExt;
use crate::loader;
use crate::locale_resolution::{EnvProvider, SysLocale, SystemEnv, SystemLocale};
use crate::session::LocaleSession;
use crate::writer::to_ts_string;

/// Execute the parsed [`Cli`] command against the process environment,
/// writing command output to stdout.
///
/// # Errors
///
/// Returns a diagnostic when configuration, catalogue loading or output
/// fails.
pub fn run(cli: &Cli) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with(cli, &SystemEnv, &SysLocale, &mut out)
}

/// Execute the parsed [`Cli`] command with an explicit output sink.
///
/// `env` and `system` drive locale resolution; configuration layers still
/// come from the process environment and discovered configuration files.
///
/// # Errors
///
/// Returns a diagnostic when configuration, catalogue loading or output
/// fails.
pub fn run_with<W: Write>(
    cli: &Cli,
    env: &impl EnvProvider,
    system: &impl SystemLocale,
    out: &mut W,
) -> Result<()> {
    match &cli.command {
        Commands::Resolve(args) => {
            let config = settings(cli)?;
            resolve(config, args, env, system, out)
        }
        Commands::Check(args) => check(args, out),
        Commands::Dump { file } => dump(file, out),
        Commands::Normalize { file, output } => normalize(file, output.as_deref(), out),
    }
}

fn utf8_path(path: &Path) -> Result<Utf8PathBuf, RunnerError> {
    Utf8PathBuf::from_path_buf(path.to_path_buf())
        .map_err(|rejected| RunnerError::NonUtf8Path { path: rejected })
}

/// Compose the configuration layers with the command line on top.
fn settings(cli: &Cli) -> Result<L10nConfig> {
    let explicit = cli.config.as_deref().map(utf8_path).transpose()?;
    let config = L10nConfig::load(explicit.as_deref(), &cli_overrides(cli)?)?;
    debug!(?config, "resolved configuration");
    Ok(config)
}

/// The command-line layer; flags left unset do not appear in it.
fn cli_overrides(cli: &Cli) -> Result<ConfigOverrides, RunnerError> {
    Ok(ConfigOverrides {
        locale: cli.locale.clone(),
        catalog_dir: cli.catalog_dir.as_deref().map(utf8_path).transpose()?,
        on_load_error: cli.on_load_error.map(|policy| match policy {
            OnLoadError::Abort => LoadFailurePolicy::Abort,
            OnLoadError::Fallback => LoadFailurePolicy::Fallback,
        }),
        include_unfinished: cli.skip_unfinished.then_some(false),
    })
}

fn resolve<W: Write>(
    config: L10nConfig,
    args: &ResolveArgs,
    env: &impl EnvProvider,
    system: &impl SystemLocale,
    out: &mut W,
) -> Result<()> {
    let session = LocaleSession::start(config, env, system)?;
    info!(locale = ?session.locale(), "resolving against catalogue");
    let policy = session.active().policy();
    let catalog = session.catalog();
    let disambiguation = args.disambiguation.as_deref();
    let text = match args.count {
        Some(count) => catalog.resolve_plural_with(
            policy,
            &args.context,
            &args.source,
            disambiguation,
            count,
            &args.args,
        ),
        None => catalog.resolve_with(policy, &args.context, &args.source, disambiguation, &args.args),
    };
    writeln!(out, "{text}").diag("write resolved text")
}

fn check<W: Write>(args: &CheckArgs, out: &mut W) -> Result<()> {
    let path = utf8_path(&args.file)?;
    let loaded = loader::from_path(&path)?;
    let stats = loaded.catalog.stats();
    let mut findings: Vec<String> = loaded.warnings.iter().map(ToString::to_string).collect();
    findings.extend(
        placeholder_mismatches(&loaded.catalog)
            .iter()
            .map(ToString::to_string),
    );

    writeln!(
        out,
        "{path}: {} contexts, {} messages ({} active, {} unfinished, {} obsolete)",
        stats.contexts, stats.messages, stats.active, stats.unfinished, stats.obsolete
    )
    .diag("write check summary")?;
    for finding in &findings {
        writeln!(out, "warning: {finding}").diag("write check warning")?;
    }

    if args.strict && !findings.is_empty() {
        return Err(RunnerError::StrictCheckFailed {
            path,
            count: findings.len(),
        }
        .into());
    }
    Ok(())
}

fn dump<W: Write>(file: &Path, out: &mut W) -> Result<()> {
    let path = utf8_path(file)?;
    let loaded = loader::from_path(&path)?;
    serde_json::to_writer_pretty(&mut *out, &loaded.catalog)
        .diag_with(|| format!("serialise {path} as JSON"))?;
    writeln!(out).diag("write JSON output")
}

fn normalize<W: Write>(file: &Path, output: Option<&Path>, out: &mut W) -> Result<()> {
    let path = utf8_path(file)?;
    let loaded = loader::from_path(&path)?;
    let text = to_ts_string(&loaded.catalog);
    match output.map(utf8_path).transpose()? {
        Some(target) if target.as_str() != "-" => write_file(&target, &text),
        _ => out
            .write_all(text.as_bytes())
            .diag("write normalised catalogue"),
    }
}

fn write_file(target: &Utf8Path, text: &str) -> Result<()> {
    fs::write(target, text).diag_with(|| format!("write {target}"))?;
    info!(path = %target, "wrote normalised catalogue");
    Ok(())
}

#[cfg(test)]
mod tests;
