//! Command line interface definition using clap.
//!
//! This module defines the [`Cli`] structure and its subcommands. It is also
//! compiled by `build.rs` to render the manual page, so it depends on clap
//! and the standard library only.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Resolve, check and normalise MetaTerm translation catalogues.
#[derive(Debug, Parser)]
#[command(name = "metaterm-l10n", author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose diagnostic logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Read settings from this TOML file (overrides `METATERM_CONFIG_PATH`).
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Search this directory for catalogues before the bundled ones.
    #[arg(long, value_name = "DIR", global = true)]
    pub catalog_dir: Option<PathBuf>,

    /// Locale tag to resolve against (for example: it-IT).
    #[arg(long, value_name = "LOCALE", global = true)]
    pub locale: Option<String>,

    /// What to do when the selected catalogue fails to load.
    #[arg(long, value_enum, value_name = "POLICY", global = true)]
    pub on_load_error: Option<OnLoadError>,

    /// Ignore translations marked unfinished.
    #[arg(long, global = true)]
    pub skip_unfinished: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Load failure policy accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OnLoadError {
    /// Report the error and exit.
    Abort,
    /// Log the error and continue with source text.
    Fallback,
}

/// Arguments accepted by the `resolve` command.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct ResolveArgs {
    /// Context (window or dialog class) the string belongs to.
    #[arg(short, long, value_name = "CONTEXT")]
    pub context: String,

    /// Disambiguation comment distinguishing identical source strings.
    #[arg(short, long, value_name = "COMMENT")]
    pub disambiguation: Option<String>,

    /// Count selecting the plural form; replaces `%n`.
    #[arg(short = 'n', long, value_name = "N")]
    pub count: Option<u64>,

    /// Source text exactly as the application passes it.
    pub source: String,

    /// Values substituted for `{0}`, `{1}`, ...
    pub args: Vec<String>,
}

/// Arguments accepted by the `check` command.
#[derive(Debug, Args, PartialEq, Eq, Clone)]
pub struct CheckArgs {
    /// Catalogue to check.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Fail when any warning is reported.
    #[arg(long)]
    pub strict: bool,
}

/// Available top-level commands.
#[derive(Debug, Subcommand, PartialEq, Eq, Clone)]
pub enum Commands {
    /// Translate a source string for the selected locale.
    Resolve(ResolveArgs),

    /// Validate a catalogue and report statistics and warnings.
    Check(CheckArgs),

    /// Print a catalogue as JSON.
    Dump {
        /// Catalogue to print.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Rewrite a catalogue in canonical layout.
    Normalize {
        /// Catalogue to rewrite.
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output path; use `-` or omit to write to stdout.
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}
