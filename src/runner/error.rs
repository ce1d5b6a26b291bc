//! Error types for the runner module.
//!
//! This submodule isolates derive-macro-affected code to scope lint suppressions
//! narrowly. The `unused_assignments` lint fires in some Rust versions due to
//! thiserror/miette derive macro expansion.

// Scoped suppression for version-dependent lint false positives from
// miette/thiserror derive macros. The unused_assignments lint fires in some
// Rust versions but not others. Since `#[expect]` fails when the lint doesn't
// fire, and `unfulfilled_lint_expectations` cannot be expected, we must use
// `#[allow]` here.
// FIXME(rust-lang/rust#130021): remove once upstream is fixed.
#![allow(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    unused_assignments
)]

use camino::Utf8PathBuf;
use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised during command execution.
#[derive(Debug, Error, Diagnostic)]
pub enum RunnerError {
    /// A path given on the command line is not valid UTF-8.
    #[error("path {} is not valid UTF-8", path.display())]
    #[diagnostic(code(metaterm_l10n::runner::non_utf8_path))]
    NonUtf8Path {
        /// The rejected path.
        path: PathBuf,
    },
    /// `check --strict` found warnings.
    #[error("{path}: {count} warning(s) found")]
    #[diagnostic(
        code(metaterm_l10n::runner::strict_check),
        help("fix the reported entries or run `check` without --strict")
    )]
    StrictCheckFailed {
        /// Catalogue that was checked.
        path: Utf8PathBuf,
        /// Number of warnings.
        count: usize,
    },
}
