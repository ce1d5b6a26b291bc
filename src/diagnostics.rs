//! Diagnostics utilities.
//!
//! Adds `.diag(...)` and `.diag_with(...)` extension methods to `Result` for
//! converting errors into `miette` diagnostics with contextual messages.
//!
//! # Examples
//! ```rust,ignore
//! use miette::Result;
//! use crate::diagnostics::ResultExt;
//!
//! fn load() -> Result<String> {
//!     std::fs::read_to_string("it_IT.ts").diag("read it_IT.ts")
//! }
//! ```
use miette::{Context, IntoDiagnostic, Result};
use std::fmt::Display;

/// Extension methods for turning `Result` values into `miette` diagnostics.
pub(crate) trait ResultExt<T> {
    /// Attach a static context message to any error.
    fn diag(self, context: impl Display + Send + Sync + 'static) -> Result<T>;

    /// Attach a lazily evaluated context message to any error.
    ///
    /// ```rust,ignore
    /// use miette::Result;
    /// use crate::diagnostics::ResultExt;
    /// use std::path::Path;
    ///
    /// fn write(path: &Path, text: &str) -> Result<()> {
    ///     std::fs::write(path, text).diag_with(|| format!("write {}", path.display()))
    /// }
    /// ```
    fn diag_with(self, f: impl FnOnce() -> String) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn diag(self, context: impl Display + Send + Sync + 'static) -> Result<T> {
        self.into_diagnostic().wrap_err(context)
    }

    fn diag_with(self, f: impl FnOnce() -> String) -> Result<T> {
        self.into_diagnostic().wrap_err_with(f)
    }
}
