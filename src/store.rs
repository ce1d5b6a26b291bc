//! Catalogue discovery.
//!
//! A locale tag such as `it-IT` is looked up as `it_IT.ts` and then `it.ts`,
//! first in the configured catalogue directory and then among the catalogues
//! compiled into the binary.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use tracing::debug;

use crate::loader::{self, LoadError, Loaded};
use crate::locale_resolution::{primary_language, qt_locale_name};

/// Catalogues shipped inside the binary, keyed by Qt locale name.
pub const BUNDLED: &[(&str, &str)] = &[("it_IT", include_str!("../l10n/it_IT.ts"))];

/// Candidate file names for `tag`, most specific first.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::store::catalog_file_names;
///
/// assert_eq!(catalog_file_names("it-IT"), ["it_IT.ts", "it.ts"]);
/// assert_eq!(catalog_file_names("ro"), ["ro.ts"]);
/// ```
#[must_use]
pub fn catalog_file_names(tag: &str) -> Vec<String> {
    let full = qt_locale_name(tag);
    let language = primary_language(&full);
    let mut names = vec![format!("{full}.ts")];
    if language != full {
        names.push(format!("{language}.ts"));
    }
    names
}

/// Where catalogues are looked up.
#[derive(Debug)]
pub struct CatalogStore {
    directory: Option<(Utf8PathBuf, Dir)>,
}

impl CatalogStore {
    /// A store that only knows the bundled catalogues.
    #[must_use]
    pub const fn bundled() -> Self {
        Self { directory: None }
    }

    /// A store that searches `path` before the bundled catalogues.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] when the directory cannot be opened.
    pub fn open(path: &Utf8Path) -> Result<Self, LoadError> {
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(|source| {
            LoadError::Io {
                path: path.to_owned(),
                source,
            }
        })?;
        Ok(Self {
            directory: Some((path.to_owned(), dir)),
        })
    }

    /// The catalogue directory, when one is configured.
    #[must_use]
    pub fn directory(&self) -> Option<&Utf8Path> {
        self.directory.as_ref().map(|(path, _)| path.as_path())
    }

    /// Load the catalogue for `tag`.
    ///
    /// Returns `Ok(None)` when no catalogue exists for the locale.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError`] when a catalogue exists but cannot be read or
    /// parsed.
    pub fn load(&self, tag: &str) -> Result<Option<Loaded>, LoadError> {
        let names = catalog_file_names(tag);
        if let Some((root, dir)) = &self.directory {
            for name in &names {
                match dir.read(name) {
                    Ok(bytes) => {
                        let path = root.join(name);
                        debug!(path = %path, locale = tag, "loading catalogue from directory");
                        return loader::from_bytes(&bytes, path.as_str()).map(Some);
                    }
                    Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                    Err(source) => {
                        return Err(LoadError::Io {
                            path: root.join(name),
                            source,
                        });
                    }
                }
            }
        }
        for name in &names {
            let stem = name.trim_end_matches(".ts");
            if let Some((_, text)) = BUNDLED.iter().find(|(locale, _)| *locale == stem) {
                debug!(catalogue = %name, locale = tag, "loading bundled catalogue");
                return loader::from_str_named(text, name).map(Some);
            }
        }
        debug!(locale = tag, "no catalogue found");
        Ok(None)
    }
}
