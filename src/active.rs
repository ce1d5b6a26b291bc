//! Shared handle to the catalogue currently shown to the user.
//!
//! The handle stores an `Arc<Catalog>` behind a lock. Readers clone the
//! `Arc` and release the lock immediately, so a locale switch never blocks
//! behind a long render and never changes a snapshot someone already holds.

use std::sync::{Arc, PoisonError, RwLock};

use crate::catalog::Catalog;
use crate::resolve::LookupPolicy;

/// Cloneable handle to the published catalogue.
///
/// # Examples
///
/// ```rust
/// use metaterm_l10n::active::ActiveCatalog;
/// use metaterm_l10n::catalog::{Catalog, Message};
///
/// let active = ActiveCatalog::default();
/// let before = active.current();
///
/// let mut italian = Catalog::for_language("it_IT");
/// italian.insert("MainWindow", Message::new("Quit", "Chiudi"));
/// active.publish(italian);
///
/// assert_eq!(active.resolve("MainWindow", "Quit", &[] as &[&str]), "Chiudi");
/// assert_eq!(before.resolve("MainWindow", "Quit", &[] as &[&str]), "Quit");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ActiveCatalog {
    inner: Arc<RwLock<Arc<Catalog>>>,
    policy: LookupPolicy,
}

impl ActiveCatalog {
    /// Publish `catalog` under the default lookup policy.
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        Self::with_policy(catalog, LookupPolicy::default())
    }

    /// Publish `catalog` under an explicit lookup policy.
    #[must_use]
    pub fn with_policy(catalog: Catalog, policy: LookupPolicy) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(catalog))),
            policy,
        }
    }

    /// The lookup policy applied by [`Self::resolve`].
    #[must_use]
    pub const fn policy(&self) -> LookupPolicy {
        self.policy
    }

    /// Snapshot of the published catalogue.
    #[must_use]
    pub fn current(&self) -> Arc<Catalog> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish `catalog`, dropping this handle's reference to the previous
    /// one.
    pub fn publish(&self, catalog: Catalog) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(catalog);
    }

    /// Publish `catalog`, returning the catalogue it replaces.
    #[must_use]
    pub fn swap(&self, catalog: Catalog) -> Arc<Catalog> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(catalog))
    }

    /// Resolve against the current snapshot.
    #[must_use]
    pub fn resolve<S: AsRef<str>>(&self, context: &str, source: &str, args: &[S]) -> String {
        self.current()
            .resolve_with(self.policy, context, source, None, args)
    }

    /// Resolve a disambiguated source string against the current snapshot.
    #[must_use]
    pub fn resolve_disambiguated<S: AsRef<str>>(
        &self,
        context: &str,
        source: &str,
        disambiguation: &str,
        args: &[S],
    ) -> String {
        self.current()
            .resolve_with(self.policy, context, source, Some(disambiguation), args)
    }

    /// Resolve a plural message against the current snapshot.
    #[must_use]
    pub fn resolve_plural<S: AsRef<str>>(
        &self,
        context: &str,
        source: &str,
        count: u64,
        args: &[S],
    ) -> String {
        self.current()
            .resolve_plural_with(self.policy, context, source, None, count, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Message;
    use std::thread;

    #[test]
    fn clones_share_the_published_catalogue() {
        let active = ActiveCatalog::default();
        let handle = active.clone();
        let mut italian = Catalog::for_language("it_IT");
        italian.insert("WelcomeScreen", Message::new("Welcome", "Benvenuto"));
        let previous = active.swap(italian);

        assert!(previous.is_empty());
        assert_eq!(handle.resolve("WelcomeScreen", "Welcome", &[] as &[&str]), "Benvenuto");
    }

    #[test]
    fn concurrent_readers_see_a_complete_catalogue() {
        let mut italian = Catalog::for_language("it_IT");
        italian.insert("WelcomeScreen", Message::new("Welcome", "Benvenuto"));
        let active = ActiveCatalog::new(Catalog::empty());

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = active.clone();
                thread::spawn(move || {
                    (0..100)
                        .map(|_| reader.resolve("WelcomeScreen", "Welcome", &[] as &[&str]))
                        .all(|text| text == "Welcome" || text == "Benvenuto")
                })
            })
            .collect();
        active.publish(italian);

        for reader in readers {
            assert!(reader.join().unwrap_or(false));
        }
        assert_eq!(active.current().len(), 1);
    }
}
