//! Process-wide weak cache of materialized assembly symbols.

use std::sync::{Arc, Weak};

use dashmap::DashMap;

use crate::semantics::identity::AssemblyIdentity;
use crate::semantics::symbols::{AssemblyRc, AssemblySymbol};

/// Cache key: the underlying binary identity plus the import options that
/// affect symbol shape. Identical binaries imported with different
/// embed-interop settings must not share symbols.
type CacheKey = (AssemblyIdentity, bool);

/// A weak-referenced cache of assembly symbols keyed by binary identity and
/// import options.
///
/// Entries are weak: once every compilation using an assembly symbol drops
/// it, the cache entry goes stale and the next request re-materializes.
/// `get_or_create` runs its factory outside any lock, so two racing callers
/// may both materialize; exactly one result is published and the loser's is
/// dropped, which is safe because materialization mutates no global state.
#[derive(Debug, Default)]
pub struct SymbolCache {
    entries: DashMap<CacheKey, Weak<AssemblySymbol>>,
}

impl SymbolCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Fetch the cached symbol for `identity`/`embed_interop_types`, or
    /// materialize one with `factory`.
    ///
    /// The factory executes outside the cache's internal locks. Under a
    /// race, the first publisher wins and every caller observes the same
    /// symbol instance.
    #[must_use]
    pub fn get_or_create(
        &self,
        identity: &AssemblyIdentity,
        embed_interop_types: bool,
        factory: impl FnOnce() -> AssemblyRc,
    ) -> AssemblyRc {
        let key = (identity.clone(), embed_interop_types);

        if let Some(entry) = self.entries.get(&key) {
            if let Some(alive) = entry.value().upgrade() {
                return alive;
            }
        }

        // Expensive work happens here, unlocked; a racing caller may also
        // reach this point and lose the publish below.
        let created = factory();

        match self.entries.entry(key) {
            dashmap::mapref::entry::Entry::Occupied(mut occupied) => {
                match occupied.get().upgrade() {
                    Some(existing) => existing,
                    None => {
                        occupied.insert(Arc::downgrade(&created));
                        created
                    }
                }
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                vacant.insert(Arc::downgrade(&created));
                created
            }
        }
    }

    /// Number of entries whose symbol is still alive.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }

    /// Drop entries whose symbols have been released.
    pub fn prune(&self) {
        self.entries.retain(|_, weak| weak.strong_count() > 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn materialize(name: &str) -> AssemblyRc {
        AssemblySymbol::new_metadata(AssemblyIdentity::simple(name), Vec::new())
    }

    #[test]
    fn test_identical_requests_share_symbols() {
        let cache = SymbolCache::new();
        let identity = AssemblyIdentity::simple("Lib");

        let first = cache.get_or_create(&identity, false, || materialize("Lib"));
        let second = cache.get_or_create(&identity, false, || materialize("Lib"));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.alive_count(), 1);
    }

    #[test]
    fn test_embed_interop_mismatch_forces_fresh_symbol() {
        let cache = SymbolCache::new();
        let identity = AssemblyIdentity::simple("Interop");

        let linked = cache.get_or_create(&identity, true, || materialize("Interop"));
        let referenced = cache.get_or_create(&identity, false, || materialize("Interop"));
        assert!(!Arc::ptr_eq(&linked, &referenced));
        assert_eq!(cache.alive_count(), 2);
    }

    #[test]
    fn test_dead_entries_are_replaced() {
        let cache = SymbolCache::new();
        let identity = AssemblyIdentity::simple("Transient");

        {
            let _short_lived = cache.get_or_create(&identity, false, || materialize("Transient"));
        }
        // The weak entry is now stale; the next request re-materializes
        let revived = cache.get_or_create(&identity, false, || materialize("Transient"));
        assert_eq!(revived.identity().simple_name(), "Transient");

        cache.prune();
        assert_eq!(cache.alive_count(), 1);
        drop(revived);
        cache.prune();
        assert_eq!(cache.alive_count(), 0);
    }

    #[test]
    fn test_concurrent_get_or_create_single_winner() {
        let cache = Arc::new(SymbolCache::new());
        let identity = AssemblyIdentity::simple("Raced");

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let identity = identity.clone();
            handles.push(std::thread::spawn(move || {
                cache.get_or_create(&identity, false, || materialize("Raced"))
            }));
        }
        let results: Vec<AssemblyRc> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for window in results.windows(2) {
            assert!(Arc::ptr_eq(&window[0], &window[1]));
        }
    }
}
