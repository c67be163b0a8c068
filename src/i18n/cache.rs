//! In-memory translation cache owned by a single [`Intl`](crate::i18n::Intl).
//!
//! Entries are keyed `locale -> context -> pattern`. There is no eviction: an
//! entry, once present, stays for the lifetime of the cache. A pattern with no
//! translation is stored as its own value so the store is not asked again.

use crate::i18n::{Catalog, Locale};
use std::collections::HashMap;

type ContextMap = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<Locale, ContextMap>,
    catalogs: HashMap<(Locale, String), Catalog>,
}

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, locale: &Locale, context: &str, pattern: &str) -> Option<&str> {
        self.entries
            .get(locale)?
            .get(context)?
            .get(pattern)
            .map(String::as_str)
    }

    pub fn put(&mut self, locale: &Locale, context: &str, pattern: &str, value: String) {
        self.entries
            .entry(locale.clone())
            .or_default()
            .entry(context.to_string())
            .or_default()
            .insert(pattern.to_string(), value);
    }

    pub fn contains(&self, locale: &Locale, context: &str, pattern: &str) -> bool {
        self.get(locale, context, pattern).is_some()
    }

    /// Merge a whole catalog into the cache and keep it for later listing.
    ///
    /// Entries already present (including cached fallbacks) are kept.
    pub fn put_catalog(&mut self, locale: &Locale, context: &str, catalog: Catalog) {
        let patterns = self
            .entries
            .entry(locale.clone())
            .or_default()
            .entry(context.to_string())
            .or_default();
        for (pattern, value) in &catalog {
            patterns
                .entry(pattern.clone())
                .or_insert_with(|| value.clone());
        }
        self.catalogs
            .insert((locale.clone(), context.to_string()), catalog);
    }

    pub fn has_catalog(&self, locale: &Locale, context: &str) -> bool {
        self.catalog(locale, context).is_some()
    }

    /// The catalog exactly as loaded from the store.
    pub fn catalog(&self, locale: &Locale, context: &str) -> Option<&Catalog> {
        self.catalogs.get(&(locale.clone(), context.to_string()))
    }

    /// All cached entries for one locale and context.
    pub fn entries(&self, locale: &Locale, context: &str) -> Option<&HashMap<String, String>> {
        self.entries.get(locale)?.get(context)
    }

    /// Total number of cached patterns across all locales and contexts.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(|contexts| contexts.values())
            .map(HashMap::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
