//! Translation metrics and observability module.
//!
//! Counters for cache behaviour, store access and failures. One instance is
//! shared (behind an `Arc`) by every [`Intl`](crate::i18n::Intl) built from the
//! same application state.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
pub struct TranslationMetrics {
    /// Lookups answered from the translation cache
    cache_hits: AtomicUsize,

    /// Lookups that had to go to the store
    cache_misses: AtomicUsize,

    /// Message queries and catalog loads issued to the store
    store_lookups: AtomicUsize,

    /// Store accesses that failed
    store_failures: AtomicUsize,

    /// Patterns that failed to format
    format_failures: AtomicUsize,

    /// Patterns served as their own translation
    fallbacks: AtomicUsize,
}

impl TranslationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_lookup(&self) {
        self.store_lookups.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_failure(&self) {
        self.store_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_format_failure(&self) {
        self.format_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn cache_hits(&self) -> usize {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn cache_misses(&self) -> usize {
        self.cache_misses.load(Ordering::Relaxed)
    }

    pub fn store_lookups(&self) -> usize {
        self.store_lookups.load(Ordering::Relaxed)
    }

    pub fn store_failures(&self) -> usize {
        self.store_failures.load(Ordering::Relaxed)
    }

    pub fn format_failures(&self) -> usize {
        self.format_failures.load(Ordering::Relaxed)
    }

    pub fn fallbacks(&self) -> usize {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let hits = self.cache_hits();
        let misses = self.cache_misses();
        let total_cache_queries = hits + misses;
        let cache_hit_rate = if total_cache_queries > 0 {
            (hits as f64 / total_cache_queries as f64) * 100.0
        } else {
            0.0
        };

        MetricsReport {
            cache_hits: hits,
            cache_misses: misses,
            cache_hit_rate,
            store_lookups: self.store_lookups(),
            store_failures: self.store_failures(),
            format_failures: self.format_failures(),
            fallbacks: self.fallbacks(),
        }
    }
}

/// Metrics report containing current translation statistics.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub cache_hits: usize,
    pub cache_misses: usize,

    /// Cache hit rate as a percentage (0-100)
    pub cache_hit_rate: f64,

    pub store_lookups: usize,
    pub store_failures: usize,
    pub format_failures: usize,
    pub fallbacks: usize,
}
