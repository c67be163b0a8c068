//! Translation resolution service.
//!
//! [`Intl`] answers "what is this pattern in that locale": it checks its own
//! cache, asks the store on a miss, falls back to the source pattern when no
//! translation exists, and formats the result against the caller's
//! arguments.
//!
//! An `Intl` is meant to be request scoped: build one per request (or per
//! worker) from the shared registry, store and metrics. Its cache is never
//! invalidated, so a long-lived instance will not see translations added
//! after it cached a pattern.

use crate::i18n::format::{number, Args, MessageFormatter};
use crate::i18n::{
    Catalog, I18nError, Locale, LocaleRegistry, StoreError, TranslationCache,
    TranslationMetrics, TranslationStore, MESSAGES_CONTEXT,
};
use std::sync::Arc;
use tracing::{debug, warn};

pub const ROUTES_SINGULAR_CONTEXT: &str = "routes/singular";
pub const ROUTES_PLURAL_CONTEXT: &str = "routes/plural";

/// Argument name reserved for the count injected by [`Intl::tp`].
pub const COUNT_ARG: &str = "@count";

pub struct Intl {
    registry: Arc<LocaleRegistry>,
    store: Arc<dyn TranslationStore>,
    metrics: Arc<TranslationMetrics>,
    cache: TranslationCache,
    formatter: MessageFormatter,
    locale: Locale,
}

impl Intl {
    /// New service using the registry's default locale.
    pub fn new(registry: Arc<LocaleRegistry>, store: Arc<dyn TranslationStore>) -> Self {
        let locale = registry.default_locale().clone();
        Self {
            registry,
            store,
            metrics: Arc::new(TranslationMetrics::new()),
            cache: TranslationCache::new(),
            formatter: MessageFormatter::new(),
            locale,
        }
    }

    /// Report into shared metrics instead of private ones.
    pub fn with_metrics(mut self, metrics: Arc<TranslationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Switch the current locale; accepts a full locale or a bare language code.
    pub fn set_locale(&mut self, candidate: &str) -> Result<&Locale, I18nError> {
        self.locale = self.registry.resolve(candidate)?;
        Ok(&self.locale)
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn language_code(&self) -> &str {
        self.locale.language_code()
    }

    pub fn registry(&self) -> &LocaleRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &TranslationCache {
        &self.cache
    }

    pub fn metrics(&self) -> &TranslationMetrics {
        &self.metrics
    }

    /// Translate `pattern` in `context` and format it with `args`.
    ///
    /// `locale` defaults to the current locale. An untranslated pattern is its
    /// own translation. Store and formatting failures come back as
    /// [`I18nError::Translation`]; an unknown `locale` as
    /// [`I18nError::InvalidLocale`].
    pub fn translate(
        &mut self,
        pattern: &str,
        args: Option<&Args>,
        context: &str,
        locale: Option<&str>,
    ) -> Result<String, I18nError> {
        let locale = match locale {
            Some(candidate) => self.registry.resolve(candidate)?,
            None => self.locale.clone(),
        };

        let resolved = self.resolve(&locale, context, pattern).map_err(|e| {
            warn!(%locale, context, pattern, "translation lookup failed: {}", e);
            I18nError::translation(pattern, e)
        })?;

        match args {
            Some(args) if !args.is_empty() => self
                .formatter
                .format(&locale, &resolved, args)
                .map_err(|e| {
                    self.metrics.record_format_failure();
                    warn!(%locale, context, pattern, "formatting failed: {}", e);
                    I18nError::translation(pattern, e)
                }),
            _ => Ok(resolved),
        }
    }

    /// Translate a UI message in the current locale.
    pub fn t(&mut self, pattern: &str, args: Option<&Args>) -> Result<String, I18nError> {
        self.translate(pattern, args, MESSAGES_CONTEXT, None)
    }

    /// Translate a count-dependent message.
    ///
    /// Builds `{@count, plural, one{singular} other{plural}}`, which is also
    /// the key looked up in the messages table. `#` inside either form is
    /// replaced by the formatted count. `args` must not contain `@count`.
    pub fn tp(
        &mut self,
        plural: &str,
        singular: &str,
        count: i64,
        args: Option<&Args>,
    ) -> Result<String, I18nError> {
        if args.is_some_and(|args| args.contains_key(COUNT_ARG)) {
            return Err(I18nError::InvalidArgument(format!(
                "'{COUNT_ARG}' is reserved and set from the count"
            )));
        }

        let pattern = format!("{{{COUNT_ARG}, plural, one{{{singular}}} other{{{plural}}}}}");
        let mut args = args.cloned().unwrap_or_default();
        args.insert(COUNT_ARG, count);
        self.translate(&pattern, Some(&args), MESSAGES_CONTEXT, None)
    }

    /// Translate a singular route, e.g. `/movie/{0}`.
    pub fn r(&mut self, route: &str, args: Option<&Args>) -> Result<String, I18nError> {
        self.route(route, args, ROUTES_SINGULAR_CONTEXT)
    }

    /// Translate a plural route, e.g. `/movies`.
    pub fn rp(&mut self, route: &str, args: Option<&Args>) -> Result<String, I18nError> {
        self.route(route, args, ROUTES_PLURAL_CONTEXT)
    }

    fn route(
        &mut self,
        route: &str,
        args: Option<&Args>,
        context: &str,
    ) -> Result<String, I18nError> {
        if route == "/" {
            return Err(I18nError::Logic(
                "the root route '/' cannot be translated".to_string(),
            ));
        }
        self.translate(route, args, context, None)
    }

    /// Byte size in the current locale, e.g. `1.5 MB`.
    pub fn format_bytes(&self, bytes: u64) -> String {
        number::format_bytes(&self.locale, bytes)
    }

    /// Number in the current locale with at most `max_fraction` fractional digits.
    pub fn format_number(&self, value: f64, max_fraction: usize) -> String {
        number::format_number(&self.locale, value, max_fraction)
    }

    /// The whole catalog of a (non-message) context.
    pub fn get_translations(
        &mut self,
        context: &str,
        locale: Option<&str>,
    ) -> Result<Catalog, I18nError> {
        if context == MESSAGES_CONTEXT {
            return Err(I18nError::InvalidArgument(format!(
                "'{MESSAGES_CONTEXT}' translations are stored per message, not as a catalog"
            )));
        }
        let locale = match locale {
            Some(candidate) => self.registry.resolve(candidate)?,
            None => self.locale.clone(),
        };

        self.load_catalog(&locale, context)
            .map_err(|e| I18nError::translation(context, e))?;
        Ok(self
            .cache
            .catalog(&locale, context)
            .cloned()
            .unwrap_or_default())
    }

    /// Cached or freshly looked-up pattern for a locale and context.
    fn resolve(
        &mut self,
        locale: &Locale,
        context: &str,
        pattern: &str,
    ) -> Result<String, StoreError> {
        if let Some(hit) = self.cache.get(locale, context, pattern) {
            self.metrics.record_cache_hit();
            return Ok(hit.to_string());
        }
        self.metrics.record_cache_miss();
        debug!(%locale, context, pattern, "translation cache miss");

        let found = if context == MESSAGES_CONTEXT {
            self.metrics.record_store_lookup();
            self.store
                .message(pattern, locale.language_code())
                .map_err(|e| {
                    self.metrics.record_store_failure();
                    e
                })?
        } else {
            self.load_catalog(locale, context)?;
            self.cache.get(locale, context, pattern).map(str::to_string)
        };

        let value = found.unwrap_or_else(|| {
            self.metrics.record_fallback();
            pattern.to_string()
        });
        self.cache.put(locale, context, pattern, value.clone());
        Ok(value)
    }

    fn load_catalog(&mut self, locale: &Locale, context: &str) -> Result<(), StoreError> {
        if self.cache.has_catalog(locale, context) {
            return Ok(());
        }

        self.metrics.record_store_lookup();
        let catalog = self.store.catalog(locale, context).map_err(|e| {
            self.metrics.record_store_failure();
            e
        })?;
        debug!(%locale, context, entries = catalog.len(), "catalog loaded");
        self.cache.put_catalog(locale, context, catalog);
        Ok(())
    }
}
