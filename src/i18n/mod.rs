//! Internationalization (i18n) module: translation resolution for MovLib.
//!
//! Everything that turns a source-language pattern into localized text lives
//! here.
//!
//! # Architecture
//!
//! - `locale`: Supported locales and resolution of locale / language-code input
//! - `store`: Read access to the messages table and per-context catalog files
//! - `cache`: Per-instance `locale -> context -> pattern` cache
//! - `format`: ICU-style message formatting, plural rules and number formatting
//! - `intl`: The resolution service tying the pieces together
//! - `validator`: Translation quality validation
//! - `metrics`: Translation observability and metrics
//!
//! # Example
//!
//! ```rust,ignore
//! use movlib_i18n::i18n::{Args, Intl, LocaleRegistry};
//!
//! let registry = Arc::new(LocaleRegistry::new(["en_US", "de_AT"], "en_US")?);
//! let mut intl = Intl::new(registry, store);
//! intl.set_locale("de")?;
//!
//! let greeting = intl.t("Hello {name}", Some(&Args::new().with("name", "Ana")))?;
//! let movies = intl.tp("# movies", "# movie", 3, None)?;
//! ```

mod cache;
mod error;
pub mod format;
mod intl;
mod locale;
mod metrics;
mod store;
mod validator;

pub use cache::TranslationCache;
pub use error::{FormatError, I18nError, StoreError, TranslationCause};
pub use format::{ArgValue, Args, MessageFormatter};
pub use intl::{Intl, COUNT_ARG, ROUTES_PLURAL_CONTEXT, ROUTES_SINGULAR_CONTEXT};
pub use locale::{Locale, LocaleRegistry};
pub use metrics::{MetricsReport, TranslationMetrics};
pub use store::{
    catalog_path, load_catalog, Catalog, DatabaseStore, TranslationStore, MESSAGES_CONTEXT,
};
pub use validator::{TranslationValidator, ValidationReport};
