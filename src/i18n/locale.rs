//! Locale registry: the set of supported locales and the default.
//!
//! Locales are `ll_CC` strings (`en_US`, `de_AT`). Each locale's language code
//! (its first two characters) must be unique within a registry so a bare
//! language code always names exactly one locale.

use crate::i18n::I18nError;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::OnceLock;

static LOCALE_REGEX: OnceLock<Regex> = OnceLock::new();

fn locale_regex() -> &'static Regex {
    LOCALE_REGEX.get_or_init(|| Regex::new(r"^[a-z]{2}_[A-Z]{2}$").expect("valid locale regex"))
}

/// A validated `ll_CC` locale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locale(String);

impl Locale {
    /// Parse a locale string, accepting `de_AT` and `de-AT`.
    pub fn parse(value: &str) -> Result<Locale, I18nError> {
        let normalized = value.trim().replace('-', "_");
        if locale_regex().is_match(&normalized) {
            Ok(Locale(normalized))
        } else {
            Err(I18nError::InvalidLocale(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Two-letter language code, e.g. `de` for `de_AT`.
    pub fn language_code(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supported locales keyed by language code, plus the default locale.
#[derive(Debug, Clone)]
pub struct LocaleRegistry {
    by_language: BTreeMap<String, Locale>,
    default: Locale,
}

impl LocaleRegistry {
    /// Build a registry from locale strings and the default locale.
    ///
    /// Fails when a locale is malformed, two locales share a language code,
    /// or the default is not one of the locales.
    pub fn new<I, S>(locales: I, default: &str) -> Result<Self, I18nError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut by_language = BTreeMap::new();
        for raw in locales {
            let locale = Locale::parse(raw.as_ref())?;
            let code = locale.language_code().to_string();
            if let Some(existing) = by_language.get(&code) {
                if existing != &locale {
                    return Err(I18nError::InvalidLocale(format!(
                        "{} (language code '{}' already used by {})",
                        locale, code, existing
                    )));
                }
            }
            by_language.insert(code, locale);
        }

        let default = Locale::parse(default)?;
        if by_language.get(default.language_code()) != Some(&default) {
            return Err(I18nError::InvalidLocale(format!(
                "{} (default locale is not a supported locale)",
                default
            )));
        }

        Ok(Self {
            by_language,
            default,
        })
    }

    /// Resolve a full locale or a bare language code to a supported locale.
    ///
    /// An exact locale match is tried first, then the language code.
    pub fn resolve(&self, candidate: &str) -> Result<Locale, I18nError> {
        let trimmed = candidate.trim();

        if let Ok(locale) = Locale::parse(trimmed) {
            if self.contains(&locale) {
                return Ok(locale);
            }
        }

        if trimmed.len() == 2 {
            if let Some(locale) = self.by_language_code(&trimmed.to_ascii_lowercase()) {
                return Ok(locale.clone());
            }
        }

        Err(I18nError::InvalidLocale(candidate.to_string()))
    }

    pub fn default_locale(&self) -> &Locale {
        &self.default
    }

    pub fn contains(&self, locale: &Locale) -> bool {
        self.by_language.get(locale.language_code()) == Some(locale)
    }

    pub fn by_language_code(&self, code: &str) -> Option<&Locale> {
        self.by_language.get(code)
    }

    /// All supported locales, ordered by language code.
    pub fn locales(&self) -> Vec<&Locale> {
        self.by_language.values().collect()
    }

    /// Pick the best supported locale from an `Accept-Language` header value.
    ///
    /// Entries are tried by descending quality, header order breaking ties.
    /// `q=0` excludes an entry.
    pub fn negotiate(&self, accept_language: &str) -> Option<Locale> {
        let mut entries: Vec<(&str, f32)> = accept_language
            .split(',')
            .filter_map(|part| {
                let mut components = part.trim().split(';');
                let tag = components.next().map(str::trim).filter(|t| !t.is_empty())?;
                let quality = components
                    .find_map(|param| param.trim().strip_prefix("q="))
                    .map(|q| q.trim().parse::<f32>().unwrap_or(0.0))
                    .unwrap_or(1.0);
                Some((tag, quality))
            })
            .filter(|(_, quality)| *quality > 0.0)
            .collect();
        entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

        for (tag, _) in entries {
            if let Ok(locale) = self.resolve(tag) {
                return Some(locale);
            }
            let primary = tag.split(['-', '_']).next().unwrap_or(tag);
            if let Ok(locale) = self.resolve(primary) {
                return Some(locale);
            }
        }
        None
    }
}
