//! CLDR plural category resolution.
//!
//! Rules come from `icu_plurals` compiled data, loaded once per language and
//! kept for the lifetime of the owning formatter.

use icu_locale_core::Locale as IcuLocale;
use icu_plurals::{PluralCategory, PluralRuleType, PluralRules};
use std::collections::HashMap;
use std::fmt;
use tracing::warn;

#[derive(Default)]
pub struct PluralRulesCache {
    rules: HashMap<String, Option<PluralRules>>,
}

impl fmt::Debug for PluralRulesCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluralRulesCache")
            .field("languages", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl PluralRulesCache {
    /// CLDR cardinal category keyword (`zero`, `one`, `two`, `few`, `many`, `other`).
    ///
    /// Non-integral numbers always select `other`. Languages unknown to the
    /// plural data fall back to English-style rules.
    pub fn category(&mut self, language_code: &str, n: f64) -> &'static str {
        if n.fract() != 0.0 || !n.is_finite() || n.abs() > i64::MAX as f64 {
            return "other";
        }
        let n = n as i64;

        match self.rules_for(language_code) {
            Some(rules) => keyword(rules.category_for(n)),
            None if n.abs() == 1 => "one",
            None => "other",
        }
    }

    fn rules_for(&mut self, language_code: &str) -> Option<&PluralRules> {
        self.rules
            .entry(language_code.to_string())
            .or_insert_with(|| load_rules(language_code))
            .as_ref()
    }
}

fn load_rules(language_code: &str) -> Option<PluralRules> {
    let locale: IcuLocale = match language_code.parse() {
        Ok(locale) => locale,
        Err(e) => {
            warn!(language_code, "invalid language code for plural rules: {:?}", e);
            return None;
        }
    };

    match PluralRules::try_new(locale.into(), PluralRuleType::Cardinal.into()) {
        Ok(rules) => Some(rules),
        Err(e) => {
            warn!(language_code, "no plural rules available: {}", e);
            None
        }
    }
}

fn keyword(category: PluralCategory) -> &'static str {
    match category {
        PluralCategory::Zero => "zero",
        PluralCategory::One => "one",
        PluralCategory::Two => "two",
        PluralCategory::Few => "few",
        PluralCategory::Many => "many",
        PluralCategory::Other => "other",
    }
}
