//! Translation quality validation module.
//!
//! Checks a translated pattern against its source before it is stored: the
//! translation must be a well-formed message and should use the same
//! arguments as the source.

use crate::i18n::format::parser;

/// Validation report containing errors and warnings about a translation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    /// Problems that make the translation unusable
    pub errors: Vec<String>,

    /// Suspicious differences that may be intentional
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn is_clean(&self) -> bool {
        !self.has_errors() && !self.has_warnings()
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

/// Validator for translation quality.
pub struct TranslationValidator;

impl TranslationValidator {
    /// Validate a translated pattern against its source pattern.
    ///
    /// - error: the translation does not parse
    /// - warning: the source does not parse (nothing to compare against)
    /// - warning: arguments missing from, or added by, the translation
    pub fn validate(source: &str, translated: &str) -> ValidationReport {
        let mut report = ValidationReport::new();

        let translated_names = match parser::argument_names(translated) {
            Ok(names) => names,
            Err(e) => {
                report.errors.push(format!("Translation is not a valid message: {}", e));
                return report;
            }
        };

        let source_names = match parser::argument_names(source) {
            Ok(names) => names,
            Err(e) => {
                report
                    .warnings
                    .push(format!("Source is not a valid message: {}", e));
                return report;
            }
        };

        let missing: Vec<_> = source_names.difference(&translated_names).collect();
        if !missing.is_empty() {
            report.warnings.push(format!(
                "Translation drops arguments {:?}",
                missing
            ));
        }

        let added: Vec<_> = translated_names.difference(&source_names).collect();
        if !added.is_empty() {
            report.warnings.push(format!(
                "Translation introduces unknown arguments {:?}",
                added
            ));
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_clean_translation() {
        let report = TranslationValidator::validate("Hello {name}", "Hallo {name}");
        assert!(report.is_clean());
    }

    #[test]
    fn test_validate_plain_text() {
        let report = TranslationValidator::validate("Movies", "Filme");
        assert!(report.is_clean());
    }

    #[test]
    fn test_validate_reordered_arguments() {
        let report = TranslationValidator::validate("{a} of {b}", "{b}: {a}");
        assert!(report.is_clean());
    }

    #[test]
    fn test_validate_plural_translation() {
        let report = TranslationValidator::validate(
            "{count, plural, one{# movie} other{# movies}}",
            "{count, plural, one{# Film} other{# Filme}}",
        );
        assert!(report.is_clean());
    }

    #[test]
    fn test_validate_malformed_translation_is_error() {
        let report = TranslationValidator::validate("Hello {name}", "Hallo {name");
        assert!(report.has_errors());
        assert!(report.errors[0].contains("not a valid message"));
    }

    #[test]
    fn test_validate_missing_argument_is_warning() {
        let report = TranslationValidator::validate("Hello {name}", "Hallo");
        assert!(!report.has_errors());
        assert!(report.has_warnings());
        assert!(report.warnings[0].contains("name"));
    }

    #[test]
    fn test_validate_added_argument_is_warning() {
        let report = TranslationValidator::validate("Hello", "Hallo {name}");
        assert!(report.has_warnings());
        assert!(report.warnings[0].contains("unknown arguments"));
    }

    #[test]
    fn test_validate_malformed_source_is_warning() {
        let report = TranslationValidator::validate("Hello {", "Hallo");
        assert!(!report.has_errors());
        assert!(report.has_warnings());
    }

    #[test]
    fn test_validation_report_default() {
        let report = ValidationReport::default();
        assert!(report.is_clean());
    }
}
