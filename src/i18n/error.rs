//! Error taxonomy for translation resolution.
//!
//! Caller-contract violations (`InvalidLocale`, `InvalidArgument`, `Logic`)
//! are returned as-is. Everything that goes wrong while resolving a pattern
//! (store access, formatting) is wrapped into [`I18nError::Translation`],
//! which carries the original pattern for diagnostics.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the translation resolution service.
#[derive(Debug, Error)]
pub enum I18nError {
    /// Requested locale or language code is not in the supported set.
    #[error("invalid locale: '{0}'")]
    InvalidLocale(String),

    /// Caller passed an argument it must not pass (e.g. a reserved key).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Caller asked for something that has no meaningful answer.
    #[error("logic error: {0}")]
    Logic(String),

    /// Resolving `pattern` failed in the store or the formatter.
    #[error("failed to translate '{pattern}': {source}")]
    Translation {
        pattern: String,
        #[source]
        source: TranslationCause,
    },
}

impl I18nError {
    /// Wrap a store or format failure for `pattern`.
    pub fn translation(pattern: &str, source: impl Into<TranslationCause>) -> Self {
        I18nError::Translation {
            pattern: pattern.to_string(),
            source: source.into(),
        }
    }
}

/// Underlying cause of an [`I18nError::Translation`].
#[derive(Debug, Error)]
pub enum TranslationCause {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Format(#[from] FormatError),
}

/// Failure while reading translations from the database or catalog files.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database query failed: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to read catalog {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog {}: {source}", path.display())]
    Catalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid translation context: '{0}'")]
    InvalidContext(String),
}

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        StoreError::Database(err.into())
    }
}

/// Malformed message pattern or argument mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("syntax error at {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("missing argument '{0}'")]
    MissingArgument(String),

    #[error("argument '{0}' is not a number")]
    NotANumber(String),

    #[error("{0} argument is missing the required 'other' branch")]
    MissingOther(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_translation_error_carries_pattern_and_source() {
        let err =
            I18nError::translation("Hello {name}", FormatError::MissingArgument("name".into()));

        match &err {
            I18nError::Translation { pattern, source } => {
                assert_eq!(pattern, "Hello {name}");
                assert!(matches!(source, TranslationCause::Format(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Hello {name}"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_store_error_from_anyhow_keeps_message() {
        let err: StoreError = anyhow::anyhow!("disk on fire").into();
        assert!(err.to_string().contains("disk on fire"));
    }

    #[test]
    fn test_invalid_locale_display() {
        let err = I18nError::InvalidLocale("xx_XX".into());
        assert_eq!(err.to_string(), "invalid locale: 'xx_XX'");
    }
}
