//! Translation store adapter.
//!
//! Two kinds of translations exist:
//! - **messages**: dynamic, per-pattern rows in the database, one value per
//!   language code;
//! - **catalogs**: static JSON files at `{catalog_dir}/{locale}/{context}.json`
//!   mapping source pattern to translation (route slugs and the like).
//!
//! A missing catalog file is an empty catalog, not an error.

use crate::db::Database;
use crate::i18n::{Locale, StoreError};
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// Context served by the messages table; every other context is a catalog.
pub const MESSAGES_CONTEXT: &str = "messages";

/// Source pattern -> translated pattern.
pub type Catalog = HashMap<String, String>;

/// Read access to translations.
pub trait TranslationStore: Send + Sync {
    /// Translation of a single message pattern for a language code.
    fn message(&self, pattern: &str, language_code: &str) -> Result<Option<String>, StoreError>;

    /// Whole catalog for a locale and (non-message) context.
    fn catalog(&self, locale: &Locale, context: &str) -> Result<Catalog, StoreError>;
}

/// Store backed by the messages table and a catalog directory.
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
    catalog_dir: PathBuf,
}

impl DatabaseStore {
    pub fn new(db: Database, catalog_dir: impl Into<PathBuf>) -> Self {
        Self {
            db,
            catalog_dir: catalog_dir.into(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Path of the catalog file for a locale and context.
    pub fn catalog_path(&self, locale: &Locale, context: &str) -> Result<PathBuf, StoreError> {
        catalog_path(&self.catalog_dir, locale, context)
    }
}

impl TranslationStore for DatabaseStore {
    fn message(&self, pattern: &str, language_code: &str) -> Result<Option<String>, StoreError> {
        debug!(language_code, pattern, "querying messages table");
        Ok(self.db.translation(pattern, language_code)?)
    }

    fn catalog(&self, locale: &Locale, context: &str) -> Result<Catalog, StoreError> {
        let path = self.catalog_path(locale, context)?;
        load_catalog(&path)
    }
}

/// Build `{base}/{locale}/{context}.json`, refusing contexts that would leave `base`.
pub fn catalog_path(base: &Path, locale: &Locale, context: &str) -> Result<PathBuf, StoreError> {
    let relative = Path::new(context);
    let well_formed = !context.is_empty()
        && !context.ends_with('/')
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if !well_formed || context.split('/').any(str::is_empty) {
        return Err(StoreError::InvalidContext(context.to_string()));
    }

    let mut path = base.join(locale.as_str()).join(relative).into_os_string();
    path.push(".json");
    Ok(PathBuf::from(path))
}

/// Read a JSON catalog file; a missing file yields an empty catalog.
pub fn load_catalog(path: &Path) -> Result<Catalog, StoreError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "catalog not found, using empty catalog");
            return Ok(Catalog::new());
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_str(&raw).map_err(|source| StoreError::Catalog {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn de() -> Locale {
        Locale::parse("de_AT").unwrap()
    }

    fn write_catalog(dir: &Path, locale: &str, context: &str, json: &str) {
        let path = dir.join(locale).join(format!("{context}.json"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, json).unwrap();
    }

    // ==================== catalog_path Tests ====================

    #[test]
    fn test_catalog_path_nested_context() {
        let path = catalog_path(Path::new("/srv/i18n"), &de(), "routes/singular").unwrap();
        assert_eq!(path, PathBuf::from("/srv/i18n/de_AT/routes/singular.json"));
    }

    #[test]
    fn test_catalog_path_rejects_traversal() {
        for context in [
            "../secrets",
            "routes/../../etc",
            "/etc/passwd",
            "",
            "routes/",
            "a//b",
            "./x",
        ] {
            let result = catalog_path(Path::new("/srv/i18n"), &de(), context);
            assert!(
                matches!(result, Err(StoreError::InvalidContext(_))),
                "{context:?} should be rejected"
            );
        }
    }

    // ==================== load_catalog Tests ====================

    #[test]
    fn test_load_catalog_missing_file_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let catalog = load_catalog(&temp_dir.path().join("nope.json")).unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_load_catalog_reads_mapping() {
        let temp_dir = TempDir::new().unwrap();
        write_catalog(temp_dir.path(), "de_AT", "routes/singular", r#"{"/movie": "/film"}"#);

        let path = temp_dir.path().join("de_AT/routes/singular.json");
        let catalog = load_catalog(&path).unwrap();
        assert_eq!(catalog.get("/movie").map(String::as_str), Some("/film"));
    }

    #[test]
    fn test_load_catalog_malformed_json() {
        let temp_dir = TempDir::new().unwrap();
        write_catalog(temp_dir.path(), "de_AT", "broken", "{not json");

        let result = load_catalog(&temp_dir.path().join("de_AT/broken.json"));
        assert!(matches!(result, Err(StoreError::Catalog { .. })));
    }

    #[test]
    fn test_load_catalog_directory_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("de_AT/routes.json");
        std::fs::create_dir_all(&dir).unwrap();

        let result = load_catalog(&dir);
        assert!(matches!(result, Err(StoreError::Io { .. })));
    }

    // ==================== DatabaseStore Tests ====================

    #[test]
    fn test_database_store_message_lookup() {
        let db = Database::in_memory().unwrap();
        db.insert_message("Hello", None).unwrap();
        db.set_translation("Hello", "de", "Hallo").unwrap();
        let store = DatabaseStore::new(db, "/nonexistent");

        assert_eq!(store.message("Hello", "de").unwrap().as_deref(), Some("Hallo"));
        assert_eq!(store.message("Hello", "fr").unwrap(), None);
        assert_eq!(store.message("Goodbye", "de").unwrap(), None);
    }

    #[test]
    fn test_database_store_catalog_lookup() {
        let temp_dir = TempDir::new().unwrap();
        write_catalog(
            temp_dir.path(),
            "de_AT",
            "routes/plural",
            r#"{"/movies": "/filme", "/persons": "/personen"}"#,
        );
        let store = DatabaseStore::new(Database::in_memory().unwrap(), temp_dir.path());

        let catalog = store.catalog(&de(), "routes/plural").unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog["/persons"], "/personen");

        let missing = store
            .catalog(&Locale::parse("en_US").unwrap(), "routes/plural")
            .unwrap();
        assert!(missing.is_empty());
    }
}
