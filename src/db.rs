use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// A row of the messages table.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: i64,
    pub message: String,
    pub comment: Option<String>,
    /// JSON object mapping language code to translated pattern
    pub translations: serde_json::Map<String, serde_json::Value>,
    pub created: String,
}

#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database and make sure the messages table exists
    pub fn new(database_path: &str) -> Result<Self> {
        let conn = Connection::open(database_path)
            .context(format!("Failed to open database at {}", database_path))?;
        Self::init(conn)
    }

    /// Private in-memory database, used by tests and local tooling
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                message TEXT NOT NULL UNIQUE,
                comment TEXT,
                dyn_translations TEXT NOT NULL DEFAULT '{}',
                created TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create messages table")?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("Database connection mutex poisoned"))
    }

    /// Look up the translation of `message` for a language code.
    ///
    /// Returns `None` when the message does not exist or has no value for the
    /// language code.
    pub fn translation(&self, message: &str, language_code: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT json_extract(dyn_translations, '$.' || ?1) FROM messages WHERE message = ?2",
        )?;

        let value: Option<Option<String>> = stmt
            .query_row(params![language_code, message], |row| row.get(0))
            .optional()
            .context("Failed to query message translation")?;

        Ok(value.flatten())
    }

    /// Insert a new message pattern.
    ///
    /// Returns `(id, created)`; `created` is false when the pattern already
    /// existed, in which case the existing row's id is returned.
    pub fn insert_message(&self, message: &str, comment: Option<&str>) -> Result<(i64, bool)> {
        let conn = self.lock()?;
        let now = Utc::now().to_rfc3339();

        let inserted = conn
            .execute(
                "INSERT INTO messages (message, comment, created) VALUES (?1, ?2, ?3)
                 ON CONFLICT(message) DO NOTHING",
                params![message, comment, now],
            )
            .context("Failed to insert message")?;

        let id: i64 = conn
            .query_row(
                "SELECT id FROM messages WHERE message = ?1",
                params![message],
                |row| row.get(0),
            )
            .context("Failed to read message id")?;

        Ok((id, inserted > 0))
    }

    /// Store the translation of an existing message for a language code.
    ///
    /// Returns false when no such message exists.
    pub fn set_translation(&self, message: &str, language_code: &str, value: &str) -> Result<bool> {
        let conn = self.lock()?;
        let rows_affected = conn
            .execute(
                "UPDATE messages
                 SET dyn_translations = json_set(dyn_translations, '$.' || ?1, ?2)
                 WHERE message = ?3",
                params![language_code, value, message],
            )
            .context("Failed to store message translation")?;

        Ok(rows_affected > 0)
    }

    /// Get a full message row
    pub fn get_message(&self, message: &str) -> Result<Option<Message>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, message, comment, dyn_translations, created
             FROM messages WHERE message = ?1",
        )?;

        let row = stmt
            .query_row(params![message], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                ))
            })
            .optional()?;

        match row {
            Some((id, message, comment, raw, created)) => {
                let translations = serde_json::from_str(&raw)
                    .context(format!("Malformed translations for message {}", id))?;
                Ok(Some(Message {
                    id,
                    message,
                    comment,
                    translations,
                    created,
                }))
            }
            None => Ok(None),
        }
    }

    /// Get count of messages
    pub fn message_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ==================== Helper Functions ====================

    /// Create a temporary database for testing
    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test_messages.db");
        let db = Database::new(db_path.to_str().unwrap()).expect("Failed to create database");
        (db, temp_dir)
    }

    // ==================== Database Initialization Tests ====================

    #[test]
    fn test_database_creation() {
        let (db, _temp_dir) = create_test_db();
        assert_eq!(db.message_count().expect("Should get count"), 0);
    }

    #[test]
    fn test_database_reopening() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let path_str = db_path.to_str().unwrap();

        {
            let db = Database::new(path_str).expect("Failed to create database");
            db.insert_message("Hello", None).expect("Should insert");
        }

        {
            let db = Database::new(path_str).expect("Failed to reopen database");
            assert_eq!(db.message_count().unwrap(), 1, "Message should persist");
        }
    }

    #[test]
    fn test_invalid_database_path() {
        let result = Database::new("/non/existent/path/db.db");
        assert!(result.is_err());
    }

    // ==================== insert_message Tests ====================

    #[test]
    fn test_insert_message_creates_row() {
        let db = Database::in_memory().unwrap();
        let (id, created) = db
            .insert_message("Hello {name}", Some("Greeting on the front page"))
            .unwrap();

        assert!(created);
        assert!(id > 0);

        let message = db.get_message("Hello {name}").unwrap().unwrap();
        assert_eq!(message.id, id);
        assert_eq!(message.comment.as_deref(), Some("Greeting on the front page"));
        assert!(message.translations.is_empty());
    }

    #[test]
    fn test_insert_existing_message_is_not_an_error() {
        let db = Database::in_memory().unwrap();
        let (first_id, first_created) = db.insert_message("Hello", None).unwrap();
        let (second_id, second_created) = db.insert_message("Hello", Some("again")).unwrap();

        assert!(first_created);
        assert!(!second_created);
        assert_eq!(first_id, second_id);
        assert_eq!(db.message_count().unwrap(), 1);
        // The original row is untouched
        assert!(db.get_message("Hello").unwrap().unwrap().comment.is_none());
    }

    #[test]
    fn test_concurrent_first_insert_yields_single_row() {
        let db = Database::in_memory().unwrap();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                std::thread::spawn(move || db.insert_message("Movies", None).unwrap())
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results.iter().filter(|(_, created)| *created).count(), 1);
        assert!(results.iter().all(|(id, _)| *id == results[0].0));
        assert_eq!(db.message_count().unwrap(), 1);
    }

    // ==================== translation Tests ====================

    #[test]
    fn test_translation_missing_message() {
        let db = Database::in_memory().unwrap();
        assert_eq!(db.translation("Hello", "de").unwrap(), None);
    }

    #[test]
    fn test_translation_missing_language() {
        let db = Database::in_memory().unwrap();
        db.insert_message("Hello", None).unwrap();
        assert_eq!(db.translation("Hello", "de").unwrap(), None);
    }

    #[test]
    fn test_set_and_read_translation() {
        let db = Database::in_memory().unwrap();
        db.insert_message("Hello", None).unwrap();

        assert!(db.set_translation("Hello", "de", "Hallo").unwrap());
        assert!(db.set_translation("Hello", "fr", "Bonjour").unwrap());

        assert_eq!(db.translation("Hello", "de").unwrap().as_deref(), Some("Hallo"));
        assert_eq!(db.translation("Hello", "fr").unwrap().as_deref(), Some("Bonjour"));
        assert_eq!(db.translation("Hello", "it").unwrap(), None);

        let message = db.get_message("Hello").unwrap().unwrap();
        assert_eq!(message.translations.len(), 2);
    }

    #[test]
    fn test_set_translation_overwrites() {
        let db = Database::in_memory().unwrap();
        db.insert_message("Hello", None).unwrap();
        db.set_translation("Hello", "de", "Hallo").unwrap();
        db.set_translation("Hello", "de", "Servus").unwrap();
        assert_eq!(db.translation("Hello", "de").unwrap().as_deref(), Some("Servus"));
    }

    #[test]
    fn test_set_translation_unknown_message() {
        let db = Database::in_memory().unwrap();
        assert!(!db.set_translation("Nope", "de", "Nein").unwrap());
    }

    #[test]
    fn test_translation_preserves_icu_syntax() {
        let db = Database::in_memory().unwrap();
        let pattern = "{count, plural, one {# movie} other {# movies}}";
        db.insert_message(pattern, None).unwrap();
        db.set_translation(pattern, "de", "{count, plural, one {# Film} other {# Filme}}")
            .unwrap();

        assert_eq!(
            db.translation(pattern, "de").unwrap().as_deref(),
            Some("{count, plural, one {# Film} other {# Filme}}")
        );
    }

    #[test]
    fn test_sql_injection_prevention_message() {
        let db = Database::in_memory().unwrap();
        let malicious = "'; DROP TABLE messages; --";
        db.insert_message(malicious, None).unwrap();

        assert_eq!(db.message_count().unwrap(), 1);
        assert!(db.get_message(malicious).unwrap().is_some());
    }

    #[test]
    fn test_created_is_valid_rfc3339() {
        let db = Database::in_memory().unwrap();
        db.insert_message("Hello", None).unwrap();
        let message = db.get_message("Hello").unwrap().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&message.created).is_ok());
    }
}
