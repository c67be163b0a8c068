use anyhow::{bail, Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub database_path: PathBuf,
    pub catalog_dir: PathBuf,

    // Locales
    pub locales: Vec<String>,
    pub default_locale: String,

    // Server
    pub port: u16,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let locales: Vec<String> = std::env::var("LOCALES")
            .unwrap_or_else(|_| "en_US,de_AT".to_string())
            .split(',')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        if locales.is_empty() {
            bail!("LOCALES must name at least one locale");
        }

        Ok(Self {
            // Storage
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/movlib.db".to_string())
                .into(),
            catalog_dir: std::env::var("CATALOG_DIR")
                .unwrap_or_else(|_| "translations".to_string())
                .into(),

            // Locales
            locales,
            default_locale: std::env::var("DEFAULT_LOCALE")
                .unwrap_or_else(|_| "en_US".to_string()),

            // Server
            port: match std::env::var("PORT") {
                Ok(port) => port
                    .parse()
                    .with_context(|| format!("PORT is not a valid port number: '{port}'"))?,
                Err(_) => 8080,
            },
            api_key: std::env::var("API_KEY").ok().filter(|key| !key.is_empty()),
        })
    }
}
