use std::path::PathBuf;

use anyhow::{Context, Result};
use config::Config;
use serde::Deserialize;

const DEFAULT_SITE_URL: &str = "https://example.com";
const DEFAULT_SITE_NAME: &str = "Link Building Agency";
const DEFAULT_BEST_RATING: f64 = 5.0;
const DEFAULT_CONTENT_DIR: &str = "content";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub site_url: String,
    pub site_name: String,
    pub publisher: String,
    pub best_rating: f64,
    pub content_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            site_url: DEFAULT_SITE_URL.to_string(),
            site_name: DEFAULT_SITE_NAME.to_string(),
            publisher: DEFAULT_SITE_NAME.to_string(),
            best_rating: DEFAULT_BEST_RATING,
            content_dir: PathBuf::from(DEFAULT_CONTENT_DIR),
        }
    }
}

impl Settings {
    /// Defaults, then an optional `pagecheck.toml`, then `PAGECHECK_*` env vars.
    pub fn load() -> Result<Self> {
        Config::builder()
            .set_default("site_url", DEFAULT_SITE_URL)?
            .set_default("site_name", DEFAULT_SITE_NAME)?
            .set_default("publisher", DEFAULT_SITE_NAME)?
            .set_default("best_rating", DEFAULT_BEST_RATING)?
            .set_default("content_dir", DEFAULT_CONTENT_DIR)?
            .add_source(config::File::with_name("pagecheck").required(false))
            .add_source(config::Environment::with_prefix("PAGECHECK"))
            .build()
            .context("Failed to load settings")?
            .try_deserialize()
            .context("Invalid settings")
    }

    /// Absolute URL of a page id.
    pub fn page_url(&self, id: &str) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_url_joins_cleanly() {
        let s = Settings {
            site_url: "https://links.example/".into(),
            ..Settings::default()
        };
        assert_eq!(s.page_url("/reviews/acme"), "https://links.example/reviews/acme");
    }

    #[test]
    fn defaults_load_without_a_file() {
        let s = Settings::load().unwrap();
        assert!(s.best_rating > 0.0);
        assert!(!s.site_name.is_empty());
    }
}
