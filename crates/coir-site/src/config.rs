use std::path::PathBuf;
use std::time::Duration;

use crate::error::AppError;

/// Where site documents are read from.
#[derive(Debug, Clone)]
pub enum ContentLocation {
    /// Local checkout of the website's `public/` directory.
    Dir(PathBuf),
    /// Base URL of the running website.
    Url(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub location: ContentLocation,
    /// Prefix for markdown documents (`content/pages/*.md`, `content/data/*.md`).
    pub content_base: String,
    /// Prefix for JSON documents (`data/*.json`).
    pub data_base: String,
    pub refresh_interval: Duration,
}

impl Config {
    /// Required (one of):
    /// - `SITE_CONTENT_DIR`: path to the website's public directory (wins if both are set)
    /// - `SITE_CONTENT_URL`: base URL of the website
    ///
    /// Optional:
    /// - `SITE_CONTENT_BASE` (default: "content/")
    /// - `SITE_DATA_BASE` (default: "data/")
    /// - `CONTENT_REFRESH_MS` (default: 30000)
    pub fn from_env() -> Result<Self, AppError> {
        let location = match (
            std::env::var("SITE_CONTENT_DIR").ok(),
            std::env::var("SITE_CONTENT_URL").ok(),
        ) {
            (Some(dir), _) => {
                let path = PathBuf::from(&dir);
                if !path.is_dir() {
                    return Err(AppError::Config(format!(
                        "SITE_CONTENT_DIR is not a directory: {}",
                        path.display()
                    )));
                }
                ContentLocation::Dir(path)
            }
            (None, Some(url)) => ContentLocation::Url(url),
            (None, None) => {
                return Err(AppError::Config(
                    "SITE_CONTENT_DIR or SITE_CONTENT_URL environment variable is required"
                        .to_string(),
                ))
            }
        };

        let content_base = std::env::var("SITE_CONTENT_BASE")
            .map(|s| with_trailing_slash(&s))
            .unwrap_or_else(|_| "content/".to_string());
        let data_base = std::env::var("SITE_DATA_BASE")
            .map(|s| with_trailing_slash(&s))
            .unwrap_or_else(|_| "data/".to_string());

        let refresh_interval = std::env::var("CONTENT_REFRESH_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|&ms| ms > 0)
            .map(Duration::from_millis)
            .unwrap_or_else(|| Duration::from_millis(30_000));

        Ok(Self {
            location,
            content_base,
            data_base,
            refresh_interval,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            location: ContentLocation::Dir(PathBuf::from("public")),
            content_base: "content/".to_string(),
            data_base: "data/".to_string(),
            refresh_interval: Duration::from_millis(30_000),
        }
    }
}

fn with_trailing_slash(s: &str) -> String {
    let trimmed = s.trim_start_matches('/');
    if trimmed.is_empty() || trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
