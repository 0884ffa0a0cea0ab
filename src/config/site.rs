//! Site configuration (config.toml)

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ContentError;

/// Config file names probed in order
pub const CONFIG_FILES: [&str; 3] = ["config.toml", "config.yaml", "config.yml"];

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    /// IANA zone used for dates written without an offset; empty means UTC
    pub timezone: String,

    // URL
    pub base_url: String,
    pub permalink: String,

    // Directory
    pub content_dir: String,
    pub posts_section: String,
    pub output_dir: String,
    pub static_dir: String,
    pub archetype_dir: String,
    #[serde(default)]
    pub ignore_files: Vec<String>,

    // Writing
    pub build_drafts: bool,
    pub build_future: bool,
    pub summary_length: usize,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Listing
    pub per_page: usize,
    pub feed_limit: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "My Blog".to_string(),
            description: String::new(),
            author: String::new(),
            language: "en".to_string(),
            timezone: String::new(),

            base_url: "http://localhost:1313".to_string(),
            permalink: "/post/:slug/".to_string(),

            content_dir: "content".to_string(),
            posts_section: "post".to_string(),
            output_dir: "public".to_string(),
            static_dir: "static".to_string(),
            archetype_dir: "archetypes".to_string(),
            ignore_files: Vec::new(),

            build_drafts: false,
            build_future: true,
            summary_length: 70,
            highlight: HighlightConfig::default(),

            per_page: 10,
            feed_limit: 20,
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file, picking the parser by extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;

        let config: SiteConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {:?}", path))?,
            _ => toml::from_str(&content).with_context(|| format!("Failed to parse {:?}", path))?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Find the first config file in `base_dir`
    pub fn locate(base_dir: &Path) -> Option<PathBuf> {
        CONFIG_FILES
            .iter()
            .map(|name| base_dir.join(name))
            .find(|p| p.is_file())
    }

    fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            anyhow::bail!("per_page must be greater than zero");
        }
        self.tz()?;
        for pattern in &self.ignore_files {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid ignore_files pattern {:?}", pattern))?;
        }
        Ok(())
    }

    /// Resolve the configured timezone
    pub fn tz(&self) -> Result<Tz, ContentError> {
        if self.timezone.trim().is_empty() {
            return Ok(Tz::UTC);
        }
        self.timezone
            .trim()
            .parse::<Tz>()
            .map_err(|_| ContentError::UnknownTimezone(self.timezone.clone()))
    }

    /// Compiled `ignore_files` patterns; invalid ones are dropped
    pub fn ignore_patterns(&self) -> Vec<glob::Pattern> {
        self.ignore_files
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect()
    }
}

/// Code highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}
