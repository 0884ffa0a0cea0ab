//! postdeck: load, lint and render a collection of Markdown posts
//!
//! Posts are Markdown files opening with a `+++` TOML front-matter block
//! (`date`, `draft`, `title`, `slug`, ...). An optional `<!--more-->` line
//! separates the teaser from the rest of the body.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod lint;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Config file in use, if any
    pub config_path: Option<PathBuf>,
    /// Content (posts) directory
    pub content_dir: PathBuf,
    /// Output directory
    pub output_dir: PathBuf,
    /// Static files copied verbatim into the output
    pub static_dir: PathBuf,
    /// Templates for `new`
    pub archetype_dir: PathBuf,
}

impl Site {
    /// Open a site, reading `config.toml` (or `config.yaml`) when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = config::SiteConfig::locate(&base_dir);

        let config = match &config_path {
            Some(path) => {
                tracing::debug!("Loading config from {:?}", path);
                config::SiteConfig::load(path)?
            }
            None => config::SiteConfig::default(),
        };

        let mut site = Self::with_config(base_dir, config);
        site.config_path = config_path;
        Ok(site)
    }

    /// Build a site from an in-memory configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);
        let output_dir = base_dir.join(&config.output_dir);
        let static_dir = base_dir.join(&config.static_dir);
        let archetype_dir = base_dir.join(&config.archetype_dir);

        Self {
            config,
            base_dir,
            config_path: None,
            content_dir,
            output_dir,
            static_dir,
            archetype_dir,
        }
    }

    /// Directory holding the posts section
    ///
    /// Falls back to the whole content directory when the section is absent.
    pub fn posts_dir(&self) -> PathBuf {
        let section = self.content_dir.join(&self.config.posts_section);
        if section.is_dir() {
            section
        } else {
            self.content_dir.clone()
        }
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::build::run(self)
    }

    /// Lint the post collection
    pub fn check(&self) -> Result<lint::LintReport> {
        lint::Linter::new(self).check_dir()
    }

    /// Clean the output directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }

    /// Create a new post
    pub fn new_post(&self, title: &str) -> Result<PathBuf> {
        commands::new::create_post(self, title, None, true)
    }
}
