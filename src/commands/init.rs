//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

use super::new::DEFAULT_ARCHETYPE;
use crate::config::CONFIG_FILES;

const DEFAULT_CONFIG: &str = r#"# Site
title = "My Blog"
description = ""
author = ""
language = "en"
# IANA zone for dates written without an offset; empty means UTC
timezone = ""

# URL
base_url = "http://localhost:1313/"
permalink = "/post/:slug/"

# Directory
content_dir = "content"
posts_section = "post"
output_dir = "public"
static_dir = "static"
archetype_dir = "archetypes"
ignore_files = []

# Writing
build_drafts = false
build_future = true
summary_length = 70

# Listing
per_page = 10
feed_limit = 20

[highlight]
theme = "base16-ocean.dark"
line_number = false
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    if let Some(existing) = CONFIG_FILES
        .iter()
        .map(|name| target_dir.join(name))
        .find(|p| p.exists())
    {
        anyhow::bail!("A site already exists here: {:?}", existing);
    }

    fs::create_dir_all(target_dir.join("content/post"))?;
    fs::create_dir_all(target_dir.join("archetypes"))?;
    fs::create_dir_all(target_dir.join("static"))?;

    fs::write(target_dir.join("config.toml"), DEFAULT_CONFIG)?;
    fs::write(target_dir.join("archetypes/post.md"), DEFAULT_ARCHETYPE)?;

    tracing::info!("Initialized site in {:?}", target_dir);
    Ok(())
}
