//! Create a new post from an archetype

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::path::PathBuf;

use crate::Site;

/// Archetype used when the site has no `archetypes/post.md`
///
/// Placeholders expand to TOML values, so they are written unquoted.
pub const DEFAULT_ARCHETYPE: &str = r#"+++
date = {{ date }}
draft = {{ draft }}
title = {{ title }}
slug = {{ slug }}
+++

"#;

/// Create a new post and return its path
pub fn create_post(site: &Site, title: &str, slug: Option<&str>, draft: bool) -> Result<PathBuf> {
    let title = title.trim();
    if title.is_empty() {
        anyhow::bail!("A post needs a title");
    }

    let slug = slug
        .map(slug::slugify)
        .unwrap_or_else(|| slug::slugify(title));
    if slug.is_empty() {
        anyhow::bail!("Could not derive a slug from {:?}; pass one with --slug", title);
    }

    let target_dir = site.content_dir.join(&site.config.posts_section);
    fs::create_dir_all(&target_dir)?;

    let file_path = target_dir.join(format!("{}.md", slug));
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let archetype_path = site.archetype_dir.join("post.md");
    let archetype = if archetype_path.exists() {
        fs::read_to_string(&archetype_path)
            .with_context(|| format!("Failed to read archetype {:?}", archetype_path))?
    } else {
        DEFAULT_ARCHETYPE.to_string()
    };

    let now = Utc::now()
        .with_timezone(&site.config.tz()?)
        .fixed_offset()
        .to_rfc3339_opts(SecondsFormat::Secs, false);

    let content = archetype
        .replace("{{ date }}", &toml_string(&now))
        .replace("{{ draft }}", &draft.to_string())
        .replace("{{ title }}", &toml_string(title))
        .replace("{{ slug }}", &toml_string(&slug));

    fs::write(&file_path, content)?;
    tracing::info!("Created post {:?}", file_path);

    Ok(file_path)
}

/// Quote and escape a string as a TOML value
fn toml_string(s: &str) -> String {
    toml::Value::String(s.to_string()).to_string()
}
