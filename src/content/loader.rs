//! Content loader - loads posts from the content directory

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, Utc};
use chrono_tz::Tz;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::{auto_summary, split_summary, FrontMatter, MarkdownRenderer, Post};
use crate::error::ContentError;
use crate::helpers::{count_words, escape_html, expand_permalink, full_url_for, strip_html};
use crate::Site;

/// Outcome of loading a post collection
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Posts that made it into the build, newest first
    pub posts: Vec<Post>,
    /// Files that could not be loaded, with the reason
    pub failures: Vec<(PathBuf, String)>,
    pub skipped_drafts: usize,
    pub skipped_future: usize,
}

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    renderer: MarkdownRenderer,
    tz: Tz,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Result<Self> {
        let highlight = &site.config.highlight;
        let renderer = MarkdownRenderer::with_options(&highlight.theme, highlight.line_number);
        let tz = site.config.tz()?;
        Ok(Self { site, renderer, tz })
    }

    /// Load every post that should be built
    pub fn load_posts(&self) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        let now = Utc::now();

        for path in collect_post_files(self.site)? {
            let post = match self.load_post(&path) {
                Ok(post) => post,
                Err(e) => {
                    tracing::warn!("Failed to load post {:?}: {:#}", path, e);
                    report.failures.push((path, format!("{:#}", e)));
                    continue;
                }
            };

            if post.draft && !self.site.config.build_drafts {
                tracing::debug!("Skipping draft {}", post.source);
                report.skipped_drafts += 1;
                continue;
            }
            if post.date > now && !self.site.config.build_future {
                tracing::debug!("Skipping future post {}", post.source);
                report.skipped_future += 1;
                continue;
            }

            report.posts.push(post);
        }

        // Newest first, slug breaks ties so output is stable
        report
            .posts
            .sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));

        Ok(report)
    }

    /// Load a single post from a file
    pub fn load_post(&self, path: &Path) -> Result<Post> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        let (fm, body) = FrontMatter::parse(&content)?;

        let date = fm
            .parsed_date()?
            .ok_or(ContentError::MissingField("date"))?
            .resolve(self.tz);
        let lastmod = fm.parsed_lastmod()?.map(|d| d.resolve(self.tz));

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled")
            .to_string();

        let title = fm
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| stem.clone());

        let slug = fm.effective_slug(&stem)?;

        let relative = path.strip_prefix(&self.site.content_dir).unwrap_or(path);
        let source = relative.to_string_lossy().replace('\\', "/");
        let section = relative
            .components()
            .next()
            .filter(|_| relative.components().count() > 1)
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .unwrap_or_default();

        let content_html = self.renderer.render(body)?;
        let (summary, truncated) = self.summarize(&fm, body, &content_html)?;

        let path_in_site = self.permalink_path(&date, &slug, &section);

        let mut post = Post::new(title, date, source);
        post.slug = slug;
        post.lastmod = lastmod;
        post.draft = fm.draft;
        post.raw = body.to_string();
        post.word_count = count_words(&strip_html(&content_html));
        post.content = content_html;
        post.summary = summary;
        post.truncated = truncated;
        post.tags = fm.tags;
        post.categories = fm.categories;
        post.description = fm.description;
        post.full_source = path.to_path_buf();
        post.section = section;
        post.permalink = full_url_for(&self.site.config, &path_in_site);
        post.path = path_in_site;
        post.extra = fm.extra;

        Ok(post)
    }

    /// Pick the summary: explicit field, then teaser marker, then leading words
    fn summarize(&self, fm: &FrontMatter, body: &str, html: &str) -> Result<(String, bool)> {
        if let Some(summary) = fm.summary.as_deref().filter(|s| !s.trim().is_empty()) {
            return Ok((self.renderer.render(summary)?, true));
        }

        if let Some((teaser, _)) = split_summary(body) {
            return Ok((self.renderer.render(teaser.trim())?, true));
        }

        let (text, cut) = auto_summary(html, self.site.config.summary_length);
        Ok((format!("<p>{}</p>", escape_html(&text)), cut))
    }

    fn permalink_path(&self, date: &DateTime<FixedOffset>, slug: &str, section: &str) -> String {
        let section = if section.is_empty() {
            self.site.config.posts_section.as_str()
        } else {
            section
        };
        expand_permalink(&self.site.config.permalink, date, slug, section)
    }
}

/// All post files under the posts directory, sorted by path
///
/// Hidden entries and files matching `ignore_files` are skipped.
pub fn collect_post_files(site: &Site) -> Result<Vec<PathBuf>> {
    let posts_dir = site.posts_dir();
    if !posts_dir.exists() {
        tracing::debug!("Posts directory {:?} does not exist", posts_dir);
        return Ok(Vec::new());
    }

    let ignore = site.config.ignore_patterns();
    let mut files = Vec::new();

    let walker = WalkDir::new(&posts_dir)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.path()));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if !path.is_file() || !is_markdown_file(path) {
            continue;
        }

        let relative = path.strip_prefix(&site.content_dir).unwrap_or(path);
        if ignore.iter().any(|p| p.matches_path(relative)) {
            tracing::debug!("Ignoring {:?}", relative);
            continue;
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with('.'))
        .unwrap_or(false)
}

/// Check if a file is a markdown file
fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}
