//! Post model

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;
use std::path::PathBuf;

use super::markdown::split_summary;

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// URL path segment; unique among published posts
    pub slug: String,

    /// Publication date, in the offset the author wrote it in
    pub date: DateTime<FixedOffset>,

    /// Last modification date
    pub lastmod: Option<DateTime<FixedOffset>>,

    /// Unpublished posts are left out of builds unless drafts are enabled
    pub draft: bool,

    /// Raw markdown body (front matter removed)
    pub raw: String,

    /// Rendered HTML body
    pub content: String,

    /// Rendered summary (teaser, explicit summary, or leading words)
    pub summary: String,

    /// Whether the summary is shorter than the full post
    pub truncated: bool,

    pub tags: Vec<String>,
    pub categories: Vec<String>,
    pub description: Option<String>,

    /// Source file path relative to the content directory
    pub source: String,

    /// Full source file path
    pub full_source: PathBuf,

    /// Content section (first directory under the content dir)
    pub section: String,

    /// Site path, e.g. `/post/hyperloglog/`
    pub path: String,

    /// Absolute URL
    pub permalink: String,

    pub word_count: usize,

    /// Custom front-matter fields
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: DateTime<FixedOffset>, source: String) -> Self {
        let slug = slug::slugify(&title);
        Self {
            title,
            slug,
            date,
            lastmod: None,
            draft: false,
            raw: String::new(),
            content: String::new(),
            summary: String::new(),
            truncated: false,
            tags: Vec::new(),
            categories: Vec::new(),
            description: None,
            full_source: PathBuf::from(&source),
            source,
            section: String::new(),
            path: String::new(),
            permalink: String::new(),
            word_count: 0,
            extra: IndexMap::new(),
        }
    }

    pub fn is_published(&self) -> bool {
        !self.draft
    }

    /// Markdown before the teaser marker, if the body has one
    pub fn teaser(&self) -> Option<&str> {
        split_summary(&self.raw).map(|(teaser, _)| teaser.trim())
    }

    /// Get the previous (newer) post in a list sorted newest first
    pub fn prev<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.source == self.source)?;
        pos.checked_sub(1).and_then(|i| posts.get(i))
    }

    /// Get the next (older) post in a list sorted newest first
    pub fn next<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.source == self.source)?;
        posts.get(pos + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(title: &str) -> Post {
        let date = DateTime::parse_from_rfc3339("2016-03-14T21:43:34+01:00").unwrap();
        Post::new(title.to_string(), date, format!("post/{}.md", slug::slugify(title)))
    }

    #[test]
    fn test_new_derives_slug() {
        let p = post("T-Digest in Scala");
        assert_eq!(p.slug, "t-digest-in-scala");
        assert!(p.is_published());
    }

    #[test]
    fn test_teaser() {
        let mut p = post("a");
        p.raw = "Short intro.\n\n<!--more-->\n\nLong part.".to_string();
        assert_eq!(p.teaser(), Some("Short intro."));

        p.raw = "No marker".to_string();
        assert_eq!(p.teaser(), None);
    }

    #[test]
    fn test_prev_next() {
        let posts = vec![post("a"), post("b"), post("c")];
        assert!(posts[0].prev(&posts).is_none());
        assert_eq!(posts[0].next(&posts).unwrap().title, "b");
        assert_eq!(posts[2].prev(&posts).unwrap().title, "b");
        assert!(posts[2].next(&posts).is_none());
    }
}
