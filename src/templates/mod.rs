//! Built-in templates using the Tera template engine
//!
//! The default theme is embedded in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

use crate::helpers::{format_date, strip_html, Term};

/// Template renderer with the embedded default theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rendered post HTML is inserted as-is; templates escape titles explicitly
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("base.html", include_str!("default/base.html")),
            ("index.html", include_str!("default/index.html")),
            ("post.html", include_str!("default/post.html")),
            ("archive.html", include_str!("default/archive.html")),
            ("tag.html", include_str!("default/tag.html")),
            (
                "partials/summary.html",
                include_str!("default/partials/summary.html"),
            ),
        ])?;

        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);
        tera.register_filter("date_format", date_format_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

fn strip_html_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    Ok(Value::String(strip_html(&s)))
}

fn truncate_chars_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(v) => tera::try_get_value!("truncate_chars", "length", usize, v),
        None => 140,
    };

    if s.chars().count() <= length {
        return Ok(Value::String(s));
    }
    let truncated: String = s.chars().take(length).collect();
    Ok(Value::String(format!("{}…", truncated.trim_end())))
}

/// Reformat an RFC 3339 timestamp, `format` defaults to `%Y-%m-%d`
fn date_format_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(v) => tera::try_get_value!("date_format", "format", String, v),
        None => "%Y-%m-%d".to_string(),
    };

    let date = chrono::DateTime::parse_from_rfc3339(&s)
        .map_err(|e| tera::Error::msg(format!("date_format: invalid date {:?}: {}", s, e)))?;
    Ok(Value::String(format_date(&date, &format)))
}

/// Site-wide data
#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub author: String,
    pub language: String,
    pub base_url: String,
    /// Root path, e.g. `/` or `/blog/`
    pub root: String,
    pub feed_url: String,
    pub archive_url: String,
}

/// A link to a taxonomy term
#[derive(Debug, Clone, Serialize)]
pub struct TermLink {
    pub name: String,
    pub url: String,
    pub count: usize,
}

impl TermLink {
    pub fn from_term(term: &Term, url: String) -> Self {
        Self {
            name: term.name.clone(),
            url,
            count: term.count,
        }
    }
}

/// Post data passed to templates
#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub title: String,
    pub slug: String,
    pub date: String,
    pub date_iso: String,
    pub lastmod_iso: Option<String>,
    pub url: String,
    pub permalink: String,
    pub description: Option<String>,
    pub tags: Vec<TermLink>,
    pub content: String,
    pub summary: String,
    pub truncated: bool,
    pub draft: bool,
    pub word_count: usize,
    /// Minutes at ~200 words per minute, at least 1
    pub reading_time: usize,
}

/// Link to a neighbouring post
#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

/// Pagination data for index pages
#[derive(Debug, Clone, Serialize)]
pub struct PaginationData {
    pub per_page: usize,
    pub total: usize,
    pub current: usize,
    pub current_url: String,
    pub prev_link: String,
    pub next_link: String,
}

/// Posts published in one year
#[derive(Debug, Clone, Serialize)]
pub struct ArchiveYearData {
    pub year: i32,
    pub posts: Vec<PostData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> SiteData {
        SiteData {
            title: "Notes & Sketches".to_string(),
            description: String::new(),
            author: "Author".to_string(),
            language: "en".to_string(),
            base_url: "https://example.org".to_string(),
            root: "/".to_string(),
            feed_url: "/atom.xml".to_string(),
            archive_url: "/archives/".to_string(),
        }
    }

    fn post() -> PostData {
        PostData {
            title: "Cassandra <UDA>".to_string(),
            slug: "cassandra-uda".to_string(),
            date: "2016-03-14".to_string(),
            date_iso: "2016-03-14T21:43:34+01:00".to_string(),
            lastmod_iso: None,
            url: "/post/cassandra-uda/".to_string(),
            permalink: "https://example.org/post/cassandra-uda/".to_string(),
            description: None,
            tags: vec![TermLink {
                name: "cassandra".to_string(),
                url: "/tags/cassandra/".to_string(),
                count: 1,
            }],
            content: "<p>Aggregates.</p>".to_string(),
            summary: "<p>Aggregates.</p>".to_string(),
            truncated: false,
            draft: false,
            word_count: 1,
            reading_time: 1,
        }
    }

    #[test]
    fn test_render_post_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("post", &post());
        context.insert("prev_post", &None::<NavPost>);
        context.insert(
            "next_post",
            &Some(NavPost {
                title: "Older".to_string(),
                url: "/post/older/".to_string(),
            }),
        );

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("Cassandra &lt;UDA&gt;"));
        assert!(html.contains("<p>Aggregates.</p>"));
        assert!(html.contains(r#"href="/tags/cassandra/""#));
        assert!(html.contains(r#"href="/post/older/""#));
        assert!(html.contains("Notes &amp; Sketches"));
    }

    #[test]
    fn test_render_index_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        context.insert("site", &site());
        context.insert("page_posts", &vec![post()]);
        context.insert(
            "pagination",
            &PaginationData {
                per_page: 10,
                total: 2,
                current: 1,
                current_url: "/".to_string(),
                prev_link: String::new(),
                next_link: "/page/2/".to_string(),
            },
        );

        let html = renderer.render("index.html", &context).unwrap();
        assert!(html.contains(r#"href="/post/cassandra-uda/""#));
        assert!(html.contains(r#"href="/page/2/""#));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let mut args = HashMap::new();
        args.insert("length".to_string(), Value::from(5));
        let out = truncate_chars_filter(&Value::from("abcdefgh"), &args).unwrap();
        assert_eq!(out, Value::from("abcde…"));

        let out = truncate_chars_filter(&Value::from("abc"), &args).unwrap();
        assert_eq!(out, Value::from("abc"));
    }

    #[test]
    fn test_date_format_filter() {
        let value = Value::from("2016-03-14T21:43:34+01:00");
        let out = date_format_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(out, Value::from("2016-03-14"));

        let mut args = HashMap::new();
        args.insert("format".to_string(), Value::from("%B %-d, %Y"));
        let out = date_format_filter(&value, &args).unwrap();
        assert_eq!(out, Value::from("March 14, 2016"));

        assert!(date_format_filter(&Value::from("yesterday"), &args).is_err());
    }

    #[test]
    fn test_post_meta_description_from_summary() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = Context::new();
        let mut data = post();
        data.lastmod_iso = Some("2016-04-01T09:00:00+02:00".to_string());
        context.insert("site", &site());
        context.insert("post", &data);
        context.insert("prev_post", &None::<NavPost>);
        context.insert("next_post", &None::<NavPost>);

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains(r#"<meta name="description" content="Aggregates.">"#));
        assert!(html.contains(">2016-04-01</time>"));
    }
}
