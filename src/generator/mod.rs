//! Generator module - writes the static site using the built-in templates

use anyhow::Result;
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use tera::Context;
use walkdir::WalkDir;

use crate::content::Post;
use crate::error::GenerateError;
use crate::helpers::{
    absolutize_urls, date_xml, escape_xml, format_date, full_url_for, list_tags, output_file_for,
    strip_invalid_xml_chars, url_for,
};
use crate::templates::{
    ArchiveYearData, NavPost, PaginationData, PostData, SiteData, TemplateRenderer, TermLink,
};
use crate::Site;

const TAG_DIR: &str = "tags";
const ARCHIVE_DIR: &str = "archives";
const PAGINATION_DIR: &str = "page";
const FEED_FILE: &str = "atom.xml";
const SITEMAP_FILE: &str = "sitemap.xml";

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Site) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site from posts sorted newest first
    pub fn generate(&self, posts: &[Post]) -> Result<()> {
        check_output_paths(posts, &self.reserved_outputs(posts))?;

        fs::create_dir_all(&self.site.output_dir)?;
        self.copy_static_files()?;

        let site_data = self.build_site_data();

        self.generate_index_pages(posts, &site_data)?;
        self.generate_post_pages(posts, &site_data)?;
        self.generate_archive_page(posts, &site_data)?;
        self.generate_tag_pages(posts, &site_data)?;
        self.generate_atom_feed(posts)?;
        self.generate_sitemap(posts)?;

        Ok(())
    }

    /// Output files written for listing pages, mapped to a label
    fn reserved_outputs(&self, posts: &[Post]) -> HashMap<String, &'static str> {
        let mut reserved = HashMap::new();
        reserved.insert("index.html".to_string(), "front page");
        reserved.insert(FEED_FILE.to_string(), "feed");
        reserved.insert(SITEMAP_FILE.to_string(), "sitemap");
        reserved.insert(format!("{}/index.html", ARCHIVE_DIR), "archive");

        let total_pages = posts.len().div_ceil(self.site.config.per_page.max(1));
        for page_num in 2..=total_pages {
            reserved.insert(
                format!("{}/{}/index.html", PAGINATION_DIR, page_num),
                "index pagination",
            );
        }
        for term in list_tags(posts) {
            reserved.insert(format!("{}/{}/index.html", TAG_DIR, term.slug), "tag pages");
        }

        reserved
    }

    fn build_site_data(&self) -> SiteData {
        let config = &self.site.config;
        SiteData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            language: config.language.clone(),
            base_url: config.base_url.clone(),
            root: url_for(config, ""),
            feed_url: url_for(config, FEED_FILE),
            archive_url: url_for(config, &format!("{}/", ARCHIVE_DIR)),
        }
    }

    fn post_data(&self, post: &Post) -> PostData {
        let config = &self.site.config;
        let tags = post
            .tags
            .iter()
            .map(|name| TermLink {
                name: name.clone(),
                url: url_for(config, &format!("{}/{}/", TAG_DIR, slug::slugify(name))),
                count: 0,
            })
            .collect();

        PostData {
            title: post.title.clone(),
            slug: post.slug.clone(),
            date: format_date(&post.date, "%Y-%m-%d"),
            date_iso: date_xml(&post.date),
            lastmod_iso: post.lastmod.as_ref().map(|d| date_xml(d)),
            url: url_for(config, &post.path),
            permalink: post.permalink.clone(),
            description: post.description.clone(),
            tags,
            content: post.content.clone(),
            summary: post.summary.clone(),
            truncated: post.truncated,
            draft: post.draft,
            word_count: post.word_count,
            reading_time: post.word_count.div_ceil(200).max(1),
        }
    }

    fn base_context(&self, site_data: &SiteData) -> Context {
        let mut context = Context::new();
        context.insert("site", site_data);
        context
    }

    fn write_page(&self, relative: &str, html: &str) -> Result<PathBuf> {
        let output_path = self.site.output_dir.join(relative);
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, html)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(output_path)
    }

    fn page_url(&self, page_num: usize) -> String {
        if page_num == 1 {
            url_for(&self.site.config, "")
        } else {
            url_for(
                &self.site.config,
                &format!("{}/{}/", PAGINATION_DIR, page_num),
            )
        }
    }

    /// Generate index pages (with pagination)
    fn generate_index_pages(&self, posts: &[Post], site_data: &SiteData) -> Result<()> {
        let per_page = self.site.config.per_page.max(1);
        // An empty site still gets a front page
        let total_pages = posts.len().div_ceil(per_page).max(1);

        for page_num in 1..=total_pages {
            let start = ((page_num - 1) * per_page).min(posts.len());
            let end = (start + per_page).min(posts.len());
            let page_posts: Vec<PostData> =
                posts[start..end].iter().map(|p| self.post_data(p)).collect();

            let pagination = PaginationData {
                per_page,
                total: total_pages,
                current: page_num,
                current_url: self.page_url(page_num),
                prev_link: if page_num > 1 {
                    self.page_url(page_num - 1)
                } else {
                    String::new()
                },
                next_link: if page_num < total_pages {
                    self.page_url(page_num + 1)
                } else {
                    String::new()
                },
            };

            let mut context = self.base_context(site_data);
            context.insert("page_posts", &page_posts);
            context.insert("pagination", &pagination);

            let html = self.renderer.render("index.html", &context)?;
            let relative = if page_num == 1 {
                "index.html".to_string()
            } else {
                format!("{}/{}/index.html", PAGINATION_DIR, page_num)
            };
            self.write_page(&relative, &html)?;
        }

        tracing::info!("Generated {} index page(s)", total_pages);
        Ok(())
    }

    /// Generate one page per post
    fn generate_post_pages(&self, posts: &[Post], site_data: &SiteData) -> Result<()> {
        let nav = |p: Option<&Post>| {
            p.map(|p| NavPost {
                title: p.title.clone(),
                url: url_for(&self.site.config, &p.path),
            })
        };

        for post in posts {
            let mut context = self.base_context(site_data);
            context.insert("post", &self.post_data(post));
            context.insert("prev_post", &nav(post.prev(posts)));
            context.insert("next_post", &nav(post.next(posts)));

            let html = self.renderer.render("post.html", &context)?;
            self.write_page(&output_file_for(&post.path), &html)?;
        }

        tracing::info!("Generated {} post page(s)", posts.len());
        Ok(())
    }

    /// Generate the archive page, grouped by year (newest first)
    fn generate_archive_page(&self, posts: &[Post], site_data: &SiteData) -> Result<()> {
        let mut by_year: BTreeMap<i32, Vec<PostData>> = BTreeMap::new();
        for post in posts {
            by_year
                .entry(post.date.year())
                .or_default()
                .push(self.post_data(post));
        }

        let years: Vec<ArchiveYearData> = by_year
            .into_iter()
            .rev()
            .map(|(year, posts)| ArchiveYearData { year, posts })
            .collect();

        let mut context = self.base_context(site_data);
        context.insert("years", &years);

        let html = self.renderer.render("archive.html", &context)?;
        self.write_page(&format!("{}/index.html", ARCHIVE_DIR), &html)?;
        Ok(())
    }

    /// Generate one listing page per tag
    fn generate_tag_pages(&self, posts: &[Post], site_data: &SiteData) -> Result<()> {
        let mut tagged: HashMap<String, Vec<&Post>> = HashMap::new();
        for post in posts {
            for tag in &post.tags {
                tagged.entry(slug::slugify(tag)).or_default().push(post);
            }
        }

        let tags = list_tags(posts);
        for term in &tags {
            // Tags differing only in case share a slug and a page
            let Some(tag_posts) = tagged.remove(&term.slug) else {
                continue;
            };
            let tag_posts: Vec<PostData> = tag_posts.iter().map(|p| self.post_data(p)).collect();
            let relative = format!("{}/{}/", TAG_DIR, term.slug);
            let tag = TermLink::from_term(term, url_for(&self.site.config, &relative));

            let mut context = self.base_context(site_data);
            context.insert("tag", &tag);
            context.insert("tag_posts", &tag_posts);

            let html = self.renderer.render("tag.html", &context)?;
            self.write_page(&format!("{}index.html", relative), &html)?;
        }

        tracing::info!("Generated {} tag page(s)", tags.len());
        Ok(())
    }

    /// Generate the Atom feed
    fn generate_atom_feed(&self, posts: &[Post]) -> Result<()> {
        let config = &self.site.config;
        let site_url = full_url_for(config, "");
        let updated = posts
            .iter()
            .map(|p| p.lastmod.unwrap_or(p.date))
            .max()
            .map(|d| date_xml(&d))
            .unwrap_or_else(|| date_xml(&chrono::Utc::now()));

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            full_url_for(config, FEED_FILE)
        ));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", site_url));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", site_url));
        if !config.author.is_empty() {
            feed.push_str(&format!(
                "  <author><name>{}</name></author>\n",
                escape_xml(&config.author)
            ));
        }

        for post in posts.iter().take(config.feed_limit) {
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", post.permalink));
            feed.push_str(&format!("    <id>{}</id>\n", post.permalink));
            feed.push_str(&format!("    <published>{}</published>\n", date_xml(&post.date)));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                date_xml(&post.lastmod.unwrap_or(post.date))
            ));
            for tag in &post.tags {
                feed.push_str(&format!("    <category term=\"{}\"/>\n", escape_xml(tag)));
            }
            let summary = absolutize_urls(&post.summary, &full_url_for(config, ""));
            feed.push_str(&format!(
                "    <summary type=\"html\"><![CDATA[{}]]></summary>\n",
                strip_invalid_xml_chars(&summary)
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        self.write_page(FEED_FILE, &feed)?;
        tracing::info!("Generated {}", FEED_FILE);
        Ok(())
    }

    /// Generate sitemap.xml listing the front page and every post
    fn generate_sitemap(&self, posts: &[Post]) -> Result<()> {
        let config = &self.site.config;
        let mut xml = String::new();
        xml.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');
        xml.push_str(&format!(
            "  <url><loc>{}</loc></url>\n",
            escape_xml(&full_url_for(config, ""))
        ));
        for post in posts {
            xml.push_str(&format!(
                "  <url><loc>{}</loc><lastmod>{}</lastmod></url>\n",
                escape_xml(&post.permalink),
                date_xml(&post.lastmod.unwrap_or(post.date))
            ));
        }
        xml.push_str("</urlset>\n");

        self.write_page(SITEMAP_FILE, &xml)?;
        Ok(())
    }

    /// Copy files under the static directory verbatim
    fn copy_static_files(&self) -> Result<()> {
        let static_dir = &self.site.static_dir;
        if !static_dir.is_dir() {
            return Ok(());
        }

        let mut copied = 0;
        for entry in WalkDir::new(static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let relative = path.strip_prefix(static_dir).unwrap_or(path);
            copy_file(path, &self.site.output_dir.join(relative))?;
            copied += 1;
        }

        tracing::debug!("Copied {} static file(s)", copied);
        Ok(())
    }
}

fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)?;
    Ok(())
}

/// Fail when two posts would be written to the same file, or a post would
/// replace (or sit underneath) a generated listing page
fn check_output_paths(
    posts: &[Post],
    reserved: &HashMap<String, &'static str>,
) -> Result<(), GenerateError> {
    let mut seen: HashMap<String, &Post> = HashMap::new();
    for post in posts {
        let file = output_file_for(&post.path);

        let clash = reserved.get(&file).copied().or_else(|| {
            reserved
                .iter()
                .filter(|(name, _)| !name.ends_with("index.html"))
                .find(|(name, _)| file.starts_with(&format!("{}/", name)))
                .map(|(_, page)| *page)
        });
        if let Some(page) = clash {
            return Err(GenerateError::ReservedPath {
                path: post.path.clone(),
                file: post.full_source.clone(),
                page,
            });
        }

        if let Some(first) = seen.insert(file, post) {
            return Err(GenerateError::DuplicatePermalink {
                path: post.path.clone(),
                first: first.full_source.clone(),
                second: post.full_source.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use chrono::DateTime;

    fn post(title: &str, date: &str, tags: &[&str]) -> Post {
        let date = DateTime::parse_from_rfc3339(date).unwrap();
        let mut post = Post::new(title.to_string(), date, format!("post/{}.md", title));
        post.path = format!("/post/{}/", post.slug);
        post.permalink = format!("https://example.org/post/{}/", post.slug);
        post.content = format!("<p>{} body</p>", title);
        post.summary = format!("<p>{} teaser</p>", title);
        post.tags = tags.iter().map(|t| t.to_string()).collect();
        post
    }

    fn site(dir: &Path, per_page: usize) -> Site {
        let config = SiteConfig {
            title: "Test Blog".to_string(),
            base_url: "https://example.org/".to_string(),
            per_page,
            ..Default::default()
        };
        Site::with_config(dir, config)
    }

    #[test]
    fn test_generate_site() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 2);
        fs::create_dir_all(site.static_dir.join("img")).unwrap();
        fs::write(site.static_dir.join("img/logo.svg"), "<svg/>").unwrap();

        let posts = vec![
            post("Streams", "2017-02-03T08:15:00-05:00", &["akka"]),
            post("Lenses", "2016-06-01T10:00:00+02:00", &["scala", "Akka"]),
            post("Sketches", "2016-03-14T21:43:34+01:00", &["scala"]),
        ];

        Generator::new(&site).unwrap().generate(&posts).unwrap();

        let out = &site.output_dir;
        assert!(out.join("index.html").exists());
        assert!(out.join("page/2/index.html").exists());
        assert!(!out.join("page/3/index.html").exists());
        assert!(out.join("post/streams/index.html").exists());
        assert!(out.join("archives/index.html").exists());
        assert!(out.join("tags/scala/index.html").exists());
        assert!(out.join("tags/akka/index.html").exists());
        assert!(out.join("img/logo.svg").exists());

        let index = fs::read_to_string(out.join("index.html")).unwrap();
        assert!(index.contains("Streams teaser"));
        assert!(index.contains(r#"href="/page/2/""#));
        assert!(!index.contains("Sketches teaser"));

        let post_html = fs::read_to_string(out.join("post/lenses/index.html")).unwrap();
        assert!(post_html.contains("Lenses body"));
        assert!(post_html.contains(r#"href="/post/streams/""#));
        assert!(post_html.contains(r#"href="/post/sketches/""#));

        let archive = fs::read_to_string(out.join("archives/index.html")).unwrap();
        let pos_2017 = archive.find("2017").unwrap();
        let pos_2016 = archive.find("2016").unwrap();
        assert!(pos_2017 < pos_2016);

        let akka = fs::read_to_string(out.join("tags/akka/index.html")).unwrap();
        assert!(akka.contains("Streams teaser"));
        assert!(akka.contains("Lenses teaser"));

        let feed = fs::read_to_string(out.join("atom.xml")).unwrap();
        assert_eq!(feed.matches("<entry>").count(), 3);
        assert!(feed.contains("<updated>2017-02-03T08:15:00-05:00</updated>"));

        let sitemap = fs::read_to_string(out.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("https://example.org/post/sketches/"));
    }

    #[test]
    fn test_empty_site_has_front_page() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 10);
        Generator::new(&site).unwrap().generate(&[]).unwrap();
        assert!(site.output_dir.join("index.html").exists());
        assert!(site.output_dir.join("atom.xml").exists());
    }

    #[test]
    fn test_post_cannot_replace_listing_pages() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 1);
        let generator = Generator::new(&site).unwrap();

        let older = post("Older", "2016-03-14T21:43:34+01:00", &["scala"]);
        let cases = [
            ("/", "front page"),
            ("/archives/", "archive"),
            ("/tags/scala/", "tag pages"),
            ("/page/2/", "index pagination"),
            ("/atom.xml/", "feed"),
        ];
        for (path, expected) in cases {
            let mut clash = post("Clash", "2017-02-03T08:15:00-05:00", &[]);
            clash.path = path.to_string();

            let err = generator
                .generate(&[clash, older.clone()])
                .unwrap_err()
                .downcast::<GenerateError>()
                .unwrap();
            match err {
                GenerateError::ReservedPath { page, .. } => {
                    assert_eq!(page, expected, "{}", path)
                }
                other => panic!("unexpected error for {}: {}", path, other),
            }
        }
        assert!(!site.output_dir.exists());
    }

    #[test]
    fn test_duplicate_output_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let site = site(dir.path(), 10);
        let a = post("Same", "2016-03-14T21:43:34+01:00", &[]);
        let mut b = post("Same", "2016-03-15T21:43:34+01:00", &[]);
        b.full_source = PathBuf::from("post/other.md");

        let err = Generator::new(&site)
            .unwrap()
            .generate(&[a, b])
            .unwrap_err();
        let err = err.downcast::<GenerateError>().unwrap();
        assert!(matches!(err, GenerateError::DuplicatePermalink { .. }));
        assert!(!site.output_dir.exists());
    }
}
