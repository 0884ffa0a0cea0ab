//! List site content

use anyhow::Result;

use crate::content::loader::ContentLoader;
use crate::content::Post;
use crate::helpers::{format_date, list_categories, list_tags};
use crate::Site;

/// Render the listing for a content type
pub fn render(site: &Site, content_type: &str) -> Result<String> {
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = load(site, site.config.build_drafts)?;
            out.push_str(&format!("Posts ({}):\n", posts.len()));
            for post in &posts {
                out.push_str(&format!(
                    "  {} - {}{} [{}]\n",
                    format_date(&post.date, "%Y-%m-%d"),
                    post.title,
                    if post.draft { " (draft)" } else { "" },
                    post.source
                ));
            }
        }
        "draft" | "drafts" => {
            let drafts: Vec<Post> = load(site, true)?.into_iter().filter(|p| p.draft).collect();
            out.push_str(&format!("Drafts ({}):\n", drafts.len()));
            for post in &drafts {
                out.push_str(&format!("  {} [{}]\n", post.title, post.source));
            }
        }
        "slug" | "slugs" => {
            let posts = load(site, site.config.build_drafts)?;
            out.push_str(&format!("Slugs ({}):\n", posts.len()));
            for post in &posts {
                out.push_str(&format!("  {} -> {}\n", post.slug, post.path));
            }
        }
        "tag" | "tags" => {
            let tags = list_tags(&load(site, site.config.build_drafts)?);
            out.push_str(&format!("Tags ({}):\n", tags.len()));
            for tag in tags {
                out.push_str(&format!("  {} ({})\n", tag.name, tag.count));
            }
        }
        "category" | "categories" => {
            let categories = list_categories(&load(site, site.config.build_drafts)?);
            out.push_str(&format!("Categories ({}):\n", categories.len()));
            for cat in categories {
                out.push_str(&format!("  {} ({})\n", cat.name, cat.count));
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: post, draft, slug, tag, category",
                content_type
            );
        }
    }

    Ok(out)
}

/// List site content by type
pub fn run(site: &Site, content_type: &str) -> Result<()> {
    print!("{}", render(site, content_type)?);
    Ok(())
}

fn load(site: &Site, include_drafts: bool) -> Result<Vec<Post>> {
    let mut site = site.clone();
    site.config.build_drafts = include_drafts;
    Ok(ContentLoader::new(&site)?.load_posts()?.posts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;

    fn site_with_posts() -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        let posts = site.content_dir.join("post");
        fs::create_dir_all(&posts).unwrap();
        fs::write(
            posts.join("hll.md"),
            "+++\ndate = \"2016-03-14T21:43:34+01:00\"\ntitle = \"HLL\"\nslug = \"hll\"\ntags = [\"scala\", \"sketches\"]\n+++\nBody\n",
        )
        .unwrap();
        fs::write(
            posts.join("wip.md"),
            "+++\ndate = \"2016-04-01T10:00:00+02:00\"\ndraft = true\ntitle = \"WIP\"\nslug = \"wip\"\ntags = \"scala\"\n+++\nBody\n",
        )
        .unwrap();
        (dir, site)
    }

    #[test]
    fn test_list_posts_and_drafts() {
        let (_dir, site) = site_with_posts();

        let posts = render(&site, "post").unwrap();
        assert!(posts.starts_with("Posts (1):"));
        assert!(posts.contains("2016-03-14 - HLL [post/hll.md]"));

        let drafts = render(&site, "drafts").unwrap();
        assert!(drafts.starts_with("Drafts (1):"));
        assert!(drafts.contains("WIP [post/wip.md]"));
    }

    #[test]
    fn test_list_slugs_and_tags() {
        let (_dir, site) = site_with_posts();

        let slugs = render(&site, "slug").unwrap();
        assert!(slugs.contains("hll -> /post/hll/"));

        let tags = render(&site, "tag").unwrap();
        assert!(tags.contains("scala (1)"));
        assert!(tags.contains("sketches (1)"));
    }

    #[test]
    fn test_unknown_type() {
        let (_dir, site) = site_with_posts();
        assert!(render(&site, "route").is_err());
    }
}
