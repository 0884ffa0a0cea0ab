//! URL helper functions

use chrono::{DateTime, FixedOffset};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::config::SiteConfig;

/// Characters escaped inside a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Split `base_url` into origin ("https://example.org") and root path ("/blog/")
fn split_base_url(base_url: &str) -> (&str, String) {
    let after_scheme = base_url.find("://").map(|i| i + 3).unwrap_or(0);
    match base_url[after_scheme..].find('/') {
        Some(slash) => {
            let origin = &base_url[..after_scheme + slash];
            let root = base_url[after_scheme + slash..].trim_end_matches('/');
            (origin, format!("{}/", root))
        }
        None => (base_url, "/".to_string()),
    }
}

/// Generate a site-relative URL that honours the path part of `base_url`
///
/// # Examples
/// ```ignore
/// url_for(&config, "/css/style.css") // -> "/blog/css/style.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let (_, root) = split_base_url(&config.base_url);
    let path = path.trim_start_matches('/');
    format!("{}{}", root, path)
}

/// Generate a full URL including the domain
pub fn full_url_for(config: &SiteConfig, path: &str) -> String {
    let (origin, _) = split_base_url(&config.base_url);
    format!("{}{}", origin, url_for(config, path))
}

/// Expand a permalink pattern such as `/:year/:month/:slug/`
///
/// The slug is percent-encoded as a path segment. The result always starts
/// and ends with `/`.
pub fn expand_permalink(
    pattern: &str,
    date: &DateTime<FixedOffset>,
    slug: &str,
    section: &str,
) -> String {
    let slug = utf8_percent_encode(slug, SEGMENT).to_string();
    let section = utf8_percent_encode(section, SEGMENT).to_string();

    let expanded = pattern
        .replace(":year", &date.format("%Y").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":section", &section)
        .replace(":slug", &slug)
        .replace(":title", &slug);

    let trimmed = expanded.trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", trimmed)
    }
}

/// Output file (relative to the public dir) for a site path like `/post/a%20b/`
///
/// Segments are decoded one at a time; empty, `.` and `..` segments are
/// dropped so the result never leaves the output directory.
pub fn output_file_for(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(|seg| percent_decode_str(seg).decode_utf8_lossy().into_owned())
        .filter(|seg| {
            !seg.is_empty() && seg != "." && seg != ".." && !seg.contains(['/', '\\'])
        })
        .collect();

    if segments.is_empty() {
        "index.html".to_string()
    } else {
        format!("{}/index.html", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SiteConfig {
        SiteConfig {
            base_url: "https://example.com/blog/".to_string(),
            ..Default::default()
        }
    }

    fn date() -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339("2016-03-04T21:43:34+01:00").unwrap()
    }

    #[test]
    fn test_url_for() {
        let config = test_config();
        assert_eq!(url_for(&config, "/css/style.css"), "/blog/css/style.css");
        assert_eq!(url_for(&config, "about/"), "/blog/about/");
        assert_eq!(url_for(&config, ""), "/blog/");
    }

    #[test]
    fn test_url_for_without_subpath() {
        let config = SiteConfig {
            base_url: "https://example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(url_for(&config, "/post/x/"), "/post/x/");
        assert_eq!(full_url_for(&config, "/post/x/"), "https://example.com/post/x/");
    }

    #[test]
    fn test_full_url_for() {
        let config = test_config();
        assert_eq!(
            full_url_for(&config, "/about/"),
            "https://example.com/blog/about/"
        );
    }

    #[test]
    fn test_expand_permalink() {
        assert_eq!(
            expand_permalink("/:year/:month/:slug/", &date(), "hyperloglog", "post"),
            "/2016/03/hyperloglog/"
        );
        assert_eq!(
            expand_permalink(":section/:slug", &date(), "t-digest", "post"),
            "/post/t-digest/"
        );
    }

    #[test]
    fn test_expand_permalink_encodes_slug() {
        let path = expand_permalink("/post/:slug/", &date(), "a b/c", "post");
        assert_eq!(path, "/post/a%20b%2Fc/");
    }

    #[test]
    fn test_output_file_for() {
        assert_eq!(output_file_for("/"), "index.html");
        assert_eq!(output_file_for("/post/x/"), "post/x/index.html");
        assert_eq!(output_file_for("/post/caf%C3%A9/"), "post/café/index.html");
    }

    #[test]
    fn test_output_file_for_stays_inside_output_dir() {
        let path = expand_permalink("/post/:slug/", &date(), "../../../escaped", "post");
        assert_eq!(output_file_for(&path), "post/index.html");
        assert_eq!(output_file_for("/post/../../x/"), "post/x/index.html");
        assert_eq!(output_file_for("/%2E%2E/"), "index.html");
        assert_eq!(output_file_for("/a%2Fb/"), "index.html");
    }
}
