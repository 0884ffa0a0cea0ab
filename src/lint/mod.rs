//! Content lint - checks a post collection against its invariants
//!
//! Rules run per file, except `duplicate-slug`, which needs the whole
//! collection. Bad content is reported as diagnostics, never as an error.

mod report;

pub use report::{Diagnostic, LintReport, Rule, Severity};

use anyhow::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::content::loader::collect_post_files;
use crate::content::{split_summary, FrontMatter, FrontMatterFormat};
use crate::helpers::{parse_post_date, ParsedDate};
use crate::Site;

/// Result of checking one file in isolation
#[derive(Debug, Default)]
pub struct FileCheck {
    pub diagnostics: Vec<Diagnostic>,
    /// Effective slug and draft flag, when the front matter parsed
    pub slug: Option<(String, bool)>,
}

/// Runs the lint rules over a site's posts
pub struct Linter<'a> {
    site: &'a Site,
}

impl<'a> Linter<'a> {
    pub fn new(site: &'a Site) -> Self {
        Self { site }
    }

    /// Check every post file, drafts included
    pub fn check_dir(&self) -> Result<LintReport> {
        let files = collect_post_files(self.site)?;
        let mut report = LintReport {
            files_checked: files.len(),
            diagnostics: Vec::new(),
        };

        // slug -> files using it (published posts only)
        let mut slugs: BTreeMap<String, Vec<String>> = BTreeMap::new();

        for path in &files {
            let relative = path
                .strip_prefix(&self.site.content_dir)
                .unwrap_or(path)
                .to_string_lossy()
                .replace('\\', "/");

            let content = match fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    report.diagnostics.push(Diagnostic::new(
                        relative,
                        Rule::FrontMatter,
                        format!("file could not be read: {}", e),
                    ));
                    continue;
                }
            };

            let check = check_source(&relative, &content);
            if let Some((slug, draft)) = check.slug {
                if !draft {
                    slugs.entry(slug).or_default().push(relative.clone());
                }
            }
            report.diagnostics.extend(check.diagnostics);
        }

        report.diagnostics.extend(duplicate_slugs(&slugs));
        report.diagnostics.sort_by(|a, b| {
            a.path
                .cmp(&b.path)
                .then_with(|| a.rule.cmp(&b.rule))
                .then_with(|| a.message.cmp(&b.message))
        });

        tracing::debug!(
            "Checked {} files: {} errors, {} warnings",
            report.files_checked,
            report.error_count(),
            report.warning_count()
        );

        Ok(report)
    }
}

/// Check one post held in memory
///
/// `path` is only used for labelling and the slug fallback.
pub fn check_source(path: &str, content: &str) -> FileCheck {
    let mut check = FileCheck::default();
    let mut flag = |rule: Rule, message: String| {
        check.diagnostics.push(Diagnostic::new(path, rule, message));
    };

    let (fm, body) = match FrontMatter::parse(content) {
        Ok(parsed) => parsed,
        Err(e) => {
            flag(Rule::FrontMatter, e.to_string());
            return check;
        }
    };

    if fm.format != FrontMatterFormat::Toml {
        flag(
            Rule::FrontMatterFormat,
            format!(
                "front matter is {}; posts are expected to use a +++ TOML block",
                fm.format.name()
            ),
        );
    }

    match fm.date.as_deref() {
        None => flag(Rule::Date, "missing `date`".to_string()),
        Some(raw) => match parse_post_date(raw) {
            Ok(ParsedDate::Zoned(_)) => {}
            Ok(ParsedDate::Naive(_)) => flag(
                Rule::Date,
                format!("date {:?} has no timezone offset", raw),
            ),
            Err(e) => flag(Rule::Date, e.to_string()),
        },
    }

    if let Some(raw) = fm.lastmod.as_deref() {
        if let Err(e) = parse_post_date(raw) {
            flag(Rule::Date, format!("lastmod: {}", e));
        }
    }

    if fm.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        flag(
            Rule::MissingField,
            "missing `title`; the file name will be used".to_string(),
        );
    }

    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(path);
    let slug = match fm.effective_slug(stem) {
        Ok(slug) if fm.explicit_slug().is_some() => {
            let canonical = slug::slugify(&slug);
            if canonical != slug {
                flag(
                    Rule::SlugFormat,
                    format!("slug {:?} is not URL-safe (try {:?})", slug, canonical),
                );
            }
            Some(slug)
        }
        Ok(slug) => {
            flag(
                Rule::MissingField,
                format!("missing `slug`; {:?} will be used", slug),
            );
            Some(slug)
        }
        Err(e) => {
            flag(Rule::InvalidSlug, e.to_string());
            None
        }
    };

    if let Some((teaser, _)) = split_summary(body) {
        if teaser.trim().is_empty() {
            flag(
                Rule::EmptyTeaser,
                "nothing precedes the <!--more--> marker".to_string(),
            );
        }
    }

    check.slug = slug.map(|slug| (slug, fm.draft));
    check
}

fn duplicate_slugs(slugs: &BTreeMap<String, Vec<String>>) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    for (slug, paths) in slugs.iter().filter(|(_, paths)| paths.len() > 1) {
        for path in paths {
            let others: Vec<&str> = paths
                .iter()
                .filter(|p| *p != path)
                .map(String::as_str)
                .collect();
            diagnostics.push(Diagnostic::new(
                path.as_str(),
                Rule::DuplicateSlug,
                format!("slug {:?} is also used by {}", slug, others.join(", ")),
            ));
        }
    }

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;

    const GOOD: &str = r#"+++
date = "2016-03-14T21:43:34+01:00"
draft = false
title = "HyperLogLog"
slug = "hyperloglog"
+++

Approximate distinct counts.

<!--more-->

Details.
"#;

    fn rules(check: &FileCheck) -> Vec<Rule> {
        check.diagnostics.iter().map(|d| d.rule).collect()
    }

    #[test]
    fn test_clean_post() {
        let check = check_source("post/hll.md", GOOD);
        assert!(check.diagnostics.is_empty(), "{:?}", check.diagnostics);
        assert_eq!(check.slug, Some(("hyperloglog".to_string(), false)));
    }

    #[test]
    fn test_malformed_front_matter() {
        let check = check_source("post/x.md", "+++\ntitle = \"x\"\nno closing marker\n");
        assert_eq!(rules(&check), vec![Rule::FrontMatter]);
        assert!(check.slug.is_none());

        let check = check_source("post/x.md", "Just prose.\n");
        assert_eq!(rules(&check), vec![Rule::FrontMatter]);
    }

    #[test]
    fn test_non_toml_front_matter_is_an_error() {
        let content = "---\ndate: 2016-03-14T21:43:34+01:00\ntitle: x\nslug: x\n---\nBody\n";
        let check = check_source("post/x.md", content);
        assert_eq!(rules(&check), vec![Rule::FrontMatterFormat]);
        assert_eq!(check.diagnostics[0].severity, Severity::Error);
        // Still parsed, so the slug takes part in duplicate detection
        assert_eq!(check.slug, Some(("x".to_string(), false)));

        let json = "{\"date\": \"2016-03-14T21:43:34+01:00\", \"title\": \"x\", \"slug\": \"x\"}\nBody\n";
        assert_eq!(rules(&check_source("post/x.md", json)), vec![Rule::FrontMatterFormat]);
    }

    #[test]
    fn test_unsafe_slugs_are_errors() {
        for bad in ["..", "../../../escaped", "tags/scala"] {
            let content = GOOD.replace("slug = \"hyperloglog\"", &format!("slug = {:?}", bad));
            let check = check_source("post/a.md", &content);
            assert_eq!(rules(&check), vec![Rule::InvalidSlug], "{}", bad);
            assert_eq!(check.diagnostics[0].severity, Severity::Error);
            assert!(check.slug.is_none());
        }
    }

    #[test]
    fn test_date_rules() {
        let naive = GOOD.replace("2016-03-14T21:43:34+01:00", "2016-03-14 21:43:34");
        let check = check_source("post/a.md", &naive);
        assert_eq!(rules(&check), vec![Rule::Date]);
        assert!(check.diagnostics[0].message.contains("no timezone offset"));

        let garbage = GOOD.replace("2016-03-14T21:43:34+01:00", "March the 14th");
        assert_eq!(rules(&check_source("post/a.md", &garbage)), vec![Rule::Date]);

        let missing = GOOD.replace("date = \"2016-03-14T21:43:34+01:00\"\n", "");
        assert_eq!(rules(&check_source("post/a.md", &missing)), vec![Rule::Date]);
    }

    #[test]
    fn test_toml_datetime_literal_passes() {
        let literal = GOOD.replace("\"2016-03-14T21:43:34+01:00\"", "2016-03-14T21:43:34+01:00");
        assert!(check_source("post/a.md", &literal).diagnostics.is_empty());
    }

    #[test]
    fn test_empty_teaser() {
        let content = GOOD.replace("Approximate distinct counts.", "   ");
        let check = check_source("post/a.md", &content);
        assert_eq!(rules(&check), vec![Rule::EmptyTeaser]);
    }

    #[test]
    fn test_missing_fields_and_slug_format() {
        let content = "+++\ndate = \"2016-03-14T21:43:34+01:00\"\n+++\nBody\n";
        let check = check_source("post/Variance Tutorial.md", content);
        assert_eq!(rules(&check), vec![Rule::MissingField, Rule::MissingField]);
        assert_eq!(check.slug.unwrap().0, "variance-tutorial");

        let bad_slug = GOOD.replace("slug = \"hyperloglog\"", "slug = \"Hyper LogLog\"");
        assert_eq!(rules(&check_source("post/a.md", &bad_slug)), vec![Rule::SlugFormat]);
    }

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_duplicate_slug_among_published() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "content/post/a.md", GOOD);
        write(dir.path(), "content/post/b.md", GOOD);
        write(
            dir.path(),
            "content/post/c.md",
            &GOOD.replace("draft = false", "draft = true"),
        );

        let site = Site::with_config(dir.path(), SiteConfig::default());
        let report = Linter::new(&site).check_dir().unwrap();

        assert_eq!(report.files_checked, 3);
        let dupes: Vec<_> = report
            .diagnostics
            .iter()
            .filter(|d| d.rule == Rule::DuplicateSlug)
            .collect();
        assert_eq!(dupes.len(), 2);
        assert_eq!(dupes[0].path, "post/a.md");
        assert!(dupes[0].message.contains("post/b.md"));
        assert_eq!(dupes[1].path, "post/b.md");
        assert_eq!(report.for_path("post/c.md").count(), 0);
        assert!(!report.passes(false));
    }

    #[test]
    fn test_padded_slug_matches_its_trimmed_form() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "content/post/a.md", GOOD);
        write(
            dir.path(),
            "content/post/b.md",
            &GOOD.replace("slug = \"hyperloglog\"", "slug = \"hyperloglog \""),
        );

        let site = Site::with_config(dir.path(), SiteConfig::default());
        let report = Linter::new(&site).check_dir().unwrap();
        let rules: Vec<Rule> = report.diagnostics.iter().map(|d| d.rule).collect();
        assert_eq!(rules, vec![Rule::DuplicateSlug, Rule::DuplicateSlug]);
    }

    #[test]
    fn test_draft_does_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "content/post/a.md", GOOD);
        write(
            dir.path(),
            "content/post/b.md",
            &GOOD.replace("draft = false", "draft = true"),
        );

        let site = Site::with_config(dir.path(), SiteConfig::default());
        let report = Linter::new(&site).check_dir().unwrap();
        assert!(report.diagnostics.is_empty());
        assert!(report.passes(true));
    }
}
