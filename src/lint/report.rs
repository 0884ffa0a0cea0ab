//! Lint diagnostics and reports

use serde::Serialize;
use std::fmt;

/// How serious a diagnostic is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Lint rules, each with a stable id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rule {
    /// Front matter is missing, unterminated or not valid
    FrontMatter,
    /// Front matter parses but is not a `+++` TOML block
    FrontMatterFormat,
    /// Two published posts share a slug
    DuplicateSlug,
    /// Date missing, unparsable, or without an offset
    Date,
    /// Nothing but whitespace before the teaser marker
    EmptyTeaser,
    MissingField,
    SlugFormat,
    /// Slug would not stay a single path segment
    InvalidSlug,
}

impl Rule {
    pub fn id(&self) -> &'static str {
        match self {
            Rule::FrontMatter => "front-matter",
            Rule::FrontMatterFormat => "front-matter-format",
            Rule::DuplicateSlug => "duplicate-slug",
            Rule::Date => "date",
            Rule::EmptyTeaser => "empty-teaser",
            Rule::MissingField => "missing-field",
            Rule::SlugFormat => "slug-format",
            Rule::InvalidSlug => "invalid-slug",
        }
    }

    /// Severity a rule reports at
    pub fn severity(&self) -> Severity {
        match self {
            Rule::MissingField | Rule::SlugFormat => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// One finding against one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Path relative to the content directory
    pub path: String,
    pub rule: Rule,
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn new(path: impl Into<String>, rule: Rule, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            rule,
            severity: rule.severity(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}[{}]: {}",
            self.path, self.severity, self.rule, self.message
        )
    }
}

/// Result of linting a collection
#[derive(Debug, Clone, Default, Serialize)]
pub struct LintReport {
    pub files_checked: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Whether the report passes; `strict` also fails on warnings
    pub fn passes(&self, strict: bool) -> bool {
        self.error_count() == 0 && (!strict || self.warning_count() == 0)
    }

    /// Diagnostics for one file
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Diagnostic> + 'a {
        self.diagnostics.iter().filter(move |d| d.path == path)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for diagnostic in &self.diagnostics {
            out.push_str(&diagnostic.to_string());
            out.push('\n');
        }
        out.push_str(&format!(
            "{} file(s) checked: {} error(s), {} warning(s)\n",
            self.files_checked,
            self.error_count(),
            self.warning_count()
        ));
        out
    }

    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> LintReport {
        LintReport {
            files_checked: 2,
            diagnostics: vec![
                Diagnostic::new("post/a.md", Rule::Date, "date has no timezone offset"),
                Diagnostic::new("post/b.md", Rule::SlugFormat, "slug is not URL-safe"),
            ],
        }
    }

    #[test]
    fn test_counts_and_passes() {
        let report = report();
        assert_eq!(report.error_count(), 1);
        assert_eq!(report.warning_count(), 1);
        assert!(!report.passes(false));

        let warnings_only = LintReport {
            files_checked: 1,
            diagnostics: vec![report.diagnostics[1].clone()],
        };
        assert!(warnings_only.passes(false));
        assert!(!warnings_only.passes(true));
    }

    #[test]
    fn test_render_text() {
        let text = report().render_text();
        assert!(text.contains("post/a.md: error[date]: date has no timezone offset"));
        assert!(text.contains("2 file(s) checked: 1 error(s), 1 warning(s)"));
    }

    #[test]
    fn test_render_json_uses_rule_ids() {
        let json = report().render_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["diagnostics"][0]["rule"], "date");
        assert_eq!(value["diagnostics"][1]["severity"], "warning");
        assert_eq!(value["diagnostics"][1]["rule"], "slug-format");
    }
}
