//! Front-matter parsing
//!
//! Posts open with a `+++` TOML block. `---` YAML and bare JSON objects are
//! accepted as well so mixed collections still load.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ContentError;
use crate::helpers::{parse_post_date, ParsedDate};

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Syntax the front-matter block was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrontMatterFormat {
    #[default]
    Toml,
    Yaml,
    Json,
}

impl FrontMatterFormat {
    pub fn name(&self) -> &'static str {
        match self {
            FrontMatterFormat::Toml => "TOML",
            FrontMatterFormat::Yaml => "YAML",
            FrontMatterFormat::Json => "JSON",
        }
    }
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub date: Option<String>,
    pub lastmod: Option<String>,
    pub draft: bool,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "string_or_vec", default)]
    pub categories: Vec<String>,
    pub description: Option<String>,
    /// Explicit summary, overriding the teaser marker
    pub summary: Option<String>,

    #[serde(skip)]
    pub format: FrontMatterFormat,

    /// Remaining keys, in file order
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, body)
    pub fn parse(content: &str) -> Result<(Self, &str), ContentError> {
        let content = content.trim_start_matches('\u{feff}').trim_start();
        let first_line = content.lines().next().unwrap_or("").trim_end();

        match first_line {
            "+++" => {
                let (block, body) = split_block(content, "+++")?;
                let fm = Self::from_toml(block)?;
                Ok((fm, body))
            }
            "---" => {
                let (block, body) = split_block(content, "---")?;
                let fm = Self::from_yaml(block)?;
                Ok((fm, body))
            }
            _ if content.starts_with('{') => Self::parse_json(content),
            _ => Err(ContentError::MissingFrontMatter),
        }
    }

    fn from_toml(block: &str) -> Result<Self, ContentError> {
        let table: toml::Table = block
            .parse()
            .map_err(|e: toml::de::Error| ContentError::Toml(e.message().to_string()))?;

        // Datetime literals become strings so every format shares one date path
        let normalized = stringify_datetimes(toml::Value::Table(table));
        let mut fm: FrontMatter = normalized
            .try_into()
            .map_err(|e: toml::de::Error| ContentError::Toml(e.message().to_string()))?;
        fm.format = FrontMatterFormat::Toml;
        Ok(fm)
    }

    fn from_yaml(block: &str) -> Result<Self, ContentError> {
        if block.trim().is_empty() {
            return Ok(FrontMatter {
                format: FrontMatterFormat::Yaml,
                ..Default::default()
            });
        }

        let mut fm: FrontMatter =
            serde_yaml::from_str(block).map_err(|e| ContentError::Yaml(e.to_string()))?;
        fm.format = FrontMatterFormat::Yaml;
        Ok(fm)
    }

    fn parse_json(content: &str) -> Result<(Self, &str), ContentError> {
        let end = json_object_end(content).ok_or(ContentError::UnterminatedFrontMatter {
            delimiter: "{",
        })?;

        let mut fm: FrontMatter = serde_json::from_str(&content[..end])
            .map_err(|e| ContentError::Json(e.to_string()))?;
        fm.format = FrontMatterFormat::Json;

        let body = content[end..].trim_start_matches(['\n', '\r']);
        Ok((fm, body))
    }

    /// Parse the `date` field, if present
    pub fn parsed_date(&self) -> Result<Option<ParsedDate>, ContentError> {
        self.date.as_deref().map(parse_post_date).transpose()
    }

    /// Parse the `lastmod` field, if present
    pub fn parsed_lastmod(&self) -> Result<Option<ParsedDate>, ContentError> {
        self.lastmod.as_deref().map(parse_post_date).transpose()
    }

    /// The trimmed `slug` field, when it is set and non-blank
    pub fn explicit_slug(&self) -> Option<&str> {
        self.slug.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Slug the post is published under, falling back to the slugified `stem`
    ///
    /// A slug must stay a single path segment: separators and dot segments
    /// are rejected.
    pub fn effective_slug(&self, stem: &str) -> Result<String, ContentError> {
        let slug = match self.explicit_slug() {
            Some(slug) => slug.to_string(),
            None => slug::slugify(stem),
        };

        if slug.is_empty() || slug == "." || slug == ".." || slug.contains(['/', '\\']) {
            return Err(ContentError::InvalidSlug(slug));
        }
        Ok(slug)
    }
}

/// Split `content` (which starts with the opening delimiter line) into the
/// block between the delimiters and the body after the closing one
fn split_block<'a>(
    content: &'a str,
    delimiter: &'static str,
) -> Result<(&'a str, &'a str), ContentError> {
    let unterminated = ContentError::UnterminatedFrontMatter { delimiter };
    let after_open = match content.find('\n') {
        Some(i) => &content[i + 1..],
        None => return Err(unterminated),
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end() == delimiter {
            let block = &after_open[..offset];
            let body = after_open[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Ok((block, body));
        }
        offset += line.len();
    }

    Err(unterminated)
}

/// Byte offset just past the closing brace of a leading JSON object
fn json_object_end(content: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in content.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

fn stringify_datetimes(value: toml::Value) -> toml::Value {
    match value {
        toml::Value::Datetime(dt) => toml::Value::String(dt.to_string()),
        toml::Value::Array(items) => {
            toml::Value::Array(items.into_iter().map(stringify_datetimes).collect())
        }
        toml::Value::Table(table) => toml::Value::Table(
            table
                .into_iter()
                .map(|(k, v)| (k, stringify_datetimes(v)))
                .collect(),
        ),
        other => other,
    }
}
