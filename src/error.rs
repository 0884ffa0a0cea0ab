//! Typed errors for content parsing and site generation

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a single post
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("no front matter block found (expected a leading +++ line)")]
    MissingFrontMatter,

    #[error("front matter opened with {delimiter} is never closed")]
    UnterminatedFrontMatter { delimiter: &'static str },

    #[error("invalid TOML front matter: {0}")]
    Toml(String),

    #[error("invalid YAML front matter: {0}")]
    Yaml(String),

    #[error("invalid JSON front matter: {0}")]
    Json(String),

    #[error("invalid date {value:?}: {reason}")]
    InvalidDate { value: String, reason: String },

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("slug {0:?} is not a single path segment")]
    InvalidSlug(String),

    #[error("unknown timezone {0:?}")]
    UnknownTimezone(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while writing the site
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{first:?} and {second:?} both render to {path}")]
    DuplicatePermalink {
        path: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{file:?} renders to {path}, which is reserved for the {page}")]
    ReservedPath {
        path: String,
        file: PathBuf,
        page: &'static str,
    },
}
