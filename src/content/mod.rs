//! Content module - handles posts, front matter, and markdown processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{FrontMatter, FrontMatterFormat};
pub use markdown::{auto_summary, split_summary, MarkdownRenderer};
pub use post::Post;
