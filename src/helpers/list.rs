//! Taxonomy listing helpers (tag and category counts)

use std::collections::HashMap;

use crate::content::Post;

/// A taxonomy term with the number of posts using it
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Term {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

fn count_terms<'a, F>(posts: &'a [Post], terms_of: F) -> Vec<Term>
where
    F: Fn(&'a Post) -> &'a [String],
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        for term in terms_of(post) {
            *counts.entry(term.as_str()).or_insert(0) += 1;
        }
    }

    let mut terms: Vec<Term> = counts
        .into_iter()
        .map(|(name, count)| Term {
            name: name.to_string(),
            slug: slug::slugify(name),
            count,
        })
        .collect();
    // Most used first, then alphabetical for a stable order
    terms.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    terms
}

/// Tags across `posts`, most used first
pub fn list_tags(posts: &[Post]) -> Vec<Term> {
    count_terms(posts, |p| &p.tags)
}

/// Categories across `posts`, most used first
pub fn list_categories(posts: &[Post]) -> Vec<Term> {
    count_terms(posts, |p| &p.categories)
}
