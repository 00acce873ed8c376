use std::collections::BTreeMap;
use std::collections::HashMap;
use thiserror::Error;

use crate::content::post::Post;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("duplicate post path `{path}` ({first} and {second})")]
    DuplicatePath {
        path: String,
        first: String,
        second: String,
    },
}

/// The site-wide post collection, newest first.
///
/// Built once per build or reload and read-only afterwards. Every
/// consumer (listing pages, tag pages, the feed) sees the same order:
/// date descending, with ties broken by permalink so repeated builds
/// of the same content produce identical output.
#[derive(Debug, Default)]
pub struct PostIndex {
    posts: Vec<Post>,
}

impl PostIndex {
    /// Sorts the posts and rejects permalink collisions. Two posts
    /// sharing a `path` would silently overwrite each other on disk,
    /// so that is an error naming both source files.
    pub fn build(mut posts: Vec<Post>) -> Result<PostIndex, IndexError> {
        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.path.cmp(&b.path)));

        let mut seen: HashMap<String, usize> = HashMap::new();
        for (i, post) in posts.iter().enumerate() {
            if let Some(&first) = seen.get(&post.path) {
                return Err(IndexError::DuplicatePath {
                    path: post.path.clone(),
                    first: posts[first].source.display().to_string(),
                    second: post.source.display().to_string(),
                });
            }
            seen.insert(post.path.clone(), i);
        }

        Ok(PostIndex { posts })
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    /// Looks a post up by its permalink.
    pub fn get(&self, path: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.path == path)
    }

    /// Posts carrying `tag`, in index order.
    pub fn with_tag<'a>(&'a self, tag: &str) -> Vec<&'a Post> {
        filter_by_tag(&self.posts, tag)
    }
}

/// Selects posts whose tag list contains `tag` exactly. Matching is
/// case-sensitive ("gaming" and "Gaming" are different tags) and the
/// input order is preserved.
pub fn filter_by_tag<'a>(posts: &'a [Post], tag: &str) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|post| post.tags.iter().any(|t| t == tag))
        .collect()
}

/// One row of the tag overview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    pub name: String,
    /// Number of posts carrying the tag.
    pub count: usize,
}

/// Every distinct tag in the index, sorted by name.
#[derive(Debug, Default)]
pub struct TagIndex {
    entries: Vec<TagEntry>,
}

impl TagIndex {
    /// Collects tags across `posts`. Tag names are distinct
    /// case-sensitively, a post listing the same tag twice counts
    /// once, and the result is sorted by name so the overview page is
    /// stable across builds.
    pub fn derive(posts: &[Post]) -> TagIndex {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for post in posts {
            let mut in_this_post: Vec<&str> = Vec::new();
            for tag in &post.tags {
                if in_this_post.contains(&tag.as_str()) {
                    continue;
                }
                in_this_post.push(tag);
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        TagIndex {
            entries: counts
                .into_iter()
                .map(|(name, count)| TagEntry {
                    name: name.to_string(),
                    count,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[TagEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
