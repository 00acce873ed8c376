use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::content::frontmatter::FrontMatter;
use crate::content::markdown;

/// A single blog post: validated front-matter plus the markdown body.
#[derive(Debug, Clone)]
pub struct Post {
    pub title: String,
    pub date: DateTime<Local>,
    /// Site-relative permalink, e.g. `/blog/dont-starve`.
    pub path: String,
    pub tags: Vec<String>,
    pub excerpt: Option<String>,
    pub cover: Option<String>,
    pub keywords: Vec<String>,
    pub draft: bool,
    /// The markdown file this post was loaded from.
    pub source: PathBuf,
    /// Markdown body, not yet rendered.
    pub content: String,
}

impl Post {
    /// Loads and validates a post file. Any front-matter problem is an
    /// error carrying the file name, so a bad file stops the build
    /// instead of silently publishing a half-filled page.
    pub fn load(source: &Path) -> Result<Post> {
        let text = fs::read_to_string(source)
            .with_context(|| format!("failed to read {}", source.display()))?;
        let (fm, body) = FrontMatter::parse(&text)
            .with_context(|| format!("invalid front-matter in {}", source.display()))?;

        Ok(Post {
            title: fm.title,
            date: fm.date,
            path: fm.path,
            tags: fm.tags,
            excerpt: fm.excerpt,
            cover: fm.cover,
            keywords: fm.keywords,
            draft: fm.draft,
            source: source.to_path_buf(),
            content: body.to_string(),
        })
    }

    /// Text shown on post cards: the explicit `excerpt` field, falling
    /// back to the first paragraph of the body.
    pub fn summary(&self) -> String {
        match &self.excerpt {
            Some(excerpt) => excerpt.clone(),
            None => markdown::first_paragraph_text(&self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_post(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_post() {
        let dir = tempdir().unwrap();
        let file = write_post(
            dir.path(),
            "dont-starve.md",
            "---\ntitle: Dont starve\ndate: 2019-01-01\npath: /blog/dont-starve\ntags: [gaming]\n---\nA survival game.\n",
        );
        let post = Post::load(&file).unwrap();
        assert_eq!(post.title, "Dont starve");
        assert_eq!(post.path, "/blog/dont-starve");
        assert_eq!(post.tags, vec!["gaming"]);
        assert_eq!(post.content.trim(), "A survival game.");
        assert_eq!(post.source, file);
    }

    #[test]
    fn test_load_rejects_bad_front_matter() {
        let dir = tempdir().unwrap();
        let file = write_post(dir.path(), "bad.md", "---\ntitle: No date\npath: /blog/x\n---\n");
        let err = Post::load(&file).unwrap_err();
        assert!(err.to_string().contains("bad.md"));
    }

    #[test]
    fn test_summary_prefers_excerpt() {
        let dir = tempdir().unwrap();
        let file = write_post(
            dir.path(),
            "p.md",
            "---\ntitle: T\ndate: 2020-01-01\npath: /blog/p\nexcerpt: Hand-written teaser\n---\nLong body.\n",
        );
        let post = Post::load(&file).unwrap();
        assert_eq!(post.summary(), "Hand-written teaser");
    }

    #[test]
    fn test_summary_falls_back_to_first_paragraph() {
        let dir = tempdir().unwrap();
        let file = write_post(
            dir.path(),
            "p.md",
            "---\ntitle: T\ndate: 2020-01-01\npath: /blog/p\n---\nFirst *paragraph* here.\n\nSecond paragraph.\n",
        );
        let post = Post::load(&file).unwrap();
        assert_eq!(post.summary(), "First paragraph here.");
    }
}
