//! Create a new post.

use anyhow::Result;
use std::fs;

use crate::Folio;

/// Scaffolds `content/posts/<slug>/index.md` with front-matter filled
/// in. The directory-per-post layout keeps a post's images next to its
/// markdown.
pub fn run(folio: &Folio, title: &str) -> Result<()> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);
    if slug.is_empty() {
        anyhow::bail!("Cannot derive a slug from title {:?}", title);
    }

    let post_dir = folio.content_dir.join("posts").join(&slug);
    let file_path = post_dir.join("index.md");
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    fs::create_dir_all(&post_dir)?;

    let content = format!(
        r#"---
title: {}
date: {}
path: /blog/{}
tags: []
---

"#,
        title,
        now.format("%Y-%m-%d %H:%M:%S"),
        slug
    );
    fs::write(&file_path, content)?;

    println!("Created: {:?}", file_path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_post_scaffold() {
        let dir = tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        run(&folio, "Dont Starve Together").unwrap();

        let file = dir
            .path()
            .join("content/posts/dont-starve-together/index.md");
        let content = fs::read_to_string(&file).unwrap();
        assert!(content.contains("title: Dont Starve Together"));
        assert!(content.contains("path: /blog/dont-starve-together"));
    }

    #[test]
    fn test_new_post_refuses_overwrite() {
        let dir = tempdir().unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        run(&folio, "Same Title").unwrap();
        assert!(run(&folio, "Same Title").is_err());
    }
}
