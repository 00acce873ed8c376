use anyhow::Result;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::content::post::Post;

fn is_markdown(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    )
}

/// Loads every markdown file under `dir`. A single unreadable or
/// invalid file fails the whole load; posts with `draft: true` are
/// skipped. The returned order is unspecified, ordering belongs to
/// [`PostIndex::build`](crate::content::index::PostIndex::build).
pub fn load_posts(dir: &Path) -> Result<Vec<Post>> {
    let mut posts = Vec::new();

    if !dir.exists() {
        info!("no posts directory at {}", dir.display());
        return Ok(posts);
    }

    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_markdown(entry.path()) {
            continue;
        }
        let post = Post::load(entry.path())?;
        if post.draft {
            debug!("skipping draft {}", entry.path().display());
            continue;
        }
        posts.push(post);
    }

    info!("loaded {} posts from {}", posts.len(), dir.display());
    Ok(posts)
}
