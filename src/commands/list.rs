//! List site content.

use anyhow::Result;

use crate::content::{load_posts, PostIndex, TagIndex};
use crate::Folio;

/// Lists posts or tags on stdout.
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    let posts = load_posts(&folio.content_dir.join("posts"))?;
    let index = PostIndex::build(posts)?;

    match content_type {
        "post" | "posts" => {
            println!("Posts ({}):", index.len());
            for post in index.posts() {
                println!(
                    "  {} - {} [{}]",
                    post.date.format("%Y-%m-%d"),
                    post.title,
                    post.source.display()
                );
            }
        }
        "tag" | "tags" => {
            let tags = TagIndex::derive(index.posts());
            println!("Tags ({}):", tags.len());
            for entry in tags.entries() {
                println!("  {} ({})", entry.name, entry.count);
            }
        }
        _ => {
            anyhow::bail!("Unknown type: {}. Available: post, tag", content_type);
        }
    }

    Ok(())
}
