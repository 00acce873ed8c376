//! Content pipeline: post files on disk to an ordered, validated index.

pub mod frontmatter;
pub mod index;
pub mod loader;
pub mod markdown;
pub mod post;

pub use frontmatter::{FrontMatter, FrontMatterError};
pub use index::{filter_by_tag, IndexError, PostIndex, TagEntry, TagIndex};
pub use loader::load_posts;
pub use markdown::MarkdownRenderer;
pub use post::Post;
