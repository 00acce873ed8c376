//! Generates the static site into the public directory.

use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tera::Context;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::SiteConfig;
use crate::content::{load_posts, MarkdownRenderer, Post, PostIndex, TagIndex};
use crate::helpers::url;
use crate::templates::{CardData, SiteContext, TagOverview, TemplateRenderer, STYLESHEET};
use crate::Folio;

/// Number of cards shown in the home page's recent-posts section.
const RECENT_POSTS: usize = 3;

/// Number of entries in the Atom feed.
const FEED_ENTRIES: usize = 20;

/// Renders every page of the site from the post index.
pub struct Generator {
    config: SiteConfig,
    content_dir: PathBuf,
    public_dir: PathBuf,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
    site: SiteContext,
}

impl Generator {
    pub fn new(folio: &Folio) -> Result<Self> {
        Ok(Self {
            config: folio.config.clone(),
            content_dir: folio.content_dir.clone(),
            public_dir: folio.public_dir.clone(),
            renderer: TemplateRenderer::new()?,
            markdown: MarkdownRenderer::new(&folio.config.highlight),
            site: SiteContext::from_config(&folio.config),
        })
    }

    fn posts_dir(&self) -> PathBuf {
        self.content_dir.join("posts")
    }

    /// Builds the whole site: loads and indexes the posts, then writes
    /// every page, the feed and the assets. Any content error aborts
    /// the build before output is written.
    pub fn generate(&self) -> Result<PostIndex> {
        let started = std::time::Instant::now();

        let posts = load_posts(&self.posts_dir())?;
        let index = PostIndex::build(posts)?;

        fs::create_dir_all(&self.public_dir)
            .with_context(|| format!("failed to create {}", self.public_dir.display()))?;

        self.write_theme_assets()?;
        self.copy_content_assets()?;

        let cards: Vec<CardData> = index
            .posts()
            .iter()
            .map(|p| CardData::from_post(&self.config, p))
            .collect();
        let rendered = self.render_post_bodies(&index)?;

        self.generate_home(&cards)?;
        self.generate_blog_listing(&cards)?;
        self.generate_post_pages(&index, &rendered)?;
        self.generate_tag_pages(&index)?;
        self.generate_contact_page()?;
        self.generate_not_found_page()?;
        self.generate_atom_feed(&index, &rendered)?;

        info!(
            "generated site with {} posts in {:?}",
            index.len(),
            started.elapsed()
        );
        Ok(index)
    }

    /// Renders every post body once, keyed by permalink.
    fn render_post_bodies(&self, index: &PostIndex) -> Result<HashMap<String, String>> {
        let mut rendered = HashMap::new();
        for post in index.posts() {
            let html = self
                .markdown
                .render(&post.content)
                .with_context(|| format!("failed to render {}", post.source.display()))?;
            rendered.insert(post.path.clone(), html);
        }
        Ok(rendered)
    }

    /// Non-empty description for a page head, falling back to the
    /// site description and finally the site title.
    fn describe<'a>(&'a self, candidates: &[&'a str]) -> &'a str {
        candidates
            .iter()
            .copied()
            .chain([self.config.description.as_str(), self.config.title.as_str()])
            .find(|s| !s.trim().is_empty())
            .unwrap_or("folio")
    }

    fn base_context(&self, title: &str, description: &str) -> Context {
        let mut context = Context::new();
        context.insert("site", &self.site);
        context.insert("title", title);
        context.insert("description", &self.describe(&[description]));
        context
    }

    fn generate_home(&self, cards: &[CardData]) -> Result<()> {
        let about_html = if self.config.about.trim().is_empty() {
            String::new()
        } else {
            self.markdown.render(&self.config.about)?
        };

        let recent = &cards[..cards.len().min(RECENT_POSTS)];
        let mut context = self.base_context("", "");
        context.insert("about", &about_html);
        context.insert("posts", recent);

        let html = self.renderer.render("home.html", &context)?;
        self.write_page("", &html)
    }

    fn generate_blog_listing(&self, cards: &[CardData]) -> Result<()> {
        let mut context = self.base_context("Blog", "");
        context.insert("posts", cards);

        let html = self.renderer.render("blog.html", &context)?;
        self.write_page("blog", &html)
    }

    fn generate_post_pages(
        &self,
        index: &PostIndex,
        rendered: &HashMap<String, String>,
    ) -> Result<()> {
        for post in index.posts() {
            let card = CardData::from_post(&self.config, post);
            let summary = post.summary();

            let mut context = self.base_context(&post.title, &summary);
            if !post.keywords.is_empty() {
                context.insert("keywords", &post.keywords.join(", "));
            }
            context.insert("post", &card);
            context.insert("content", &rendered[&post.path]);

            let html = self.renderer.render("post.html", &context)?;
            self.write_page(post.path.trim_start_matches('/'), &html)?;
            self.copy_post_assets(post)?;
        }

        info!("generated {} post pages", index.len());
        Ok(())
    }

    fn generate_tag_pages(&self, index: &PostIndex) -> Result<()> {
        let tag_index = TagIndex::derive(index.posts());

        // The overview only lists tags that get a page below, so no
        // entry links to a path that was never written.
        let overview: Vec<TagOverview> = tag_index
            .entries()
            .iter()
            .filter(|entry| safe_tag_dir(&entry.name).is_some())
            .map(|entry| {
                let meta = self.config.tag_config(&entry.name);
                TagOverview {
                    name: entry.name.clone(),
                    url: url::tag_url(&self.config, &entry.name),
                    count: entry.count,
                    color: meta.and_then(|m| m.color.clone()),
                    description: meta.and_then(|m| m.description.clone()),
                }
            })
            .collect();

        let mut context = self.base_context("Tags", "");
        context.insert("tags", &overview);
        let html = self.renderer.render("tags.html", &context)?;
        self.write_page("tags", &html)?;

        for entry in tag_index.entries() {
            let Some(dir) = safe_tag_dir(&entry.name) else {
                warn!("skipping tag page for unsafe tag name {:?}", entry.name);
                continue;
            };

            let posts: Vec<CardData> = index
                .with_tag(&entry.name)
                .into_iter()
                .map(|p| CardData::from_post(&self.config, p))
                .collect();
            let meta = self.config.tag_config(&entry.name);

            let tag_description = meta.and_then(|m| m.description.as_deref()).unwrap_or("");
            // "description" is the head's meta description, so the
            // display blurb travels under its own key.
            let mut context = self.base_context(&format!("#{}", entry.name), tag_description);
            context.insert("tag", &entry.name);
            context.insert("tag_color", &meta.and_then(|m| m.color.clone()));
            context.insert("tag_description", &meta.and_then(|m| m.description.clone()));
            context.insert("posts", &posts);

            let html = self.renderer.render("tag.html", &context)?;
            self.write_page(&format!("tags/{}", dir), &html)?;
        }

        info!("generated {} tag pages", tag_index.len());
        Ok(())
    }

    fn generate_contact_page(&self) -> Result<()> {
        let context = self.base_context("Contact", "");
        let html = self.renderer.render("contact.html", &context)?;
        self.write_page("contact", &html)
    }

    fn generate_not_found_page(&self) -> Result<()> {
        let context = self.base_context("Page not found", "Page not found");
        let html = self.renderer.render("404.html", &context)?;
        self.write_file(&self.public_dir.join("404.html"), html.as_bytes())
    }

    fn generate_atom_feed(
        &self,
        index: &PostIndex,
        rendered: &HashMap<String, String>,
    ) -> Result<()> {
        let mut feed = String::new();
        feed.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
        feed.push_str("<feed xmlns=\"http://www.w3.org/2005/Atom\">\n");
        feed.push_str(&format!(
            "  <title>{}</title>\n",
            escape_xml(&self.config.title)
        ));
        feed.push_str(&format!(
            "  <link href=\"{}\" rel=\"self\"/>\n",
            url::full_url_for(&self.config, "atom.xml")
        ));
        feed.push_str(&format!(
            "  <link href=\"{}\"/>\n",
            url::full_url_for(&self.config, "")
        ));
        feed.push_str(&format!(
            "  <updated>{}</updated>\n",
            chrono::Utc::now().to_rfc3339()
        ));
        feed.push_str(&format!(
            "  <id>{}</id>\n",
            url::full_url_for(&self.config, "")
        ));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&self.config.author)
        ));

        let base_url = self.config.url.trim_end_matches('/');
        for post in index.posts().iter().take(FEED_ENTRIES) {
            let link = url::full_url_for(&self.config, &post.path);
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", link));
            feed.push_str(&format!("    <id>{}</id>\n", link));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                post.date.to_rfc3339()
            ));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                post.date.to_rfc3339()
            ));
            feed.push_str(&format!(
                "    <summary>{}</summary>\n",
                escape_xml(&post.summary())
            ));

            let content = absolutize_urls(&rendered[&post.path], base_url);
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                strip_invalid_xml_chars(&content)
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");
        self.write_file(&self.public_dir.join("atom.xml"), feed.as_bytes())?;
        info!("generated atom.xml");
        Ok(())
    }

    fn write_theme_assets(&self) -> Result<()> {
        self.write_file(&self.public_dir.join("css/style.css"), STYLESHEET.as_bytes())
    }

    /// Copies non-markdown files under the content directory into the
    /// output, preserving their relative layout. Files next to post
    /// sources are handled per post instead.
    fn copy_content_assets(&self) -> Result<()> {
        let posts_dir = self.posts_dir();
        if !self.content_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(&self.content_dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.starts_with(&posts_dir)
                || is_markdown_file(path)
            {
                continue;
            }

            let relative = path.strip_prefix(&self.content_dir)?;
            let dest = self.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("failed to copy {}", path.display()))?;
        }

        Ok(())
    }

    /// Copies a post's sibling assets (cover images and the like) into
    /// its output directory. Only applies to the directory-per-post
    /// layout; a flat posts directory has no per-post assets.
    fn copy_post_assets(&self, post: &Post) -> Result<()> {
        let Some(dir) = post.source.parent() else {
            return Ok(());
        };
        if dir == self.posts_dir() {
            return Ok(());
        }

        let output_dir = self.public_dir.join(post.path.trim_start_matches('/'));
        for entry in WalkDir::new(dir).follow_links(true) {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || is_markdown_file(path) {
                continue;
            }

            let relative = path.strip_prefix(dir)?;
            let dest = output_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)
                .with_context(|| format!("failed to copy {}", path.display()))?;
        }

        Ok(())
    }

    /// Writes `public/<rel>/index.html`, or the site root index when
    /// `rel` is empty.
    fn write_page(&self, rel: &str, html: &str) -> Result<()> {
        let output = if rel.is_empty() {
            self.public_dir.join("index.html")
        } else {
            self.public_dir.join(rel).join("index.html")
        };
        self.write_file(&output, html.as_bytes())
    }

    fn write_file(&self, output: &Path, bytes: &[u8]) -> Result<()> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(output, bytes)
            .with_context(|| format!("failed to write {}", output.display()))?;
        debug!("generated {}", output.display());
        Ok(())
    }
}

fn is_markdown_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("md") | Some("markdown")
    )
}

/// Output directory name for a tag page. The name is used verbatim so
/// URLs keep the tag's exact casing, which rules out separators and
/// parent-directory components.
fn safe_tag_dir(tag: &str) -> Option<&str> {
    if tag.is_empty()
        || tag == "."
        || tag == ".."
        || tag.contains('/')
        || tag.contains('\\')
        || tag.contains('\0')
    {
        None
    } else {
        Some(tag)
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Rewrites site-relative `href`/`src` attributes to absolute URLs so
/// feed readers resolve them.
fn absolutize_urls(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
}

// XML 1.0 allows #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] |
// [#x10000-#x10FFFF]; anything else breaks feed parsers.
fn strip_invalid_xml_chars(s: &str) -> String {
    s.chars()
        .filter(|&c| {
            c == '\t'
                || c == '\n'
                || c == '\r'
                || ('\u{0020}'..='\u{D7FF}').contains(&c)
                || ('\u{E000}'..='\u{FFFD}').contains(&c)
                || ('\u{10000}'..='\u{10FFFF}').contains(&c)
        })
        .collect()
}
