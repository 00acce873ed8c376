//! Built-in folio theme, embedded in the binary via Tera.

use anyhow::Result;
use chrono::{DateTime, Datelike, FixedOffset, Local};
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::Post;
use crate::helpers::{date, url};

/// Stylesheet written to `public/css/style.css` on every build.
pub const STYLESHEET: &str = include_str!("folio/assets/style.css");

/// Template renderer with the embedded folio theme.
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("folio/layout.html")),
            ("home.html", include_str!("folio/home.html")),
            ("blog.html", include_str!("folio/blog.html")),
            ("post.html", include_str!("folio/post.html")),
            ("tags.html", include_str!("folio/tags.html")),
            ("tag.html", include_str!("folio/tag.html")),
            ("contact.html", include_str!("folio/contact.html")),
            ("404.html", include_str!("folio/404.html")),
            ("partials/head.html", include_str!("folio/partials/head.html")),
            (
                "partials/header.html",
                include_str!("folio/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("folio/partials/footer.html"),
            ),
            (
                "partials/post_card.html",
                include_str!("folio/partials/post_card.html"),
            ),
        ])?;

        tera.register_filter("date_format", date_format_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: format an RFC 3339 date with a Moment.js-style format.
fn date_format_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("date_format", "value", String, value);
    let format = match args.get("format") {
        Some(val) => tera::try_get_value!("date_format", "format", String, val),
        None => "MMM Do YYYY".to_string(),
    };

    let parsed: DateTime<FixedOffset> = s
        .parse()
        .map_err(|e| tera::Error::msg(format!("date_format: bad date {:?}: {}", s, e)))?;
    Ok(tera::Value::String(date::format_date(&parsed, &format)))
}

/// Tera filter: truncate by character count.
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    Ok(tera::Value::String(crate::helpers::html::truncate(
        &s, length,
    )))
}

/// Site-wide context available to every template as `site`.
#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub description: String,
    pub author: String,
    pub keywords: String,
    pub url: String,
    pub root: String,
    pub date_format: String,
    pub css_url: String,
    pub feed_url: String,
    pub contact_endpoint: String,
    pub nav: Vec<NavItem>,
    pub year: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavItem {
    pub name: String,
    pub url: String,
}

impl SiteContext {
    pub fn from_config(config: &SiteConfig) -> Self {
        let nav = [
            ("Home", ""),
            ("Blog", "blog/"),
            ("Tags", "tags/"),
            ("Contact", "contact/"),
        ]
        .into_iter()
        .map(|(name, path)| NavItem {
            name: name.to_string(),
            url: url::url_for(config, path),
        })
        .collect();

        // Every page title ends with the site title, so it must never
        // be empty.
        let title = if config.title.trim().is_empty() {
            "folio".to_string()
        } else {
            config.title.clone()
        };

        SiteContext {
            title,
            description: config.description.clone(),
            author: config.author.clone(),
            keywords: config.keywords.join(", "),
            url: config.url.clone(),
            // Always ends in `/`; templates append path segments to it.
            root: url::url_for(config, ""),
            date_format: config.date_format.clone(),
            css_url: url::url_for(config, "css/style.css"),
            feed_url: url::url_for(config, "atom.xml"),
            contact_endpoint: config.contact.endpoint.clone(),
            nav,
            year: Local::now().year(),
        }
    }
}

/// A tag chip on a card: the name exactly as written in front-matter
/// plus its listing page URL.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub url: String,
}

/// Everything a post card shows: title, permalink, publication date
/// and the hash-prefixed tag line. Dates travel as RFC 3339 and are
/// formatted in the template with the site's `date_format`.
#[derive(Debug, Clone, Serialize)]
pub struct CardData {
    pub title: String,
    pub url: String,
    pub date: String,
    pub summary: String,
    pub tags: Vec<TagRef>,
    pub cover: Option<String>,
}

impl CardData {
    pub fn from_post(config: &SiteConfig, post: &Post) -> CardData {
        CardData {
            title: post.title.clone(),
            url: url::url_for(config, &post.path),
            date: date::date_xml(&post.date),
            summary: post.summary(),
            tags: post
                .tags
                .iter()
                .map(|tag| TagRef {
                    name: tag.clone(),
                    url: url::tag_url(config, tag),
                })
                .collect(),
            cover: post.cover.clone(),
        }
    }
}

/// One row of the tag overview page, with display metadata from the
/// site config when present.
#[derive(Debug, Clone, Serialize)]
pub struct TagOverview {
    pub name: String,
    pub url: String,
    pub count: usize,
    pub color: Option<String>,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::PathBuf;

    fn sample_post() -> Post {
        Post {
            title: "Dont starve".to_string(),
            date: Local.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap(),
            path: "/blog/dont-starve".to_string(),
            tags: vec!["gaming".to_string(), "survival".to_string()],
            excerpt: Some("A survival game review".to_string()),
            cover: None,
            keywords: Vec::new(),
            draft: false,
            source: PathBuf::from("posts/dont-starve.md"),
            content: "Body".to_string(),
        }
    }

    #[test]
    fn test_card_data_from_post() {
        let config = SiteConfig::default();
        let card = CardData::from_post(&config, &sample_post());

        assert_eq!(card.title, "Dont starve");
        assert_eq!(card.url, "/blog/dont-starve");
        assert_eq!(card.summary, "A survival game review");
        assert_eq!(card.tags.len(), 2);
        assert_eq!(card.tags[0].name, "gaming");
        assert_eq!(card.tags[0].url, "/tags/gaming/");
    }

    #[test]
    fn test_card_renders_date_and_tag_line() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();

        let mut context = Context::new();
        context.insert("site", &SiteContext::from_config(&config));
        context.insert("post", &CardData::from_post(&config, &sample_post()));

        let html = renderer.render("partials/post_card.html", &context).unwrap();
        assert!(html.contains("Jan 1st 2019"), "formatted date missing: {html}");
        assert!(html.contains(r#"href="/blog/dont-starve""#));
        // URLs pass through verbatim; autoescape must not touch them.
        assert!(!html.contains("&#x2F;"), "entity-escaped slash in {html}");
        // Tokens are #-prefixed and joined by a single space.
        assert!(
            html.contains(r#">#gaming</a> <a class="tag" href="/tags/survival/">#survival</a>"#),
            "tag line missing or misjoined: {html}"
        );
    }

    #[test]
    fn test_card_escapes_markup_in_title() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();
        let mut post = sample_post();
        post.title = "Generics <T> explained".to_string();

        let mut context = Context::new();
        context.insert("site", &SiteContext::from_config(&config));
        context.insert("post", &CardData::from_post(&config, &post));

        let html = renderer.render("partials/post_card.html", &context).unwrap();
        assert!(html.contains("Generics &lt;T&gt; explained"));
        assert!(!html.contains("Generics <T>"));
    }

    #[test]
    fn test_site_title_never_empty() {
        let config = SiteConfig {
            title: "  ".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(SiteContext::from_config(&config).title, "folio");
    }

    #[test]
    fn test_site_context_nav() {
        // Both prefix spellings normalize to the same root and URLs.
        for prefix in ["/folio/", "/folio"] {
            let config = SiteConfig {
                path_prefix: prefix.to_string(),
                ..SiteConfig::default()
            };
            let site = SiteContext::from_config(&config);
            assert_eq!(site.root, "/folio/");
            let urls: Vec<&str> = site.nav.iter().map(|n| n.url.as_str()).collect();
            assert_eq!(urls, vec!["/folio/", "/folio/blog/", "/folio/tags/", "/folio/contact/"]);
        }
    }

    #[test]
    fn test_home_links_respect_path_prefix() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig {
            path_prefix: "/blog-site".to_string(),
            ..SiteConfig::default()
        };

        let mut context = Context::new();
        context.insert("site", &SiteContext::from_config(&config));
        context.insert("title", "");
        context.insert("description", "Notes");
        context.insert("about", "");
        context.insert("posts", &vec![CardData::from_post(&config, &sample_post())]);

        let html = renderer.render("home.html", &context).unwrap();
        assert!(
            html.contains(r#"<a href="/blog-site/blog/">All posts</a>"#),
            "see-all link wrong: {html}"
        );
        assert!(!html.contains("/blog-siteblog/"));
    }

    #[test]
    fn test_contact_page_reports_failure_state() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();

        let mut context = Context::new();
        context.insert("site", &SiteContext::from_config(&config));
        context.insert("title", "Contact");
        context.insert("description", "Get in touch");

        let html = renderer.render("contact.html", &context).unwrap();
        assert!(html.contains(r#"action="/contact""#), "endpoint mangled: {html}");
        // The script distinguishes a failed delivery from a rejected
        // form: both leave the status line visible.
        assert!(html.contains("result.state === 'error'"));
        assert!(html.contains("Something went wrong"));
    }

    #[test]
    fn test_blog_listing_empty_state() {
        let renderer = TemplateRenderer::new().unwrap();
        let config = SiteConfig::default();

        let mut context = Context::new();
        context.insert("site", &SiteContext::from_config(&config));
        context.insert("title", "Blog");
        context.insert("description", "All posts");
        context.insert("posts", &Vec::<CardData>::new());

        let html = renderer.render("blog.html", &context).unwrap();
        assert!(html.contains("No posts yet"));
        assert!(!html.contains("post-card"));
    }
}
