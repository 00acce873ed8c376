//! Site configuration (folio.yml)

use anyhow::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Text for the About section on the home page
    pub about: String,

    // URL
    pub url: String,
    /// Prefix prepended to every generated path ("/" for none)
    pub path_prefix: String,

    // Directory
    pub content_dir: String,
    pub public_dir: String,

    // Display
    /// Moment-style format used for dates on post cards
    pub date_format: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    /// Display metadata for tags, keyed by exact tag name.
    /// Insertion order is preserved so the tags page follows the config.
    #[serde(default)]
    pub tags: IndexMap<String, TagConfig>,

    // Contact form
    #[serde(default)]
    pub contact: ContactConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            description: "A personal blog and portfolio".to_string(),
            author: "John Doe".to_string(),
            keywords: Vec::new(),
            about: String::new(),

            url: "http://example.com".to_string(),
            path_prefix: "/".to_string(),

            content_dir: "content".to_string(),
            public_dir: "public".to_string(),

            date_format: "MMM Do YYYY".to_string(),
            highlight: HighlightConfig::default(),

            tags: IndexMap::new(),
            contact: ContactConfig::default(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: SiteConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Display metadata for a tag, if configured
    pub fn tag_config(&self, name: &str) -> Option<&TagConfig> {
        self.tags.get(name)
    }
}

/// Display metadata for a single tag
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagConfig {
    /// CSS color used for the tag on listing pages
    pub color: Option<String>,
    pub description: Option<String>,
}

/// Syntax highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub theme: String,
    pub line_number: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            theme: "base16-ocean.dark".to_string(),
            line_number: false,
        }
    }
}

/// Contact form configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Endpoint the rendered form posts to
    pub endpoint: String,
    /// Whether field values are cleared after a successful submission
    pub reset_on_success: bool,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            endpoint: "/contact".to_string(),
            reset_on_success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "Folio");
        assert_eq!(config.path_prefix, "/");
        assert_eq!(config.date_format, "MMM Do YYYY");
        assert!(config.contact.reset_on_success);
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
author: Test User
url: https://blog.example.com
path_prefix: /blog-site
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.author, "Test User");
        assert_eq!(config.url, "https://blog.example.com");
        assert_eq!(config.path_prefix, "/blog-site");
    }

    #[test]
    fn test_parse_tag_metadata() {
        let yaml = r##"
title: My Blog
tags:
  react:
    color: "#61dafb"
    description: Components and hooks
  rust:
    color: "#dea584"
"##;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tags.len(), 2);

        let react = config.tag_config("react").unwrap();
        assert_eq!(react.color.as_deref(), Some("#61dafb"));
        assert_eq!(react.description.as_deref(), Some("Components and hooks"));

        // Order follows the config file
        let names: Vec<_> = config.tags.keys().cloned().collect();
        assert_eq!(names, vec!["react", "rust"]);

        assert!(config.tag_config("missing").is_none());
    }

    #[test]
    fn test_parse_contact_policy() {
        let yaml = r#"
contact:
  endpoint: https://api.example.com/mail
  reset_on_success: false
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.contact.endpoint, "https://api.example.com/mail");
        assert!(!config.contact.reset_on_success);
    }
}
