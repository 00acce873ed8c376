//! Initialize a new folio site.

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Creates the site skeleton: a config file, the content tree and one
/// sample post.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("content/posts"))?;

    let config_content = r##"# Folio configuration

# Site
title: Folio
description: A personal blog and portfolio
author: John Doe
keywords: [blog, portfolio]
url: http://example.com
path_prefix: /

# Shown on the home page, rendered as markdown.
about: |
  Hi, I am a developer who writes about the things I build.

# Directories
content_dir: content
public_dir: public

# Dates on post cards, Moment.js notation.
date_format: MMM Do YYYY

# Syntax highlighting
highlight:
  theme: base16-ocean.dark
  line_number: false

# Optional display metadata for tags:
# tags:
#   rust:
#     color: "#dea584"
#     description: Systems programming notes

# Where the contact form submits to. During `folio serve` a local
# handler validates submissions at this path.
contact:
  endpoint: /contact
  reset_on_success: true
"##;

    fs::write(target_dir.join("folio.yml"), config_content)?;

    let gitignore = "public/\n";
    fs::write(target_dir.join(".gitignore"), gitignore)?;

    let now = chrono::Local::now();
    let sample_post = format!(
        r#"---
title: Hello World
date: {}
path: /blog/hello-world
tags: [meta]
excerpt: The first post on this site.
---

Welcome to your new site. This post lives in `content/posts`; every
markdown file there with a front-matter block becomes a page.

## Next steps

Create a post of your own:

```bash
$ folio new "My New Post"
```

Preview the site with live reload:

```bash
$ folio serve
```

Build the deployable output into `public/`:

```bash
$ folio build
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    fs::write(
        target_dir.join("content/posts/hello-world.md"),
        sample_post,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Folio;
    use tempfile::tempdir;

    #[test]
    fn test_init_site_scaffold() {
        let dir = tempdir().unwrap();
        init_site(dir.path()).unwrap();

        assert!(dir.path().join("folio.yml").exists());
        assert!(dir.path().join("content/posts/hello-world.md").exists());

        // The scaffold must load and build cleanly.
        let folio = Folio::new(dir.path()).unwrap();
        assert_eq!(folio.config.title, "Folio");
        folio.build().unwrap();
        assert!(folio.public_dir.join("blog/hello-world/index.html").exists());
    }
}
