//! Initialize a new site

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Scaffold a new site in the given directory.
pub fn run(target_dir: &Path) -> Result<()> {
    if target_dir.join("_config.yml").exists() {
        anyhow::bail!(
            "{} already contains a _config.yml",
            target_dir.display()
        );
    }

    fs::create_dir_all(target_dir)?;
    fs::create_dir_all(target_dir.join("_posts"))?;

    let config_content = r#"# Site
title: My Blog
description: ''
author: ''

# URL
url: http://example.com
baseurl: ''
permalink: /:year/:month/:day/:title/

# Build
source: .
destination: _site
theme: paper
markdown: gfm

# Listings
home_posts: 5
feed_posts: 20

# Writing
future: true
unpublished: false
excerpt_separator: '<!-- more -->'
highlight:
  enable: true
  line_number: false
  theme: base16-ocean.dark
"#;

    fs::write(target_dir.join("_config.yml"), config_content)?;

    let now = chrono::Local::now();
    let welcome_post = format!(
        r#"---
title: Welcome to Galley
date: {}
categories: meta
---

This is your first post. Edit it, delete it, or keep it around as a
reminder of how front matter looks.

<!-- more -->

## Quick start

Create a new post:

```
$ galley new "My New Post"
```

Preview the site with live reload:

```
$ galley serve
```

Build the static files into `_site/`:

```
$ galley build
```
"#,
        now.format("%Y-%m-%d %H:%M:%S")
    );

    let post_path = target_dir
        .join("_posts")
        .join(format!("{}-welcome-to-galley.md", now.format("%Y-%m-%d")));
    fs::write(&post_path, welcome_post)?;

    let index_page = r#"---
title: Home
layout: home
---

Notes on whatever I happen to be building.
"#;
    fs::write(target_dir.join("index.md"), index_page)?;

    let about_page = r#"---
title: About
layout: about
---

A few words about who writes this blog.
"#;
    fs::write(target_dir.join("about.md"), about_page)?;

    println!("Created {}", target_dir.join("_config.yml").display());
    println!("Created {}", post_path.display());
    println!("Created {}", target_dir.join("index.md").display());
    println!("Created {}", target_dir.join("about.md").display());

    Ok(())
}
