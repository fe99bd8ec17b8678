//! Generator module - renders the whole site and writes the output tree
//!
//! A build runs in two phases. The render phase turns every content unit
//! into a `RenderedPage` in memory; only when all of them succeeded does the
//! write phase reset the output directory and put files on disk. A failing
//! build therefore never leaves a partial tree behind.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{has_front_matter, loader, ContentStore, Layout, Page, Post};
use crate::error::{Error, Result};
use crate::helpers::{date, url};
use crate::templates::{
    NavPost, PageContext, PostContext, SiteContext, TemplateRenderer, THEME_STYLESHEET,
};
use crate::Galley;

/// One output file, fully rendered but not yet written.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Site-relative route, e.g. `/2025/02/05/what-the-der/`.
    pub route: String,
    /// Output path relative to the output directory.
    pub output: PathBuf,
    /// Final bytes.
    pub html: String,
}

/// What a finished build produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStats {
    pub posts: usize,
    pub pages: usize,
    pub files_written: usize,
    pub assets_copied: usize,
}

/// Static site generator using the embedded Tera theme
pub struct Generator {
    site: Galley,
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(site: &Galley) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        Ok(Self {
            site: site.clone(),
            renderer,
        })
    }

    /// Run a full build: load content, render everything, write the output.
    pub fn build(&self) -> Result<BuildStats> {
        if self.site.output_dir == self.site.source_dir
            || self.site.output_dir == self.site.base_dir
        {
            return Err(Error::config(format!(
                "destination `{}` would overwrite the source directory",
                self.site.config.destination
            )));
        }

        let store = ContentStore::new(&self.site);
        let posts = store.load_posts()?;
        let pages = store.load_pages()?;
        tracing::debug!("loaded {} posts, {} pages", posts.len(), pages.len());

        // Render phase. Nothing below may touch the output directory.
        let rendered = self.render_site(&posts, &pages)?;
        let assets = self.collect_assets()?;

        // Write phase.
        self.reset_output_dir()?;
        let mut files_written = 0;
        for page in &rendered {
            let dest = self.site.output_dir.join(&page.output);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&dest, &page.html)?;
            files_written += 1;
            tracing::debug!("wrote {}", dest.display());
        }

        let mut assets_copied = 0;
        for relative in &assets {
            let src = self.site.source_dir.join(relative);
            let dest = self.site.output_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(&src, &dest)?;
            assets_copied += 1;
        }

        tracing::info!(
            "built {} posts, {} pages, {} files, {} assets",
            posts.len(),
            pages.len(),
            files_written,
            assets_copied
        );

        Ok(BuildStats {
            posts: posts.len(),
            pages: pages.len(),
            files_written,
            assets_copied,
        })
    }

    /// Render every page of the site in memory, in a deterministic order.
    pub fn render_site(&self, posts: &[Post], pages: &[Page]) -> Result<Vec<RenderedPage>> {
        let mut sorted = posts.to_vec();
        sorted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.source.cmp(&a.source)));

        let mut rendered = Vec::new();

        for post in &sorted {
            rendered.push(self.render_post(post, &sorted)?);
        }

        let mut have_root = false;
        for page in pages {
            if page.path == "/" {
                have_root = true;
            }
            rendered.push(match page.layout {
                Layout::Home => self.render_home(Some(page), &sorted)?,
                _ => self.render_page(page)?,
            });
        }

        // A site without an index page still gets a home listing.
        if !have_root {
            rendered.push(self.render_home(None, &sorted)?);
        }

        rendered.push(self.render_feed(&sorted));
        rendered.push(RenderedPage {
            route: "/assets/css/paper.css".to_string(),
            output: PathBuf::from("assets/css/paper.css"),
            html: THEME_STYLESHEET.to_string(),
        });

        let mut seen = HashSet::new();
        for page in &rendered {
            if !seen.insert(page.route.clone()) {
                tracing::warn!("duplicate output path {}, last rendering wins", page.route);
            }
        }

        Ok(rendered)
    }

    fn base_context(&self) -> Context {
        let mut context = Context::new();
        context.insert("site", &SiteContext::new(&self.site.config));
        context.insert("page_title", "");
        context.insert("description", "");
        context
    }

    fn render_post(&self, post: &Post, sorted: &[Post]) -> Result<RenderedPage> {
        let config = &self.site.config;
        let newer = post.prev(sorted).map(|p| NavPost::new(p, config));
        let older = post.next(sorted).map(|p| NavPost::new(p, config));

        let mut context = self.base_context();
        context.insert("post", &PostContext::new(post, config));
        context.insert("newer", &newer);
        context.insert("older", &older);
        context.insert("page_title", &post.title);
        context.insert(
            "description",
            post.excerpt.as_deref().unwrap_or_default(),
        );

        // The unit kind picks the template family; a stray page layout on
        // a post still renders as a post.
        let html = self.renderer.render(Layout::Post.template_name(), &context)?;
        Ok(RenderedPage {
            route: post.path.clone(),
            output: url::output_path(&post.path),
            html,
        })
    }

    fn render_page(&self, page: &Page) -> Result<RenderedPage> {
        let mut context = self.base_context();
        context.insert("page", &PageContext::new(page, &self.site.config));
        context.insert("page_title", &page.title);

        let template = match page.layout {
            Layout::About => Layout::About,
            // A stray post layout on a standalone page renders as a page.
            _ => Layout::Page,
        };

        let html = self.renderer.render(template.template_name(), &context)?;
        Ok(RenderedPage {
            route: page.path.clone(),
            output: url::output_path(&page.path),
            html,
        })
    }

    /// Render the home page: the index page's own content (when present)
    /// plus the latest-posts listing.
    fn render_home(&self, page: Option<&Page>, sorted: &[Post]) -> Result<RenderedPage> {
        let config = &self.site.config;

        let entries: Vec<PostContext> = sorted
            .iter()
            .take(config.home_posts)
            .map(|p| PostContext::new(p, config))
            .collect();

        let page_context = match page {
            Some(p) => PageContext::new(p, config),
            None => PageContext {
                title: config.title.clone(),
                date: None,
                url: url::url_for(&config.baseurl, "/"),
                content: String::new(),
            },
        };
        let route = page.map(|p| p.path.clone()).unwrap_or_else(|| "/".to_string());

        let mut context = self.base_context();
        context.insert("page", &page_context);
        context.insert("posts", &entries);

        let html = self.renderer.render(Layout::Home.template_name(), &context)?;
        Ok(RenderedPage {
            route: route.clone(),
            output: url::output_path(&route),
            html,
        })
    }

    /// Assemble the Atom feed.
    ///
    /// `<updated>` is the newest post date rather than the wall clock, so
    /// rebuilding unchanged content yields identical bytes.
    fn render_feed(&self, sorted: &[Post]) -> RenderedPage {
        let config = &self.site.config;
        let site_url = url::absolute_url(&config.url, &config.baseurl, "/");
        let feed_url = url::absolute_url(&config.url, &config.baseurl, "/atom.xml");

        let updated = sorted
            .first()
            .map(|p| date::rfc3339_utc(&p.date))
            // Fixed timestamp keeps empty-site builds reproducible.
            .unwrap_or_else(|| "1970-01-01T00:00:00Z".to_string());

        let mut feed = String::new();
        feed.push_str(r#"<?xml version="1.0" encoding="utf-8"?>"#);
        feed.push('\n');
        feed.push_str(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#);
        feed.push('\n');
        feed.push_str(&format!("  <title>{}</title>\n", escape_xml(&config.title)));
        feed.push_str(&format!("  <link href=\"{}\" rel=\"self\"/>\n", feed_url));
        feed.push_str(&format!("  <link href=\"{}\"/>\n", site_url));
        feed.push_str(&format!("  <updated>{}</updated>\n", updated));
        feed.push_str(&format!("  <id>{}</id>\n", site_url));
        feed.push_str(&format!(
            "  <author><name>{}</name></author>\n",
            escape_xml(&config.author)
        ));

        let base = site_url.trim_end_matches('/');
        for post in sorted.iter().take(config.feed_posts) {
            feed.push_str("  <entry>\n");
            feed.push_str(&format!("    <title>{}</title>\n", escape_xml(&post.title)));
            feed.push_str(&format!("    <link href=\"{}\"/>\n", post.permalink));
            feed.push_str(&format!("    <id>{}</id>\n", post.permalink));
            feed.push_str(&format!(
                "    <published>{}</published>\n",
                date::rfc3339_utc(&post.date)
            ));
            feed.push_str(&format!(
                "    <updated>{}</updated>\n",
                date::rfc3339_utc(&post.updated.unwrap_or(post.date))
            ));
            let content = post.excerpt.as_ref().unwrap_or(&post.content);
            let absolute = rewrite_relative_urls(content, base);
            let clean = strip_invalid_xml_chars(&absolute);
            feed.push_str(&format!(
                "    <content type=\"html\"><![CDATA[{}]]></content>\n",
                clean
            ));
            feed.push_str("  </entry>\n");
        }

        feed.push_str("</feed>\n");

        RenderedPage {
            route: "/atom.xml".to_string(),
            output: PathBuf::from("atom.xml"),
            html: feed,
        }
    }

    /// Collect source files to copy through, sorted for a stable write order.
    ///
    /// Markdown files count as assets only when they carry no front-matter
    /// block; everything else outside `_`/`.`-prefixed directories is copied
    /// byte for byte.
    fn collect_assets(&self) -> Result<Vec<PathBuf>> {
        let source_dir = &self.site.source_dir;
        let mut assets = Vec::new();

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            if path.starts_with(&self.site.output_dir) {
                continue;
            }

            let relative = match path.strip_prefix(source_dir) {
                Ok(r) => r,
                Err(_) => continue,
            };
            if loader::is_excluded(relative) {
                continue;
            }

            if loader::is_markdown_file(path) {
                let content = fs::read_to_string(path)?;
                if has_front_matter(&content) {
                    continue;
                }
            }

            assets.push(relative.to_path_buf());
        }

        assets.sort();
        Ok(assets)
    }

    /// Drop any previous output tree and start fresh.
    fn reset_output_dir(&self) -> Result<()> {
        if self.site.output_dir.exists() {
            fs::remove_dir_all(&self.site.output_dir)?;
        }
        fs::create_dir_all(&self.site.output_dir)?;
        Ok(())
    }
}

/// Escape XML special characters
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Rewrite root-relative `href`/`src` attributes to absolute URLs for feed
/// readers, which resolve nothing.
fn rewrite_relative_urls(content: &str, base_url: &str) -> String {
    content
        .replace("href=\"/", &format!("href=\"{}/", base_url))
        .replace("src=\"/", &format!("src=\"{}/", base_url))
        .replace("href='/", &format!("href='{}/", base_url))
        .replace("src='/", &format!("src='{}/", base_url))
}

/// Strip control characters XML 1.0 forbids (tab, newline, and carriage
/// return stay).
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
