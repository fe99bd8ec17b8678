//! Content store - loads posts and pages from the source directory

use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use super::{has_front_matter, FrontMatter, Layout, MarkdownRenderer, Page, Post};
use crate::error::{Error, Result};
use crate::helpers::url;
use crate::Galley;

/// Read-only view over the source tree. Each build constructs a fresh store.
pub struct ContentStore<'a> {
    site: &'a Galley,
    renderer: MarkdownRenderer,
}

impl<'a> ContentStore<'a> {
    /// Create a new content store
    pub fn new(site: &'a Galley) -> Self {
        let renderer = MarkdownRenderer::from_config(&site.config);
        Self { site, renderer }
    }

    /// Load all posts from `<source>/_posts`, sorted by date descending.
    ///
    /// Ties are broken by source path (descending) so the ordering is total:
    /// two runs over the same tree always agree.
    pub fn load_posts(&self) -> Result<Vec<Post>> {
        let posts_dir = self.site.source_dir.join("_posts");
        if !posts_dir.exists() {
            return Ok(Vec::new());
        }

        let mut posts = Vec::new();

        for entry in WalkDir::new(&posts_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && is_markdown_file(path) {
                let post = self.load_post(path)?;
                if post.published || self.site.config.unpublished {
                    posts.push(post);
                }
            }
        }

        if !self.site.config.future {
            let now = chrono::Local::now().naive_local();
            posts.retain(|p| p.date <= now);
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.source.cmp(&a.source)));

        Ok(posts)
    }

    /// Load a single post from a file.
    ///
    /// Posts must carry a title and a date. The date comes from front matter
    /// when present, otherwise from a `YYYY-MM-DD-` filename prefix; a post
    /// with neither fails the build rather than sort ambiguously.
    pub fn load_post(&self, path: &Path) -> Result<Post> {
        let content = fs::read_to_string(path)?;
        let (fm, body) = FrontMatter::parse(&content)
            .map_err(|e| Error::parse(path, e.to_string()))?
            .ok_or_else(|| Error::parse(path, "missing front matter block"))?;

        let title = fm
            .title
            .clone()
            .ok_or_else(|| Error::parse(path, "missing required field `title`"))?;

        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("untitled");
        let (stem_date, stem_slug) = split_post_stem(stem);

        let date = match fm.parse_date().map_err(|e| Error::parse(path, e.to_string()))? {
            Some(date) => date,
            None => stem_date.ok_or_else(|| {
                Error::parse(
                    path,
                    "missing `date` (set it in front matter or name the file YYYY-MM-DD-slug.md)",
                )
            })?,
        };

        let updated = fm
            .parse_updated()
            .map_err(|e| Error::parse(path, e.to_string()))?;

        let layout = match fm.layout.as_deref() {
            Some(name) => Layout::parse(name).ok_or_else(|| {
                Error::template(format!("unknown layout `{}` in {}", name, path.display()))
            })?,
            None => Layout::Post,
        };

        let source = path
            .strip_prefix(&self.site.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        // Slug precedence: explicit front-matter slug, then the filename stem
        // with its date prefix removed, then the title.
        let slug = match &fm.slug {
            Some(s) => slug::slugify(s),
            None if !stem_slug.is_empty() => slug::slugify(stem_slug),
            None => slug::slugify(&title),
        };

        let route = match &fm.permalink {
            Some(p) => url::normalize_route(p),
            None => url::expand_permalink(&self.site.config.permalink, &date, &slug, &fm.categories),
        };
        let permalink = url::absolute_url(&self.site.config.url, &self.site.config.baseurl, &route);

        let separator = &self.site.config.excerpt_separator;
        let (excerpt_md, full_md) = MarkdownRenderer::split_excerpt(body, separator);
        let content_html = self.renderer.render(&full_md)?;
        let excerpt_html = match excerpt_md {
            Some(e) => Some(self.renderer.render(&e)?),
            None => None,
        };

        let mut post = Post::new(title, date, source);
        post.updated = updated;
        post.content = content_html;
        post.excerpt = excerpt_html;
        post.categories = fm.categories;
        post.layout = layout;
        post.path = route;
        post.permalink = permalink;
        post.published = fm.published;
        post.slug = slug;
        post.extra = fm.extra;

        Ok(post)
    }

    /// Load all pages, sorted by source path.
    ///
    /// A page is any Markdown file outside `_`-prefixed directories that
    /// opens with a front-matter block. Markdown files without one are left
    /// to the asset copier.
    pub fn load_pages(&self) -> Result<Vec<Page>> {
        let mut pages = Vec::new();

        for entry in WalkDir::new(&self.site.source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            let relative = path.strip_prefix(&self.site.source_dir).unwrap_or(path);

            if is_excluded(relative) {
                continue;
            }

            if path.is_file() && is_markdown_file(path) {
                let content = fs::read_to_string(path)?;
                if !has_front_matter(&content) {
                    continue;
                }
                let page = self.load_page(path, &content)?;
                if let Some(page) = page {
                    pages.push(page);
                }
            }
        }

        pages.sort_by(|a, b| a.source.cmp(&b.source));

        Ok(pages)
    }

    /// Load a single page. Returns `None` for pages excluded from the build.
    fn load_page(&self, path: &Path, content: &str) -> Result<Option<Page>> {
        let (fm, body) = FrontMatter::parse(content)
            .map_err(|e| Error::parse(path, e.to_string()))?
            .ok_or_else(|| Error::parse(path, "missing front matter block"))?;

        if !fm.published && !self.site.config.unpublished {
            return Ok(None);
        }

        let title = fm.title.clone().unwrap_or_else(|| {
            path.file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("Untitled")
                .to_string()
        });

        let date = fm
            .parse_date()
            .map_err(|e| Error::parse(path, e.to_string()))?;
        // Pages do not surface `updated`, but a malformed value still fails.
        fm.parse_updated()
            .map_err(|e| Error::parse(path, e.to_string()))?;

        let source = path
            .strip_prefix(&self.site.source_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .to_string();

        // The root index page defaults to the home layout so a fresh site
        // gets its listing without an explicit `layout:` line.
        let layout = match fm.layout.as_deref() {
            Some(name) => Layout::parse(name).ok_or_else(|| {
                Error::template(format!("unknown layout `{}` in {}", name, path.display()))
            })?,
            None if source == "index.md" => Layout::Home,
            None => Layout::Page,
        };

        let route = match &fm.permalink {
            Some(p) => url::normalize_route(p),
            None => url::page_route(&source),
        };
        let permalink = url::absolute_url(&self.site.config.url, &self.site.config.baseurl, &route);

        let content_html = self.renderer.render(body)?;

        let mut page = Page::new(title, source);
        page.date = date;
        page.content = content_html;
        page.layout = layout;
        page.path = route;
        page.permalink = permalink;
        page.extra = fm.extra;

        Ok(Some(page))
    }
}

/// Check if a file is a markdown file
pub(crate) fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e == "md" || e == "markdown")
        .unwrap_or(false)
}

/// Paths with any `_`- or `.`-prefixed component are outside the page walk.
pub(crate) fn is_excluded(relative: &Path) -> bool {
    relative.components().any(|c| {
        c.as_os_str()
            .to_str()
            .map(|s| s.starts_with('_') || s.starts_with('.'))
            .unwrap_or(false)
    })
}

/// Split a post filename stem into its date prefix and slug part.
///
/// `2025-02-05-what-the-der` yields the date at midnight plus `what-the-der`;
/// a stem without the prefix yields no date and the whole stem.
pub(crate) fn split_post_stem(stem: &str) -> (Option<NaiveDateTime>, &str) {
    if stem.len() > 11 && stem.as_bytes()[10] == b'-' {
        if let Ok(date) = NaiveDate::parse_from_str(&stem[..10], "%Y-%m-%d") {
            return (date.and_hms_opt(0, 0, 0), &stem[11..]);
        }
    }
    (None, stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::fs;
    use tempfile::TempDir;

    fn site_in(dir: &TempDir) -> Galley {
        Galley::with_config(SiteConfig::default(), dir.path())
    }

    fn write_post(dir: &TempDir, name: &str, content: &str) {
        let posts = dir.path().join("_posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join(name), content).unwrap();
    }

    #[test]
    fn test_posts_sorted_newest_first() {
        let tmp = TempDir::new().unwrap();
        write_post(
            &tmp,
            "2024-01-01-oldest.md",
            "---\ntitle: Oldest\n---\nBody.\n",
        );
        write_post(
            &tmp,
            "2024-06-15-middle.md",
            "---\ntitle: Middle\n---\nBody.\n",
        );
        write_post(
            &tmp,
            "2024-12-31-newest.md",
            "---\ntitle: Newest\n---\nBody.\n",
        );

        let site = site_in(&tmp);
        let store = ContentStore::new(&site);
        let posts = store.load_posts().unwrap();

        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newest", "Middle", "Oldest"]);
        assert!(posts.windows(2).all(|w| w[0].date >= w[1].date));
    }

    #[test]
    fn test_missing_title_fails_parse() {
        let tmp = TempDir::new().unwrap();
        write_post(&tmp, "2024-01-01-untitled.md", "---\ndate: 2024-01-01\n---\nBody.\n");

        let site = site_in(&tmp);
        let err = ContentStore::new(&site).load_posts().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {:?}", err);
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_missing_date_fails_parse() {
        let tmp = TempDir::new().unwrap();
        write_post(&tmp, "no-date-here.md", "---\ntitle: Dateless\n---\nBody.\n");

        let site = site_in(&tmp);
        let err = ContentStore::new(&site).load_posts().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {:?}", err);
    }

    #[test]
    fn test_date_from_filename_prefix() {
        let tmp = TempDir::new().unwrap();
        write_post(
            &tmp,
            "2025-02-05-what-the-der.md",
            "---\ntitle: What the DER?\n---\nBody.\n",
        );

        let site = site_in(&tmp);
        let posts = ContentStore::new(&site).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].date.format("%Y-%m-%d").to_string(), "2025-02-05");
        assert_eq!(posts[0].slug, "what-the-der");
        assert_eq!(posts[0].path, "/2025/02/05/what-the-der/");
    }

    #[test]
    fn test_frontmatter_date_beats_filename() {
        let tmp = TempDir::new().unwrap();
        write_post(
            &tmp,
            "2024-01-01-post.md",
            "---\ntitle: Post\ndate: 2024-06-30\n---\nBody.\n",
        );

        let site = site_in(&tmp);
        let posts = ContentStore::new(&site).load_posts().unwrap();
        assert_eq!(posts[0].date.format("%Y-%m-%d").to_string(), "2024-06-30");
    }

    #[test]
    fn test_invalid_yaml_fails_parse() {
        let tmp = TempDir::new().unwrap();
        write_post(&tmp, "2024-01-01-bad.md", "---\ntitle: [broken\n---\nBody.\n");

        let site = site_in(&tmp);
        let err = ContentStore::new(&site).load_posts().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_unknown_layout_fails_template() {
        let tmp = TempDir::new().unwrap();
        write_post(
            &tmp,
            "2024-01-01-odd.md",
            "---\ntitle: Odd\nlayout: gallery\n---\nBody.\n",
        );

        let site = site_in(&tmp);
        let err = ContentStore::new(&site).load_posts().unwrap_err();
        assert!(matches!(err, Error::Template(_)), "got {:?}", err);
    }

    #[test]
    fn test_unpublished_posts_hidden_by_default() {
        let tmp = TempDir::new().unwrap();
        write_post(
            &tmp,
            "2024-01-01-draft.md",
            "---\ntitle: Draft\npublished: false\n---\nBody.\n",
        );
        write_post(&tmp, "2024-01-02-live.md", "---\ntitle: Live\n---\nBody.\n");

        let site = site_in(&tmp);
        let posts = ContentStore::new(&site).load_posts().unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].title, "Live");

        let mut config = SiteConfig::default();
        config.unpublished = true;
        let site = Galley::with_config(config, tmp.path());
        let posts = ContentStore::new(&site).load_posts().unwrap();
        assert_eq!(posts.len(), 2);
    }

    #[test]
    fn test_same_date_ordering_is_total() {
        let tmp = TempDir::new().unwrap();
        write_post(&tmp, "2024-01-01-alpha.md", "---\ntitle: Alpha\n---\nBody.\n");
        write_post(&tmp, "2024-01-01-beta.md", "---\ntitle: Beta\n---\nBody.\n");

        let site = site_in(&tmp);
        let store = ContentStore::new(&site);
        let first = store.load_posts().unwrap();
        let second = store.load_posts().unwrap();
        let order: Vec<String> = first.iter().map(|p| p.source.clone()).collect();
        let order2: Vec<String> = second.iter().map(|p| p.source.clone()).collect();
        assert_eq!(order, order2);
        // Source-path tiebreak, descending like the dates.
        assert_eq!(first[0].title, "Beta");
    }

    #[test]
    fn test_explicit_slug_beats_filename() {
        let tmp = TempDir::new().unwrap();
        write_post(
            &tmp,
            "2024-01-01-original.md",
            "---\ntitle: Original\nslug: renamed\n---\nBody.\n",
        );

        let site = site_in(&tmp);
        let posts = ContentStore::new(&site).load_posts().unwrap();
        assert_eq!(posts[0].slug, "renamed");
        assert_eq!(posts[0].path, "/2024/01/01/renamed/");
    }

    #[test]
    fn test_excerpt_split() {
        let tmp = TempDir::new().unwrap();
        write_post(
            &tmp,
            "2024-01-01-long.md",
            "---\ntitle: Long\n---\nIntro paragraph.\n\n<!-- more -->\n\nThe rest.\n",
        );

        let site = site_in(&tmp);
        let posts = ContentStore::new(&site).load_posts().unwrap();
        let post = &posts[0];
        let excerpt = post.excerpt.as_deref().unwrap();
        assert!(excerpt.contains("Intro paragraph."));
        assert!(!excerpt.contains("The rest."));
        assert!(post.content.contains("Intro paragraph."));
        assert!(post.content.contains("The rest."));
    }

    #[test]
    fn test_load_pages_skips_plain_markdown() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("about.md"),
            "---\ntitle: About\nlayout: about\n---\nHello.\n",
        )
        .unwrap();
        fs::write(tmp.path().join("README.md"), "# No front matter\n").unwrap();

        let site = site_in(&tmp);
        let pages = ContentStore::new(&site).load_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "About");
        assert_eq!(pages[0].layout, Layout::About);
        assert_eq!(pages[0].path, "/about/");
    }

    #[test]
    fn test_page_with_empty_front_matter_loads() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("contact.md"),
            "---\n---\n\nReach me by email.\n",
        )
        .unwrap();

        let site = site_in(&tmp);
        let pages = ContentStore::new(&site).load_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].title, "contact");
        assert_eq!(pages[0].layout, Layout::Page);
        assert_eq!(pages[0].path, "/contact/");
        assert!(pages[0].content.contains("Reach me by email."));
    }

    #[test]
    fn test_page_with_bad_updated_fails_parse() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("about.md"),
            "---\ntitle: About\nupdated: whenever\n---\nHi.\n",
        )
        .unwrap();

        let site = site_in(&tmp);
        let err = ContentStore::new(&site).load_pages().unwrap_err();
        assert!(matches!(err, Error::Parse { .. }), "got {:?}", err);
    }

    #[test]
    fn test_root_index_defaults_to_home_layout() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("index.md"), "---\ntitle: Home\n---\nWelcome.\n").unwrap();

        let site = site_in(&tmp);
        let pages = ContentStore::new(&site).load_pages().unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].layout, Layout::Home);
        assert_eq!(pages[0].path, "/");
    }

    #[test]
    fn test_underscore_dirs_not_walked_for_pages() {
        let tmp = TempDir::new().unwrap();
        write_post(&tmp, "2024-01-01-post.md", "---\ntitle: Post\n---\nBody.\n");

        let site = site_in(&tmp);
        let pages = ContentStore::new(&site).load_pages().unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn test_split_post_stem() {
        let (date, slug) = split_post_stem("2025-02-05-what-the-der");
        assert_eq!(date.unwrap().format("%Y-%m-%d").to_string(), "2025-02-05");
        assert_eq!(slug, "what-the-der");

        let (date, slug) = split_post_stem("not-dated-post");
        assert!(date.is_none());
        assert_eq!(slug, "not-dated-post");

        // Looks dated but is not a real calendar date.
        let (date, _) = split_post_stem("2025-13-99-bogus");
        assert!(date.is_none());
    }
}
