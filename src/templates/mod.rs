//! Built-in paper theme templates using Tera template engine
//!
//! The whole theme is embedded in the binary, so a generated site needs no
//! template files on disk.

use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

use crate::config::SiteConfig;
use crate::content::{Page, Post};
use crate::error::{Error, Result};
use crate::helpers::{date, url};

/// Themes compiled into the binary. `_config.yml` validation checks against
/// this list.
pub const BUILTIN_THEMES: &[&str] = &["paper"];

/// Stylesheet shipped with the paper theme, written under `assets/css/`.
pub const THEME_STYLESHEET: &str = include_str!("paper/paper.css");

/// Template renderer with the embedded paper theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all paper templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // The templates emit HTML built from already-rendered HTML fragments,
        // so autoescaping would double-escape everything.
        tera.autoescape_on(vec![]);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("paper/layout.html")),
            ("home.html", include_str!("paper/home.html")),
            ("post.html", include_str!("paper/post.html")),
            ("page.html", include_str!("paper/page.html")),
            ("about.html", include_str!("paper/about.html")),
            // Partials
            (
                "partials/head.html",
                include_str!("paper/partials/head.html"),
            ),
            (
                "partials/header.html",
                include_str!("paper/partials/header.html"),
            ),
            (
                "partials/footer.html",
                include_str!("paper/partials/footer.html"),
            ),
        ])
        .map_err(|e| template_error("loading theme", &e))?;

        tera.register_filter("month_day_year", month_day_year_filter);
        tera.register_filter("strip_html", strip_html_filter);
        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        self.tera
            .render(template_name, context)
            .map_err(|e| template_error(template_name, &e))
    }
}

/// Flatten a Tera error chain into one message. Tera's Display alone only
/// says which template failed, the cause sits in the source chain.
fn template_error(what: &str, e: &tera::Error) -> Error {
    use std::error::Error as _;

    let mut message = format!("{}: {}", what, e);
    let mut source = e.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    Error::template(message)
}

/// Tera filter: format an ISO `YYYY-MM-DD` date as "Month DD, YYYY"
fn month_day_year_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("month_day_year", "value", String, value);

    if let Ok(d) = chrono::NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
        if let Some(dt) = d.and_hms_opt(0, 0, 0) {
            return Ok(tera::Value::String(date::month_day_year(&dt)));
        }
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(tera::Value::String(date::month_day_year(&dt)));
    }

    // Not a date we recognize, leave it alone.
    Ok(tera::Value::String(s))
}

/// Tera filter: strip HTML tags
fn strip_html_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("strip_html", "value", String, value);
    let mut result = String::with_capacity(s.len());
    let mut in_tag = false;
    for c in s.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(c),
            _ => {}
        }
    }
    Ok(tera::Value::String(result))
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };
    let omission = match args.get("omission") {
        Some(val) => tera::try_get_value!("truncate_chars", "omission", String, val),
        None => "...".to_string(),
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!(
            "{}{}",
            truncated.trim_end(),
            omission
        )))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteContext {
    pub title: String,
    pub description: String,
    pub author: String,
    pub url: String,
    pub baseurl: String,
    pub feed_url: String,
}

impl SiteContext {
    pub fn new(config: &SiteConfig) -> Self {
        let baseurl = config.baseurl.trim_end_matches('/').to_string();
        let feed_url = url::url_for(&baseurl, "/atom.xml");
        Self {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.trim_end_matches('/').to_string(),
            baseurl,
            feed_url,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostContext {
    pub title: String,
    /// ISO date, formatted for display inside the templates.
    pub date: String,
    pub url: String,
    pub permalink: String,
    pub categories: Vec<String>,
    pub content: String,
    pub excerpt: Option<String>,
}

impl PostContext {
    pub fn new(post: &Post, config: &SiteConfig) -> Self {
        Self {
            title: post.title.clone(),
            date: date::iso_date(&post.date),
            url: url::url_for(&config.baseurl, &post.path),
            permalink: post.permalink.clone(),
            categories: post.categories.clone(),
            content: post.content.clone(),
            excerpt: post.excerpt.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    pub title: String,
    pub date: Option<String>,
    pub url: String,
    pub content: String,
}

impl PageContext {
    pub fn new(page: &Page, config: &SiteConfig) -> Self {
        Self {
            title: page.title.clone(),
            date: page.date.as_ref().map(date::iso_date),
            url: url::url_for(&config.baseurl, &page.path),
            content: page.content.clone(),
        }
    }
}

/// Link target for previous/next post navigation
#[derive(Debug, Clone, Serialize)]
pub struct NavPost {
    pub title: String,
    pub url: String,
}

impl NavPost {
    pub fn new(post: &Post, config: &SiteConfig) -> Self {
        Self {
            title: post.title.clone(),
            url: url::url_for(&config.baseurl, &post.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_context() -> Context {
        let config = SiteConfig::default();
        let mut ctx = Context::new();
        ctx.insert("site", &SiteContext::new(&config));
        ctx.insert("page_title", "");
        ctx.insert("description", "");
        ctx
    }

    #[test]
    fn test_renders_page_template() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = base_context();
        ctx.insert(
            "page",
            &PageContext {
                title: "About".to_string(),
                date: None,
                url: "/about/".to_string(),
                content: "<p>Hi there.</p>".to_string(),
            },
        );

        let html = renderer.render("page.html", &ctx).unwrap();
        assert!(html.contains("<p>Hi there.</p>"));
        assert!(html.contains("About"));
        assert!(html.contains("<!DOCTYPE html>"));
    }

    #[test]
    fn test_home_lists_posts_with_long_dates() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut ctx = base_context();
        ctx.insert(
            "page",
            &PageContext {
                title: "Home".to_string(),
                date: None,
                url: "/".to_string(),
                content: String::new(),
            },
        );
        ctx.insert(
            "posts",
            &vec![PostContext {
                title: "What the DER?".to_string(),
                date: "2025-02-05".to_string(),
                url: "/2025/02/05/what-the-der/".to_string(),
                permalink: "http://example.com/2025/02/05/what-the-der/".to_string(),
                categories: vec![],
                content: String::new(),
                excerpt: None,
            }],
        );

        let html = renderer.render("home.html", &ctx).unwrap();
        assert!(html.contains("February 05, 2025"));
        assert!(html.contains(r#"href="/2025/02/05/what-the-der/""#));
        assert!(html.contains("What the DER?"));
    }

    #[test]
    fn test_unknown_template_is_a_template_error() {
        let renderer = TemplateRenderer::new().unwrap();
        let err = renderer.render("gallery.html", &Context::new()).unwrap_err();
        assert!(matches!(err, Error::Template(_)));
    }

    #[test]
    fn test_month_day_year_filter() {
        let value = tera::Value::String("2025-02-05".to_string());
        let out = month_day_year_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(out, tera::Value::String("February 05, 2025".to_string()));

        let odd = tera::Value::String("not a date".to_string());
        let out = month_day_year_filter(&odd, &HashMap::new()).unwrap();
        assert_eq!(out, tera::Value::String("not a date".to_string()));
    }

    #[test]
    fn test_strip_html_filter() {
        let value = tera::Value::String("<p>Hello <b>world</b></p>".to_string());
        let result = strip_html_filter(&value, &HashMap::new()).unwrap();
        assert_eq!(result, tera::Value::String("Hello world".to_string()));
    }

    #[test]
    fn test_truncate_chars_filter() {
        let value = tera::Value::String("a".repeat(200));
        let result = truncate_chars_filter(&value, &HashMap::new()).unwrap();
        let s = result.as_str().unwrap();
        assert!(s.len() < 200);
        assert!(s.ends_with("..."));
    }
}
