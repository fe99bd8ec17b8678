//! Post and Page models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The set of layouts the built-in theme knows how to render.
///
/// A front-matter `layout` value outside this set is a template error at
/// load time rather than a broken page at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Post,
    Page,
    Home,
    About,
}

impl Layout {
    /// Parse a front-matter layout name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "post" => Some(Layout::Post),
            "page" => Some(Layout::Page),
            "home" => Some(Layout::Home),
            "about" => Some(Layout::About),
            _ => None,
        }
    }

    /// Name of the template that renders this layout.
    pub fn template_name(self) -> &'static str {
        match self {
            Layout::Post => "post.html",
            Layout::Page => "page.html",
            Layout::Home => "home.html",
            Layout::About => "about.html",
        }
    }
}

/// A blog post
#[derive(Debug, Clone, Serialize)]
pub struct Post {
    /// Post title
    pub title: String,

    /// Publication date
    pub date: NaiveDateTime,

    /// Last updated date
    pub updated: Option<NaiveDateTime>,

    /// Rendered HTML content
    pub content: String,

    /// Post excerpt (before the excerpt separator)
    pub excerpt: Option<String>,

    /// Post categories
    pub categories: Vec<String>,

    /// Layout template to use
    pub layout: Layout,

    /// Source file path (relative)
    pub source: String,

    /// URL path (without root)
    pub path: String,

    /// Full permalink URL
    pub permalink: String,

    /// Whether the post is published
    pub published: bool,

    /// Slug (URL-friendly name)
    pub slug: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Post {
    /// Create a new post with minimal required fields
    pub fn new(title: String, date: NaiveDateTime, source: String) -> Self {
        let slug = slug::slugify(&title);
        Self {
            title,
            date,
            updated: None,
            content: String::new(),
            excerpt: None,
            categories: Vec::new(),
            layout: Layout::Post,
            source,
            path: String::new(),
            permalink: String::new(),
            published: true,
            slug,
            extra: HashMap::new(),
        }
    }

    /// Get the previous (newer) post in a date-descending list
    pub fn prev<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.source == self.source)?;
        if pos > 0 {
            Some(&posts[pos - 1])
        } else {
            None
        }
    }

    /// Get the next (older) post in a date-descending list
    pub fn next<'a>(&self, posts: &'a [Post]) -> Option<&'a Post> {
        let pos = posts.iter().position(|p| p.source == self.source)?;
        if pos < posts.len() - 1 {
            Some(&posts[pos + 1])
        } else {
            None
        }
    }
}

/// A standalone page
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Page title
    pub title: String,

    /// Creation date, when the page declares one
    pub date: Option<NaiveDateTime>,

    /// Rendered HTML content
    pub content: String,

    /// Layout template to use
    pub layout: Layout,

    /// Source file path (relative)
    pub source: String,

    /// URL path (without root)
    pub path: String,

    /// Full permalink URL
    pub permalink: String,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Page {
    /// Create a new page with minimal required fields
    pub fn new(title: String, source: String) -> Self {
        Self {
            title,
            date: None,
            content: String::new(),
            layout: Layout::Page,
            source,
            path: String::new(),
            permalink: String::new(),
            extra: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_layout_parse() {
        assert_eq!(Layout::parse("post"), Some(Layout::Post));
        assert_eq!(Layout::parse("home"), Some(Layout::Home));
        assert_eq!(Layout::parse("default"), None);
        assert_eq!(Layout::parse("Post"), None);
    }

    #[test]
    fn test_layout_template_name() {
        assert_eq!(Layout::About.template_name(), "about.html");
        assert_eq!(Layout::Post.template_name(), "post.html");
    }

    #[test]
    fn test_new_post_slugifies_title() {
        let post = Post::new(
            "What the DER?".to_string(),
            date(2025, 2, 5),
            "_posts/2025-02-05-what-the-der.md".to_string(),
        );
        assert_eq!(post.slug, "what-the-der");
        assert_eq!(post.layout, Layout::Post);
        assert!(post.published);
    }

    #[test]
    fn test_prev_next_navigation() {
        let mut newer = Post::new("Newer".to_string(), date(2024, 2, 1), "a.md".to_string());
        let mut older = Post::new("Older".to_string(), date(2024, 1, 1), "b.md".to_string());
        newer.path = "/2024/02/01/newer/".to_string();
        older.path = "/2024/01/01/older/".to_string();

        // Date-descending order, the way the store returns posts.
        let posts = vec![newer.clone(), older.clone()];

        assert!(newer.prev(&posts).is_none());
        assert_eq!(newer.next(&posts).map(|p| p.title.as_str()), Some("Older"));
        assert_eq!(older.prev(&posts).map(|p| p.title.as_str()), Some("Newer"));
        assert!(older.next(&posts).is_none());
    }
}
