//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub author: String,

    // URL
    pub url: String,
    /// Path prefix when the site is served from a subdirectory, e.g. "/blog".
    pub baseurl: String,
    pub permalink: String,

    // Directory
    pub source: String,
    pub destination: String,

    // Content
    pub markdown: MarkdownEngine,
    pub theme: String,
    /// Number of posts listed on the home page.
    pub home_posts: usize,
    /// Number of posts included in the Atom feed.
    pub feed_posts: usize,
    /// Render posts dated in the future.
    pub future: bool,
    /// Render posts marked `published: false`.
    pub unpublished: bool,
    pub excerpt_separator: String,
    #[serde(default)]
    pub highlight: HighlightConfig,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Galley".to_string(),
            description: String::new(),
            author: String::new(),

            url: "http://example.com".to_string(),
            baseurl: String::new(),
            permalink: "/:year/:month/:day/:title/".to_string(),

            source: ".".to_string(),
            destination: "_site".to_string(),

            markdown: MarkdownEngine::Gfm,
            theme: "paper".to_string(),
            home_posts: 5,
            feed_posts: 20,
            future: true,
            unpublished: false,
            excerpt_separator: "<!-- more -->".to_string(),
            highlight: HighlightConfig::default(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file.
    ///
    /// A syntactically invalid file is a fatal config error; callers decide
    /// what to do about a file that does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| Error::config(format!("cannot read {}: {}", path.display(), e)))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .map_err(|e| Error::config(format!("invalid {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values a build depends on before any content is read.
    pub fn validate(&self) -> Result<()> {
        if !crate::templates::BUILTIN_THEMES.contains(&self.theme.as_str()) {
            return Err(Error::config(format!(
                "unknown theme `{}` (built-in themes: {})",
                self.theme,
                crate::templates::BUILTIN_THEMES.join(", ")
            )));
        }
        if self.permalink.trim().is_empty() {
            return Err(Error::config("`permalink` must not be empty"));
        }
        if !self.permalink.contains(":title") {
            return Err(Error::config(format!(
                "`permalink` pattern `{}` has no :title token, post URLs would collide",
                self.permalink
            )));
        }
        Ok(())
    }
}

/// Markdown engine selection. Fixed for the whole build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkdownEngine {
    /// Plain CommonMark, no extensions.
    Commonmark,
    /// CommonMark plus tables, footnotes, strikethrough, and task lists.
    Gfm,
}

/// Code block highlighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub enable: bool,
    pub line_number: bool,
    pub theme: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            enable: true,
            line_number: true,
            theme: "base16-ocean.dark".to_string(),
        }
    }
}
