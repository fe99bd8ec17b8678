//! Markdown rendering with syntax highlighting

use crate::config::{MarkdownEngine, SiteConfig};
use crate::error::Result;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

/// Markdown renderer with syntax highlighting
pub struct MarkdownRenderer {
    engine: MarkdownEngine,
    syntax_set: SyntaxSet,
    theme_set: ThemeSet,
    theme_name: String,
    highlight: bool,
    line_numbers: bool,
}

impl MarkdownRenderer {
    /// Create a renderer with default settings
    pub fn new() -> Self {
        Self {
            engine: MarkdownEngine::Gfm,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: "base16-ocean.dark".to_string(),
            highlight: true,
            line_numbers: true,
        }
    }

    /// Create a renderer with the site's markdown and highlight settings
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            engine: config.markdown,
            syntax_set: SyntaxSet::load_defaults_newlines(),
            theme_set: ThemeSet::load_defaults(),
            theme_name: config.highlight.theme.clone(),
            highlight: config.highlight.enable,
            line_numbers: config.highlight.line_number,
        }
    }

    fn options(&self) -> Options {
        match self.engine {
            // Strict CommonMark, no extensions.
            MarkdownEngine::Commonmark => Options::empty(),
            MarkdownEngine::Gfm => {
                Options::ENABLE_TABLES
                    | Options::ENABLE_FOOTNOTES
                    | Options::ENABLE_STRIKETHROUGH
                    | Options::ENABLE_TASKLISTS
                    | Options::ENABLE_SMART_PUNCTUATION
                    | Options::ENABLE_HEADING_ATTRIBUTES
                    | Options::ENABLE_DEFINITION_LIST
                    | Options::ENABLE_GFM
            }
        }
    }

    /// Render markdown to HTML
    pub fn render(&self, markdown: &str) -> Result<String> {
        let parser = Parser::new_ext(markdown, self.options());

        let mut html_output = String::new();
        if !self.highlight {
            // Without highlighting, pulldown's own code block output is fine.
            html::push_html(&mut html_output, parser);
            return Ok(html_output);
        }

        let mut events: Vec<Event> = Vec::new();
        let mut in_code_block = false;
        let mut code_lang: Option<String> = None;
        let mut code_buf = String::new();

        for event in parser {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    in_code_block = true;
                    code_lang = match kind {
                        CodeBlockKind::Fenced(lang) => {
                            let lang = lang.to_string();
                            if lang.is_empty() {
                                None
                            } else {
                                Some(lang)
                            }
                        }
                        CodeBlockKind::Indented => None,
                    };
                    code_buf.clear();
                }
                Event::End(TagEnd::CodeBlock) => {
                    let highlighted = self.highlight_code(&code_buf, code_lang.as_deref());
                    events.push(Event::Html(CowStr::from(highlighted)));
                    in_code_block = false;
                    code_lang = None;
                }
                Event::Text(text) if in_code_block => {
                    code_buf.push_str(&text);
                }
                other => events.push(other),
            }
        }

        html::push_html(&mut html_output, events.into_iter());
        Ok(html_output)
    }

    /// Highlight a code block
    fn highlight_code(&self, code: &str, lang: Option<&str>) -> String {
        let lang = lang.unwrap_or("text");

        let syntax = self
            .syntax_set
            .find_syntax_by_token(lang)
            .or_else(|| self.syntax_set.find_syntax_by_extension(lang))
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let theme = match self
            .theme_set
            .themes
            .get(&self.theme_name)
            .or_else(|| self.theme_set.themes.values().next())
        {
            Some(theme) => theme,
            None => return plain_code_block(code, lang),
        };

        match highlighted_html_for_string(code, &self.syntax_set, syntax, theme) {
            Ok(highlighted) => {
                if self.line_numbers {
                    self.add_line_numbers(&highlighted, lang)
                } else {
                    format!(r#"<figure class="highlight {}">{}</figure>"#, lang, highlighted)
                }
            }
            Err(_) => plain_code_block(code, lang),
        }
    }

    /// Add a line-number gutter to highlighted code
    fn add_line_numbers(&self, highlighted: &str, lang: &str) -> String {
        // Peel off syntect's <pre> wrapper so the gutter counts code lines only.
        let mut inner = highlighted.trim_end();
        if let Some(stripped) = inner.strip_suffix("</pre>") {
            inner = stripped.trim_end_matches('\n');
        }
        if inner.starts_with("<pre") {
            if let Some(pos) = inner.find('>') {
                inner = inner[pos + 1..].trim_start_matches('\n');
            }
        }

        let lines: Vec<&str> = inner.lines().collect();
        let line_count = lines.len();

        let mut gutter = String::new();
        let mut code_lines = String::new();

        for (i, line) in lines.iter().enumerate() {
            gutter.push_str(&format!(r#"<span class="line-number">{}</span>"#, i + 1));
            code_lines.push_str(line);
            if i < line_count - 1 {
                gutter.push('\n');
                code_lines.push('\n');
            }
        }

        format!(
            r#"<figure class="highlight {}"><table><tr><td class="gutter"><pre>{}</pre></td><td class="code"><pre>{}</pre></td></tr></table></figure>"#,
            lang, gutter, code_lines
        )
    }

    /// Split content at the excerpt separator
    pub fn split_excerpt(content: &str, separator: &str) -> (Option<String>, String) {
        if let Some(pos) = content.find(separator) {
            let excerpt = content[..pos].trim().to_string();
            let remaining = content[pos + separator.len()..].trim().to_string();
            let full = format!("{}\n\n{}", excerpt, remaining);
            (Some(excerpt), full)
        } else {
            (None, content.to_string())
        }
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn plain_code_block(code: &str, lang: &str) -> String {
    format!(
        r#"<pre><code class="language-{}">{}</code></pre>"#,
        lang,
        html_escape(code)
    )
}

/// Simple HTML escaping
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commonmark() -> MarkdownRenderer {
        let mut config = SiteConfig::default();
        config.markdown = MarkdownEngine::Commonmark;
        MarkdownRenderer::from_config(&config)
    }

    #[test]
    fn test_render_basic_markdown() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("# Hello World\n\nThis is a test.").unwrap();
        assert!(html.contains("<h1>Hello World</h1>"));
        assert!(html.contains("This is a test."));
    }

    #[test]
    fn test_render_code_block() {
        let renderer = MarkdownRenderer::new();
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("highlight"));
        assert!(html.contains("line-number"));
    }

    #[test]
    fn test_gfm_renders_tables() {
        let table = "| a | b |\n|---|---|\n| 1 | 2 |\n";
        let gfm_html = MarkdownRenderer::new().render(table).unwrap();
        assert!(gfm_html.contains("<table>"));

        let cm_html = commonmark().render(table).unwrap();
        assert!(!cm_html.contains("<table>"));
    }

    #[test]
    fn test_gfm_renders_strikethrough() {
        let html = MarkdownRenderer::new().render("~~gone~~").unwrap();
        assert!(html.contains("<del>"));
    }

    #[test]
    fn test_highlight_disabled_keeps_plain_code() {
        let mut config = SiteConfig::default();
        config.highlight.enable = false;
        let renderer = MarkdownRenderer::from_config(&config);
        let html = renderer.render("```rust\nfn main() {}\n```").unwrap();
        assert!(html.contains("<pre><code"));
        assert!(!html.contains("<figure"));
    }

    #[test]
    fn test_split_excerpt() {
        let content = "This is excerpt.\n<!-- more -->\nThis is more content.";
        let (excerpt, full) = MarkdownRenderer::split_excerpt(content, "<!-- more -->");
        assert_eq!(excerpt, Some("This is excerpt.".to_string()));
        assert!(full.contains("This is excerpt."));
        assert!(full.contains("This is more content."));
    }

    #[test]
    fn test_split_excerpt_custom_separator() {
        let content = "Short intro.\n\n<!--break-->\n\nThe rest.";
        let (excerpt, _) = MarkdownRenderer::split_excerpt(content, "<!--break-->");
        assert_eq!(excerpt, Some("Short intro.".to_string()));
    }

    #[test]
    fn test_no_separator_means_no_excerpt() {
        let (excerpt, full) = MarkdownRenderer::split_excerpt("Just a body.", "<!-- more -->");
        assert_eq!(excerpt, None);
        assert_eq!(full, "Just a body.");
    }
}
