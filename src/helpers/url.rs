//! URL and route helpers
//!
//! A route is the site-relative path of a page, always with a leading `/`
//! and independent of `baseurl`. Output file paths and hrefs both derive
//! from it.

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Ensure a route starts with `/`.
pub fn normalize_route(route: &str) -> String {
    let trimmed = route.trim();
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Expand a permalink pattern into a route.
///
/// Tokens: `:year`, `:month`, `:day` (zero-padded), `:i_month`, `:i_day`
/// (unpadded), `:title` (the slug), `:category` (first category, slugified).
pub fn expand_permalink(
    pattern: &str,
    date: &NaiveDateTime,
    slug: &str,
    categories: &[String],
) -> String {
    let category = categories
        .first()
        .map(|c| slug::slugify(c))
        .unwrap_or_default();

    let result = pattern
        .replace(":year", &date.format("%Y").to_string())
        .replace(":month", &date.format("%m").to_string())
        .replace(":day", &date.format("%d").to_string())
        .replace(":i_month", &date.format("%-m").to_string())
        .replace(":i_day", &date.format("%-d").to_string())
        .replace(":title", slug)
        .replace(":category", &category);

    normalize_route(&result)
}

/// Route for a page from its source-relative path.
///
/// `about.md` becomes `/about/`; an `index.md` takes its directory's route.
pub fn page_route(source: &str) -> String {
    let without_ext = source.trim_end_matches(".markdown").trim_end_matches(".md");

    let route = if without_ext == "index" {
        String::new()
    } else if let Some(parent) = without_ext.strip_suffix("/index") {
        format!("{}/", parent)
    } else {
        format!("{}/", without_ext)
    };

    normalize_route(&route)
}

/// Site-relative href for a route, honoring `baseurl`.
pub fn url_for(baseurl: &str, route: &str) -> String {
    let base = baseurl.trim_end_matches('/');
    if base.is_empty() {
        route.to_string()
    } else {
        format!("{}{}", base, route)
    }
}

/// Absolute URL for a route.
pub fn absolute_url(site_url: &str, baseurl: &str, route: &str) -> String {
    format!("{}{}", site_url.trim_end_matches('/'), url_for(baseurl, route))
}

/// Output file path for a route, in pretty-URL form.
///
/// Directory routes get an `index.html`; routes naming a file (for example
/// `/atom.xml`) map straight through.
pub fn output_path(route: &str) -> PathBuf {
    let trimmed = route.trim_start_matches('/');
    if trimmed.is_empty() {
        return PathBuf::from("index.html");
    }
    if trimmed.ends_with('/') {
        return PathBuf::from(trimmed).join("index.html");
    }
    if Path::new(trimmed).extension().is_some() {
        return PathBuf::from(trimmed);
    }
    PathBuf::from(trimmed).join("index.html")
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
    fn test_expand_default_pattern() {
        let route = expand_permalink(
            "/:year/:month/:day/:title/",
            &date(2025, 2, 5),
            "what-the-der",
            &[],
        );
        assert_eq!(route, "/2025/02/05/what-the-der/");
    }

    #[test]
    fn test_expand_unpadded_tokens() {
        let route = expand_permalink(
            "/:year/:i_month/:i_day/:title/",
            &date(2025, 2, 5),
            "short",
            &[],
        );
        assert_eq!(route, "/2025/2/5/short/");
    }

    #[test]
    fn test_expand_category_token() {
        let route = expand_permalink(
            "/:category/:title/",
            &date(2025, 2, 5),
            "post",
            &["Security Notes".to_string()],
        );
        assert_eq!(route, "/security-notes/post/");
    }

    #[test]
    fn test_page_routes() {
        assert_eq!(page_route("about.md"), "/about/");
        assert_eq!(page_route("index.md"), "/");
        assert_eq!(page_route("docs/index.md"), "/docs/");
        assert_eq!(page_route("docs/setup.markdown"), "/docs/setup/");
    }

    #[test]
    fn test_url_for_baseurl() {
        assert_eq!(url_for("", "/about/"), "/about/");
        assert_eq!(url_for("/blog", "/about/"), "/blog/about/");
        assert_eq!(url_for("/blog/", "/about/"), "/blog/about/");
    }

    #[test]
    fn test_absolute_url() {
        assert_eq!(
            absolute_url("https://example.com/", "/blog", "/2025/02/05/what-the-der/"),
            "https://example.com/blog/2025/02/05/what-the-der/"
        );
    }

    #[test]
    fn test_output_paths() {
        assert_eq!(output_path("/"), PathBuf::from("index.html"));
        assert_eq!(
            output_path("/2025/02/05/what-the-der/"),
            PathBuf::from("2025/02/05/what-the-der/index.html")
        );
        assert_eq!(output_path("/atom.xml"), PathBuf::from("atom.xml"));
        assert_eq!(output_path("/about"), PathBuf::from("about/index.html"));
    }
}
