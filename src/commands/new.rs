//! Create a new post or page

use anyhow::Result;
use std::fs;

use crate::Galley;

/// Create a new content file under the source directory.
pub fn run(site: &Galley, title: &str, layout: &str, path: Option<&str>) -> Result<()> {
    let now = chrono::Local::now();
    let slug = slug::slugify(title);

    let file_path = match layout {
        "post" => {
            let filename = if let Some(p) = path {
                format!("{}.md", p)
            } else {
                format!("{}-{}.md", now.format("%Y-%m-%d"), slug)
            };
            site.source_dir.join("_posts").join(filename)
        }
        "page" => {
            let filename = if let Some(p) = path {
                format!("{}.md", p)
            } else {
                format!("{}.md", slug)
            };
            site.source_dir.join(filename)
        }
        _ => {
            anyhow::bail!("Unknown layout: {}. Available: post, page", layout);
        }
    };

    if file_path.exists() {
        anyhow::bail!("File already exists: {}", file_path.display());
    }

    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = match layout {
        "post" => format!(
            "---\ntitle: {}\ndate: {}\ncategories:\n---\n",
            yaml_quote(title),
            now.format("%Y-%m-%d %H:%M:%S")
        ),
        _ => format!("---\ntitle: {}\nlayout: page\n---\n", yaml_quote(title)),
    };

    fs::write(&file_path, content)?;

    println!("Created {}", file_path.display());

    Ok(())
}

/// Quote a YAML scalar so titles with colons or quotes stay valid.
fn yaml_quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}
