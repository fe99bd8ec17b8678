//! Content module - handles posts, pages, and content processing

mod frontmatter;
pub mod loader;
mod markdown;
mod post;

pub use frontmatter::{has_front_matter, FrontMatter, FrontMatterError};
pub use loader::ContentStore;
pub use markdown::MarkdownRenderer;
pub use post::{Layout, Page, Post};
