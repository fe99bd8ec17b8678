//! Configuration module

mod site;

pub use site::HighlightConfig;
pub use site::MarkdownEngine;
pub use site::SiteConfig;
