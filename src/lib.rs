//! galley: a Jekyll-flavored static site generator for personal blogs
//!
//! Markdown posts with YAML front matter go in, a complete static HTML tree
//! comes out: date-based permalinks, a latest-posts home page, an Atom feed,
//! and an embedded theme rendered through Tera.

pub mod commands;
pub mod config;
pub mod content;
pub mod error;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

pub use error::{Error, Result};

use std::path::{Path, PathBuf};

/// A site rooted at a directory, with its configuration resolved.
#[derive(Debug, Clone)]
pub struct Galley {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory (where `_config.yml` lives)
    pub base_dir: PathBuf,
    /// Source directory holding content files
    pub source_dir: PathBuf,
    /// Output directory the build writes to
    pub output_dir: PathBuf,
}

impl Galley {
    /// Open the site at `base_dir`, reading `_config.yml` when present.
    ///
    /// A missing config file means defaults; an invalid one is fatal.
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(config, base_dir))
    }

    /// Build a site handle from an already-loaded configuration.
    pub fn with_config<P: AsRef<Path>>(config: config::SiteConfig, base_dir: P) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let source_dir = resolve(&base_dir, &config.source);
        let output_dir = resolve(&base_dir, &config.destination);

        Self {
            config,
            base_dir,
            source_dir,
            output_dir,
        }
    }

    /// Run a full build into the output directory.
    pub fn build(&self) -> Result<generator::BuildStats> {
        generator::Generator::new(self)?.build()
    }

    /// Remove the output directory.
    pub fn clean(&self) -> Result<()> {
        if self.output_dir.exists() {
            std::fs::remove_dir_all(&self.output_dir)?;
        }
        Ok(())
    }
}

fn resolve(base: &Path, sub: &str) -> PathBuf {
    if sub.is_empty() || sub == "." {
        base.to_path_buf()
    } else {
        base.join(sub)
    }
}
