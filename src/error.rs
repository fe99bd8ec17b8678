//! Error types shared across the crate
//!
//! A build is all-or-nothing: every variant here is fatal and aborts the
//! build before anything is written to the output directory.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading content, rendering templates, or reading
/// configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed front matter, or a required field (title, date) that is
    /// missing or unparsable.
    #[error("failed to parse {file}: {message}", file = .path.display())]
    Parse { path: PathBuf, message: String },

    /// A layout referencing a template the theme does not provide, or a
    /// template that failed to render.
    #[error("template error: {0}")]
    Template(String),

    /// Missing, unreadable, or invalid site configuration.
    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a parse error for a source file.
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn template(message: impl Into<String>) -> Self {
        Self::Template(message.into())
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
