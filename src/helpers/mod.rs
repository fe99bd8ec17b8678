//! Helper functions shared by the loader, generator, and templates

pub mod date;
pub mod url;
