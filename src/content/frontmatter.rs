//! Front-matter parsing

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The delimiter line opening and closing a front-matter block.
const MARKER: &str = "---";

/// Errors produced while splitting and decoding a front-matter block.
///
/// These are deliberately not recovered from: a post with a half-parsed
/// header would sort and link unpredictably, so the loader turns every one
/// of these into a fatal parse error for the file.
#[derive(Error, Debug)]
pub enum FrontMatterError {
    #[error("unclosed front matter block (missing closing ---)")]
    Unclosed,

    #[error("invalid YAML in front matter: {0}")]
    InvalidYaml(String),

    #[error("invalid date `{0}` (expected e.g. 2025-02-05 or 2025-02-05 10:30:00)")]
    InvalidDate(String),
}

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrSeq;

    impl<'de> Visitor<'de> for StringOrSeq {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrSeq)
}

/// Front-matter data from a post or page
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub updated: Option<String>,
    pub layout: Option<String>,
    #[serde(deserialize_with = "string_or_seq", default)]
    pub categories: Vec<String>,
    /// Explicit URL slug, overriding the one derived from the filename.
    pub slug: Option<String>,
    /// Explicit permalink, overriding the configured pattern.
    pub permalink: Option<String>,
    pub excerpt: Option<String>,
    /// Posts are published unless they opt out.
    #[serde(default = "default_published")]
    pub published: bool,

    /// Additional custom fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

fn default_published() -> bool {
    true
}

impl Default for FrontMatter {
    fn default() -> Self {
        Self {
            title: None,
            date: None,
            updated: None,
            layout: None,
            categories: Vec::new(),
            slug: None,
            permalink: None,
            excerpt: None,
            published: true,
            extra: HashMap::new(),
        }
    }
}

impl FrontMatter {
    /// Split `input` into a front-matter block and the remaining body.
    ///
    /// Returns `None` when the file does not open with a `---` line; such a
    /// file is not a content unit and is copied through untouched. A block
    /// that opens but never closes, or that holds invalid YAML, is an error.
    pub fn parse(input: &str) -> Result<Option<(Self, &str)>, FrontMatterError> {
        let content = input.strip_prefix('\u{feff}').unwrap_or(input);

        let rest = match content.strip_prefix(MARKER) {
            Some(r) if r.starts_with('\n') || r.starts_with("\r\n") || r.is_empty() => r,
            _ => return Ok(None),
        };
        // Exactly one terminator after the opening marker; an empty block
        // puts the closing marker on the very next line.
        let rest = rest
            .strip_prefix("\r\n")
            .or_else(|| rest.strip_prefix('\n'))
            .unwrap_or(rest);

        let (yaml_content, after) = if rest.starts_with(MARKER) {
            ("", &rest[MARKER.len()..])
        } else {
            match rest.find("\n---") {
                Some(pos) => (&rest[..pos], &rest[pos + 1 + MARKER.len()..]),
                None => return Err(FrontMatterError::Unclosed),
            }
        };
        let remaining = after.trim_start_matches(['\n', '\r']);

        if yaml_content.trim().is_empty() {
            return Ok(Some((FrontMatter::default(), remaining)));
        }

        let fm: FrontMatter = serde_yaml::from_str(yaml_content)
            .map_err(|e| FrontMatterError::InvalidYaml(e.to_string()))?;
        Ok(Some((fm, remaining)))
    }

    /// Parse the date field, if present.
    pub fn parse_date(&self) -> Result<Option<NaiveDateTime>, FrontMatterError> {
        parse_optional_date(self.date.as_deref())
    }

    /// Parse the updated field, if present.
    pub fn parse_updated(&self) -> Result<Option<NaiveDateTime>, FrontMatterError> {
        parse_optional_date(self.updated.as_deref())
    }
}

/// True when a file opens with a front-matter block.
pub fn has_front_matter(input: &str) -> bool {
    let content = input.strip_prefix('\u{feff}').unwrap_or(input);
    match content.strip_prefix(MARKER) {
        Some(rest) => rest.starts_with('\n') || rest.starts_with("\r\n") || rest.is_empty(),
        None => false,
    }
}

fn parse_optional_date(value: Option<&str>) -> Result<Option<NaiveDateTime>, FrontMatterError> {
    match value {
        Some(s) => parse_date_string(s)
            .map(Some)
            .ok_or_else(|| FrontMatterError::InvalidDate(s.to_string())),
        None => Ok(None),
    }
}

/// Parse a date string in the formats the front matter accepts.
///
/// All forms are naive: post dates are calendar facts and must not shift
/// with the timezone of the machine running the build.
pub(crate) fn parse_date_string(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let datetime_formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    let date_formats = ["%Y-%m-%d", "%Y/%m/%d"];
    for fmt in date_formats {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // Offset forms are accepted but normalized to their UTC instant.
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    None
}
