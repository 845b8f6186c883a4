// src/store/record.rs
// =============================================================================
// Row types we read from the listings table.
//
// - Record: what the link checker needs (id, name, website URL)
// - SitemapEntry: what the sitemap generator needs (id + timestamps)
//
// PostgREST tables use either integer or text primary keys, so RecordId
// accepts both and serializes back exactly the way it was read.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// Primary key of a listing row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    /// Formats the id as a value inside a PostgREST `in.(...)` filter.
    ///
    /// Text ids are always double-quoted so commas and parentheses
    /// inside them don't break the list.
    pub fn to_filter_literal(&self) -> String {
        match self {
            RecordId::Number(n) => n.to_string(),
            RecordId::Text(s) => {
                let escaped = s.replace('\\', "\\\\").replace('"', "\\\"");
                format!("\"{}\"", escaped)
            }
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{}", n),
            RecordId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(n: i64) -> Self {
        RecordId::Number(n)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

/// A business listing with a publicly advertised URL
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Record {
    pub id: RecordId,
    /// Null in rows that were never given a name
    #[serde(default)]
    pub name: Option<String>,
    /// Stored as `website_url` in the table
    #[serde(alias = "website_url")]
    pub url: String,
}

impl Record {
    #[cfg(test)]
    pub fn new(id: impl Into<RecordId>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            url: url.into(),
        }
    }

    /// The name for console output
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNNAMED)
    }
}

const UNNAMED: &str = "(unnamed)";

/// One active listing as seen by the sitemap generator
#[derive(Debug, Clone, Deserialize)]
pub struct SitemapEntry {
    pub id: RecordId,
    // Kept as raw strings: `timestamp` and `timestamptz` columns
    // come back in different shapes
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}
