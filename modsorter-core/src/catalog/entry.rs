//! Catalog entry types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slug values that mean "no remote project assigned yet"
const SLUG_SENTINELS: &[&str] = &["null", "unset"];

/// Compatibility of a mod with one side (client or server)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compat {
    Required,
    Optional,
    Unsupported,
    #[default]
    Unknown,
    NotFound,
    Error,
}

impl Compat {
    /// Normalize a raw value from the service or the catalog file
    ///
    /// Case-insensitive; anything unrecognised (including empty) is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "required" => Compat::Required,
            "optional" => Compat::Optional,
            "unsupported" => Compat::Unsupported,
            "not_found" => Compat::NotFound,
            "error" => Compat::Error,
            _ => Compat::Unknown,
        }
    }

    /// Persisted spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            Compat::Required => "required",
            Compat::Optional => "optional",
            Compat::Unsupported => "unsupported",
            Compat::Unknown => "unknown",
            Compat::NotFound => "not_found",
            Compat::Error => "error",
        }
    }

    /// Whether the mod belongs on this side on its own merits
    pub fn is_supported(&self) -> bool {
        matches!(self, Compat::Required | Compat::Optional)
    }
}

impl fmt::Display for Compat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when a slug must not be looked up
pub fn is_unresolved_slug(slug: &str) -> bool {
    let slug = slug.trim();
    slug.is_empty() || SLUG_SENTINELS.iter().any(|s| slug.eq_ignore_ascii_case(s))
}

/// Lookup input: the two leading fields of a catalog record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    pub filename: String,
    pub slug: String,
}

impl CatalogRow {
    pub fn new(filename: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            slug: slug.into(),
        }
    }

    /// Build from raw record fields (0 = filename, 1 = slug)
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        let field = |i: usize| {
            fields
                .get(i)
                .map(|f| f.as_ref().to_string())
                .unwrap_or_default()
        };
        Self {
            filename: field(0),
            slug: field(1),
        }
    }
}

/// One enriched catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub filename: String,
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub client_side: Compat,
    #[serde(default)]
    pub server_side: Compat,
}

impl CatalogEntry {
    /// Entry with nothing known beyond its file and slug
    pub fn unenriched(row: &CatalogRow) -> Self {
        Self {
            filename: row.filename.clone(),
            slug: row.slug.clone(),
            title: String::new(),
            url: String::new(),
            client_side: Compat::Unknown,
            server_side: Compat::Unknown,
        }
    }

    /// Entry with both sides set to the same outcome and no metadata
    pub fn with_outcome(row: &CatalogRow, outcome: Compat) -> Self {
        Self {
            client_side: outcome,
            server_side: outcome,
            ..Self::unenriched(row)
        }
    }

    /// Parse a persisted record in header column order
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Self {
        let field = |i: usize| fields.get(i).map(|f| f.as_ref()).unwrap_or("");
        Self {
            filename: field(0).to_string(),
            slug: field(1).to_string(),
            title: field(2).to_string(),
            url: field(3).to_string(),
            client_side: Compat::parse(field(4)),
            server_side: Compat::parse(field(5)),
        }
    }

    /// Fields in header column order
    pub fn to_fields(&self) -> [&str; 6] {
        [
            self.filename.as_str(),
            self.slug.as_str(),
            self.title.as_str(),
            self.url.as_str(),
            self.client_side.as_str(),
            self.server_side.as_str(),
        ]
    }

    pub fn row(&self) -> CatalogRow {
        CatalogRow::new(self.filename.clone(), self.slug.clone())
    }

    /// Why this row needs attention, if it does
    ///
    /// A missing slug wins over a failed lookup, which wins over not found.
    pub fn issue(&self) -> Option<&'static str> {
        let either = |c: Compat| self.client_side == c || self.server_side == c;
        if is_unresolved_slug(&self.slug) {
            Some("missing slug")
        } else if either(Compat::Error) {
            Some("lookup error")
        } else if either(Compat::NotFound) {
            Some("not found")
        } else {
            None
        }
    }
}

impl fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] client={} server={}",
            self.filename, self.slug, self.client_side, self.server_side
        )
    }
}
