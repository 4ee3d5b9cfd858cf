//! Keyword descriptions.
//!
//! The table is loaded once by the caller and passed by reference into the
//! annotator. A keyword missing from the table resolves to an empty
//! description.

use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;

/// Table shipped with the crate, covering the structural keywords.
const BUILTIN_DESCRIPTIONS: &str = include_str!("descriptions.json");

/// Resolves a keyword to its human-readable description.
pub trait DescriptionResolver {
    /// Returns `None` when the keyword is unknown.
    fn describe(&self, keyword: &str) -> Option<&str>;
}

impl DescriptionResolver for HashMap<String, String> {
    fn describe(&self, keyword: &str) -> Option<&str> {
        self.get(keyword).map(String::as_str)
    }
}

/// Immutable keyword to description table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptions {
    entries: HashMap<String, String>,
}

impl Descriptions {
    /// The table bundled with the crate.
    pub fn builtin() -> Self {
        // The bundled document is checked by `test_builtin_table_parses`
        Self::from_json_str(BUILTIN_DESCRIPTIONS).unwrap_or_default()
    }

    /// Parse a JSON object of `"KEYWORD": "description"` pairs.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let entries: HashMap<String, String> =
            serde_json::from_str(json).context("Descriptions must be a JSON object of strings")?;
        Ok(Self { entries })
    }

    /// Load the table from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptions file {}", path.display()))?;
        let descriptions = Self::from_json_str(&contents)
            .with_context(|| format!("Failed to parse descriptions file {}", path.display()))?;
        log::debug!(
            "Loaded {} keyword descriptions from {}",
            descriptions.len(),
            path.display()
        );
        Ok(descriptions)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DescriptionResolver for Descriptions {
    fn describe(&self, keyword: &str) -> Option<&str> {
        self.entries.describe(keyword)
    }
}

impl FromIterator<(String, String)> for Descriptions {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
