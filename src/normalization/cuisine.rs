use std::path::Path;

use anyhow::{anyhow, Context, Result};
use indexmap::IndexMap;
use serde::Serialize;

/// Country display name → TheMealDB area tag, in populate order.
const DEFAULT_CUISINES: [(&str, &str); 29] = [
    ("United States", "American"),
    ("United Kingdom", "British"),
    ("Canada", "Canadian"),
    ("China", "Chinese"),
    ("Croatia", "Croatian"),
    ("Netherlands", "Dutch"),
    ("Egypt", "Egyptian"),
    ("Philippines", "Filipino"),
    ("France", "French"),
    ("Greece", "Greek"),
    ("India", "Indian"),
    ("Ireland", "Irish"),
    ("Italy", "Italian"),
    ("Jamaica", "Jamaican"),
    ("Japan", "Japanese"),
    ("Kenya", "Kenyan"),
    ("Malaysia", "Malaysian"),
    ("Mexico", "Mexican"),
    ("Morocco", "Moroccan"),
    ("Poland", "Polish"),
    ("Portugal", "Portuguese"),
    ("Russia", "Russian"),
    ("Spain", "Spanish"),
    ("Thailand", "Thai"),
    ("Tunisia", "Tunisian"),
    ("Turkey", "Turkish"),
    ("Ukraine", "Ukrainian"),
    ("Uruguay", "Uruguayan"),
    ("Vietnam", "Vietnamese"),
];

/// Countries skipped by a populate-all run unless configured otherwise.
pub const DEFAULT_EXCLUSIONS: [&str; 1] = ["Canada"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CuisineEntry {
    pub country: String,
    pub cuisine: String,
}

/// Ordered lookup table from country display name to cuisine tag.
///
/// Matching is exact and case-sensitive, the same way country names are
/// matched against the `countries` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuisineMap {
    entries: IndexMap<String, String>,
}

impl Default for CuisineMap {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_CUISINES)
    }
}

impl CuisineMap {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Parse a JSON object of `{"Country": "Cuisine", ...}`; key order is kept.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let entries: IndexMap<String, String> =
            serde_json::from_str(raw).context("cuisine map must be a JSON object of strings")?;
        if entries.is_empty() {
            return Err(anyhow!("cuisine map is empty"));
        }
        if let Some((country, _)) = entries.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(anyhow!("cuisine map entry for {country} is blank"));
        }
        Ok(Self { entries })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read cuisine map {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn cuisine_for(&self, country: &str) -> Option<&str> {
        self.entries.get(country).map(String::as_str)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> Vec<CuisineEntry> {
        self.entries
            .iter()
            .map(|(country, cuisine)| CuisineEntry {
                country: country.clone(),
                cuisine: cuisine.clone(),
            })
            .collect()
    }

    /// Mapping keys in declaration order minus `exclusions`.
    pub fn populate_order<S: AsRef<str>>(&self, exclusions: &[S]) -> Vec<String> {
        self.countries()
            .filter(|c| !exclusions.iter().any(|e| e.as_ref() == *c))
            .map(str::to_string)
            .collect()
    }
}
