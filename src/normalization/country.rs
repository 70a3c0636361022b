use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::database_ops::store::NewCountry;

/// The subset of a REST Countries v3.1 record that gets stored.
#[derive(Debug, Deserialize)]
struct RawCountry {
    name: RawName,
    #[serde(default)]
    capital: Option<Vec<String>>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    area: f64,
    #[serde(default)]
    languages: Option<IndexMap<String, String>>,
    #[serde(default)]
    flags: Option<RawFlags>,
    cca2: String,
    cca3: String,
    #[serde(default)]
    borders: Option<Vec<String>>,
    /// Keyed by survey year; the provider ships at most one entry.
    #[serde(default)]
    gini: Option<IndexMap<String, f64>>,
    #[serde(default)]
    independent: Option<bool>,
    #[serde(default)]
    region: String,
    #[serde(default)]
    subregion: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawName {
    common: String,
    official: String,
}

#[derive(Debug, Deserialize)]
struct RawFlags {
    #[serde(default)]
    png: Option<String>,
}

/// Map one upstream directory record onto the `countries` row shape.
pub fn to_new_country(record: &Value) -> Result<NewCountry> {
    let raw = RawCountry::deserialize(record).context("unexpected country record shape")?;

    Ok(NewCountry {
        name: raw.name.common,
        official_name: raw.name.official,
        capital: raw.capital.and_then(|list| list.into_iter().next()),
        population: i64::try_from(raw.population).unwrap_or(i64::MAX),
        area: raw.area.max(0.0),
        languages: raw
            .languages
            .map(|langs| langs.into_values().collect())
            .unwrap_or_default(),
        flag_url: raw.flags.and_then(|f| f.png).unwrap_or_default(),
        cca2: raw.cca2,
        cca3: raw.cca3,
        borders: raw.borders.unwrap_or_default(),
        gini: raw.gini.and_then(|g| g.into_values().next()),
        independent: raw.independent.unwrap_or(false),
        region: raw.region,
        subregion: raw.subregion.filter(|s| !s.trim().is_empty()),
    })
}
