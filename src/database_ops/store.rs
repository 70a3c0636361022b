// Datastore seam shared by the HTTP handlers and both importers.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Full country record as stored in `countries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub official_name: String,
    pub capital: Option<String>,
    pub population: i64,
    pub area: f64,
    pub languages: Vec<String>,
    pub flag_url: String,
    pub cca2: String,
    pub cca3: String,
    pub borders: Vec<String>,
    pub gini: Option<f64>,
    pub independent: bool,
    pub region: String,
    pub subregion: Option<String>,
}

/// Row shape served by `GET /countries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct CountrySummary {
    pub name: String,
    pub cca3: String,
    pub flag_url: String,
}

/// A country ready to be written; `id` is assigned by the datastore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCountry {
    pub name: String,
    pub official_name: String,
    pub capital: Option<String>,
    pub population: i64,
    pub area: f64,
    pub languages: Vec<String>,
    pub flag_url: String,
    pub cca2: String,
    pub cca3: String,
    pub borders: Vec<String>,
    pub gini: Option<f64>,
    pub independent: bool,
    pub region: String,
    pub subregion: Option<String>,
}

/// Outcome of replacing the country table with a fresh directory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaceReport {
    pub written: usize,
    pub removed: u64,
    /// Names whose write failed and were rolled back.
    pub failed: Vec<String>,
}

/// Row shape served by `GET /meals/{country}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct MealView {
    pub meal_name: String,
    pub meal_image: Option<String>,
    pub description: Option<String>,
    pub recipe_link: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeal {
    pub country_id: i64,
    pub meal_name: String,
    pub meal_image: Option<String>,
    pub description: Option<String>,
    pub recipe_link: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MealInsert {
    Inserted(i64),
    AlreadyPresent,
}

/// Storage operations the service needs. `Db` is the Postgres implementation.
#[async_trait::async_trait]
pub trait Datastore: Send + Sync {
    async fn list_countries(&self) -> Result<Vec<CountrySummary>>;

    /// Exact-name lookup; the lowest id wins if names ever collide.
    async fn country_by_name(&self, name: &str) -> Result<Option<Country>>;

    async fn country_id_by_name(&self, name: &str) -> Result<Option<i64>>;

    /// Make the country table equal to `countries`, atomically for readers.
    /// Rows that fail to write are reported in `ReplaceReport::failed` and
    /// keep their previous version, if any.
    async fn replace_countries(&self, countries: &[NewCountry]) -> Result<ReplaceReport>;

    async fn meals_for_country(&self, country_id: i64) -> Result<Vec<MealView>>;

    /// Insert unless `(country_id, meal_name)` already exists.
    async fn insert_meal_if_absent(&self, meal: &NewMeal) -> Result<MealInsert>;

    /// Cheap connectivity probe for `/health`.
    async fn ping(&self) -> bool;
}
