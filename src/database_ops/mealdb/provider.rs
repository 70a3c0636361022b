use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use crate::database_ops::truncate_for_log;

pub const DEFAULT_BASE_URL: &str = "https://www.themealdb.com/api/json/v1/1";

/// Lightweight entry returned by the area filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealSummary {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
}

/// Fields of a full lookup record that get stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealDetail {
    #[serde(rename = "idMeal")]
    pub id: String,
    #[serde(rename = "strMeal")]
    pub name: String,
    #[serde(rename = "strInstructions", default)]
    pub instructions: Option<String>,
    #[serde(rename = "strYoutube", default)]
    pub youtube: Option<String>,
    #[serde(rename = "strCategory", default)]
    pub category: Option<String>,
    #[serde(rename = "strMealThumb", default)]
    pub thumbnail: Option<String>,
}

/// TheMealDB wraps every list in `{"meals": [...]}` and sends `null` for no results.
#[derive(Debug, Deserialize)]
struct MealsEnvelope<T> {
    meals: Option<Vec<T>>,
}

/// Source of meals per cuisine and per-meal detail.
#[async_trait::async_trait]
pub trait RecipeDirectory: Send + Sync {
    async fn meals_by_cuisine(&self, cuisine: &str) -> Result<Vec<MealSummary>>;

    /// `Ok(None)` when the provider has no record for `meal_id`.
    async fn meal_detail(&self, meal_id: &str) -> Result<Option<MealDetail>>;
}

/// TheMealDB client.
/// Public API (base): https://www.themealdb.com/api/json/v1/1
///
/// Key endpoints:
/// - GET /filter.php?a=<area> - meals for a cuisine
/// - GET /lookup.php?i=<id> - full meal detail
#[derive(Debug, Clone)]
pub struct MealDbProvider {
    base_url: String,
    http: Client,
}

impl MealDbProvider {
    pub fn new(base_url: Option<&str>, timeout_secs: Option<u64>) -> Result<Self> {
        let base_url = base_url
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let http = Client::builder()
            .user_agent(concat!("global-voyager/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(20)))
            .build()?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_meals<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let resp = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 2000);
            return Err(anyhow!(
                "MealDB request failed: {status} url={url} query={query:?} body={body}"
            ));
        }

        let text = resp.text().await?;
        parse_meals(&text)
    }
}

fn parse_meals<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    // The API answers an empty body for some unknown areas.
    if body.trim().is_empty() {
        return Ok(Vec::new());
    }
    let envelope: MealsEnvelope<T> = serde_json::from_str(body)
        .map_err(|e| anyhow!("unexpected MealDB response shape: {e}"))?;
    Ok(envelope.meals.unwrap_or_default())
}

#[async_trait::async_trait]
impl RecipeDirectory for MealDbProvider {
    async fn meals_by_cuisine(&self, cuisine: &str) -> Result<Vec<MealSummary>> {
        self.get_meals("filter.php", &[("a", cuisine)]).await
    }

    async fn meal_detail(&self, meal_id: &str) -> Result<Option<MealDetail>> {
        let meals: Vec<MealDetail> = self.get_meals("lookup.php", &[("i", meal_id)]).await?;
        Ok(meals.into_iter().next())
    }
}
