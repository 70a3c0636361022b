pub mod provider;

pub use provider::{MealDbProvider, MealDetail, MealSummary, RecipeDirectory};

use std::sync::Arc;

use futures::{stream, StreamExt};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::database_ops::store::{Datastore, MealInsert, NewMeal};
use crate::normalization::cuisine::CuisineMap;

/// Why a single-country meal import could not run.
#[derive(Debug, Error)]
pub enum MealImportError {
    #[error("Cuisine not found for {0}")]
    CuisineNotFound(String),

    #[error("Country not found: {0}")]
    CountryNotFound(String),

    #[error("recipe provider failed: {0:#}")]
    Upstream(anyhow::Error),

    #[error("datastore failed: {0:#}")]
    Datastore(anyhow::Error),
}

#[derive(Debug, Clone)]
pub struct MealImportOptions {
    /// Upper bound on in-flight detail lookups per country.
    pub detail_concurrency: usize,
    /// Countries skipped by `populate_all_meals`.
    pub exclusions: Vec<String>,
}

impl Default for MealImportOptions {
    fn default() -> Self {
        Self {
            detail_concurrency: 4,
            exclusions: crate::normalization::cuisine::DEFAULT_EXCLUSIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MealImportSummary {
    pub run_id: Uuid,
    pub country: String,
    pub cuisine: String,
    pub candidates: usize,
    pub inserted: usize,
    pub skipped_existing: usize,
    pub missing_detail: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountryOutcome {
    pub country: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<MealImportSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AllMealsReport {
    pub succeeded: usize,
    pub failed: usize,
    pub countries: Vec<CountryOutcome>,
}

/// Fills `meals` from the recipe directory, one country at a time.
pub struct MealImporter {
    store: Arc<dyn Datastore>,
    recipes: Arc<dyn RecipeDirectory>,
    cuisines: Arc<CuisineMap>,
    options: MealImportOptions,
}

impl MealImporter {
    pub fn new(
        store: Arc<dyn Datastore>,
        recipes: Arc<dyn RecipeDirectory>,
        cuisines: Arc<CuisineMap>,
        options: MealImportOptions,
    ) -> Self {
        Self {
            store,
            recipes,
            cuisines,
            options,
        }
    }

    /// Import every meal of `country`'s cuisine that is not stored yet.
    ///
    /// Unknown cuisines fail before any I/O. Per-meal failures are logged and
    /// counted in the summary; they never abort the country.
    #[instrument(skip(self))]
    pub async fn populate_meals(
        &self,
        country: &str,
    ) -> Result<MealImportSummary, MealImportError> {
        let cuisine = self
            .cuisines
            .cuisine_for(country)
            .ok_or_else(|| MealImportError::CuisineNotFound(country.to_string()))?
            .to_string();

        let country_id = self
            .store
            .country_id_by_name(country)
            .await
            .map_err(MealImportError::Datastore)?
            .ok_or_else(|| MealImportError::CountryNotFound(country.to_string()))?;

        let candidates = self
            .recipes
            .meals_by_cuisine(&cuisine)
            .await
            .map_err(MealImportError::Upstream)?;

        let mut summary = MealImportSummary {
            run_id: Uuid::new_v4(),
            country: country.to_string(),
            cuisine: cuisine.clone(),
            candidates: candidates.len(),
            ..MealImportSummary::default()
        };
        info!(
            run_id = %summary.run_id,
            %country,
            %cuisine,
            candidates = summary.candidates,
            "fetched candidate meals"
        );

        let recipes = &self.recipes;
        let mut details = stream::iter(candidates)
            .map(|meal| async move {
                let detail = recipes.meal_detail(&meal.id).await;
                (meal, detail)
            })
            .buffered(self.options.detail_concurrency.max(1));

        while let Some((meal, detail)) = details.next().await {
            let detail = match detail {
                Ok(Some(detail)) => detail,
                Ok(None) => {
                    info!(meal = %meal.name, "meal details not found");
                    summary.missing_detail += 1;
                    continue;
                }
                Err(e) => {
                    warn!(meal = %meal.name, error = %format!("{e:#}"), "meal detail lookup failed");
                    summary.failed += 1;
                    continue;
                }
            };

            let row = build_meal(country_id, &meal, detail);
            match self.store.insert_meal_if_absent(&row).await {
                Ok(MealInsert::Inserted(id)) => {
                    debug!(meal = %row.meal_name, id, %country, "inserted meal");
                    summary.inserted += 1;
                }
                Ok(MealInsert::AlreadyPresent) => {
                    debug!(meal = %row.meal_name, %country, "meal already exists");
                    summary.skipped_existing += 1;
                }
                Err(e) => {
                    warn!(meal = %row.meal_name, %country, error = %format!("{e:#}"), "meal insert failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            run_id = %summary.run_id,
            %country,
            inserted = summary.inserted,
            skipped = summary.skipped_existing,
            missing = summary.missing_detail,
            failed = summary.failed,
            "meal import complete"
        );
        Ok(summary)
    }

    /// Run `populate_meals` for every mapped country except the exclusions,
    /// in mapping order. Per-country errors are logged and reported, never raised.
    pub async fn populate_all_meals(&self) -> AllMealsReport {
        let mut report = AllMealsReport::default();

        for country in self.cuisines.populate_order(self.options.exclusions.as_slice()) {
            match self.populate_meals(&country).await {
                Ok(summary) => {
                    report.succeeded += 1;
                    report.countries.push(CountryOutcome {
                        country,
                        summary: Some(summary),
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(%country, error = %e, "populating meals failed");
                    report.failed += 1;
                    report.countries.push(CountryOutcome {
                        country,
                        summary: None,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "populate-all finished"
        );
        report
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn build_meal(country_id: i64, meal: &MealSummary, detail: MealDetail) -> NewMeal {
    NewMeal {
        country_id,
        meal_name: meal.name.clone(),
        meal_image: non_blank(detail.thumbnail).or_else(|| non_blank(meal.thumbnail.clone())),
        description: non_blank(detail.instructions),
        recipe_link: non_blank(detail.youtube),
        category: non_blank(detail.category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database_ops::memory::MemoryStore;
    use crate::test_support::{seed_countries, FakeRecipes};

    fn importer(store: &Arc<MemoryStore>, recipes: &Arc<FakeRecipes>) -> MealImporter {
        MealImporter::new(
            store.clone(),
            recipes.clone(),
            Arc::new(CuisineMap::default()),
            MealImportOptions::default(),
        )
    }

    #[tokio::test]
    async fn imports_meals_from_detail_records() {
        let store = Arc::new(MemoryStore::new());
        seed_countries(&store, &["Japan"]).await;
        let recipes = Arc::new(
            FakeRecipes::new()
                .with_meal("Japanese", "1", "Sushi", "Seafood")
                .with_meal("Japanese", "2", "Ramen", "Pasta"),
        );

        let summary = importer(&store, &recipes).populate_meals("Japan").await.unwrap();
        assert_eq!(summary.cuisine, "Japanese");
        assert_eq!(summary.candidates, 2);
        assert_eq!(summary.inserted, 2);

        let id = store.country_id_by_name("Japan").await.unwrap().unwrap();
        let meals = store.meals_for_country(id).await.unwrap();
        let mut names: Vec<_> = meals.iter().map(|m| m.meal_name.as_str()).collect();
        names.sort();
        assert_eq!(names, vec!["Ramen", "Sushi"]);
        let sushi = meals.iter().find(|m| m.meal_name == "Sushi").unwrap();
        assert_eq!(sushi.category.as_deref(), Some("Seafood"));
        assert_eq!(sushi.description.as_deref(), Some("Cook Sushi."));
    }

    #[tokio::test]
    async fn second_run_inserts_nothing() {
        let store = Arc::new(MemoryStore::new());
        seed_countries(&store, &["Italy"]).await;
        let recipes = Arc::new(
            FakeRecipes::new()
                .with_meal("Italian", "10", "Lasagne", "Pasta")
                .with_meal("Italian", "11", "Risotto", "Vegetarian"),
        );
        let importer = importer(&store, &recipes);

        importer.populate_meals("Italy").await.unwrap();
        let again = importer.populate_meals("Italy").await.unwrap();

        assert_eq!(again.inserted, 0);
        assert_eq!(again.skipped_existing, 2);
        assert_eq!(store.meal_count(), 2);
    }

    #[tokio::test]
    async fn unknown_cuisine_fails_before_any_call() {
        let store = Arc::new(MemoryStore::broken());
        let recipes = Arc::new(FakeRecipes::new());

        let err = importer(&store, &recipes)
            .populate_meals("Atlantis")
            .await
            .unwrap_err();

        assert!(matches!(err, MealImportError::CuisineNotFound(_)));
        assert_eq!(recipes.calls(), 0);
    }

    #[tokio::test]
    async fn missing_country_has_no_side_effects() {
        let store = Arc::new(MemoryStore::new());
        let recipes = Arc::new(FakeRecipes::new().with_meal("French", "5", "Ratatouille", "Vegetarian"));

        let err = importer(&store, &recipes)
            .populate_meals("France")
            .await
            .unwrap_err();

        assert!(matches!(err, MealImportError::CountryNotFound(_)));
        assert_eq!(recipes.calls(), 0);
        assert_eq!(store.meal_count(), 0);
    }

    #[tokio::test]
    async fn per_meal_failures_are_counted_not_raised() {
        let store = Arc::new(MemoryStore::new());
        seed_countries(&store, &["India"]).await;
        let recipes = Arc::new(
            FakeRecipes::new()
                .with_meal("Indian", "20", "Dal", "Vegetarian")
                .with_summary_only("Indian", "21", "Ghost Curry")
                .with_meal("Indian", "22", "Biryani", "Chicken")
                .failing_detail("22"),
        );

        let summary = importer(&store, &recipes).populate_meals("India").await.unwrap();

        assert_eq!(summary.candidates, 3);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.missing_detail, 1);
        assert_eq!(summary.failed, 1);
    }

    #[tokio::test]
    async fn upstream_list_failure_is_reported() {
        let store = Arc::new(MemoryStore::new());
        seed_countries(&store, &["Kenya"]).await;
        let recipes = Arc::new(FakeRecipes::new().failing_cuisine("Kenyan"));

        let err = importer(&store, &recipes)
            .populate_meals("Kenya")
            .await
            .unwrap_err();
        assert!(matches!(err, MealImportError::Upstream(_)));
    }

    #[tokio::test]
    async fn populate_all_continues_past_failures_and_skips_exclusions() {
        let store = Arc::new(MemoryStore::new());
        seed_countries(&store, &["United States", "Canada", "China", "Greece"]).await;
        let recipes = Arc::new(
            FakeRecipes::new()
                .with_meal("American", "30", "Pancakes", "Dessert")
                .with_meal("Canadian", "31", "Poutine", "Side")
                .with_meal("Greek", "32", "Moussaka", "Beef")
                .failing_cuisine("Chinese"),
        );

        let report = importer(&store, &recipes).populate_all_meals().await;

        assert_eq!(report.countries.len(), 28);
        assert!(!report.countries.iter().any(|c| c.country == "Canada"));
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 26);
        let china = report.countries.iter().find(|c| c.country == "China").unwrap();
        assert!(china.error.as_deref().unwrap().contains("recipe provider failed"));
        assert_eq!(store.meal_count(), 2);
    }

    #[test]
    fn blank_video_links_are_dropped() {
        let meal = MealSummary {
            id: "1".into(),
            name: "Soup".into(),
            thumbnail: Some("https://x/s.jpg".into()),
        };
        let detail = MealDetail {
            id: "1".into(),
            name: "Soup".into(),
            instructions: Some("Boil.".into()),
            youtube: Some("".into()),
            category: Some("Starter".into()),
            thumbnail: None,
        };
        let row = build_meal(7, &meal, detail);
        assert_eq!(row.recipe_link, None);
        assert_eq!(row.meal_image.as_deref(), Some("https://x/s.jpg"));
        assert_eq!(row.country_id, 7);
    }
}
