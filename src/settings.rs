// Importer configuration read from the environment.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use crate::api::AppState;
use crate::database_ops::mealdb::{MealDbProvider, MealImportOptions};
use crate::database_ops::restcountries::RestCountriesProvider;
use crate::database_ops::store::Datastore;
use crate::normalization::cuisine::{CuisineMap, DEFAULT_EXCLUSIONS};
use crate::util::db::Db;
use crate::util::env as env_util;

#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub restcountries_url: Option<String>,
    pub mealdb_base_url: Option<String>,
    pub upstream_timeout_secs: u64,
    pub cuisines: Arc<CuisineMap>,
    pub meal_options: MealImportOptions,
}

impl ImportSettings {
    pub fn from_env() -> Result<Self> {
        let cuisines = match env_util::env_opt("CUISINE_MAP_PATH") {
            Some(path) => {
                let map = CuisineMap::from_file(&path)
                    .with_context(|| format!("CUISINE_MAP_PATH={path}"))?;
                info!(path = %path, entries = map.len(), "loaded cuisine map override");
                map
            }
            None => CuisineMap::default(),
        };

        let meal_options = MealImportOptions {
            detail_concurrency: env_util::env_parse("MEAL_DETAIL_CONCURRENCY", 4usize).max(1),
            exclusions: env_util::env_list("POPULATE_ALL_EXCLUDE", &DEFAULT_EXCLUSIONS),
        };

        Ok(Self {
            restcountries_url: env_util::env_opt("RESTCOUNTRIES_URL"),
            mealdb_base_url: env_util::env_opt("MEALDB_BASE_URL"),
            upstream_timeout_secs: env_util::env_parse("UPSTREAM_TIMEOUT_SECS", 20u64),
            cuisines: Arc::new(cuisines),
            meal_options,
        })
    }

    pub fn country_directory(&self) -> Result<RestCountriesProvider> {
        RestCountriesProvider::new(
            self.restcountries_url.as_deref(),
            Some(self.upstream_timeout_secs),
        )
        .context("failed to build country directory client")
    }

    pub fn recipe_directory(&self) -> Result<MealDbProvider> {
        MealDbProvider::new(
            self.mealdb_base_url.as_deref(),
            Some(self.upstream_timeout_secs),
        )
        .context("failed to build recipe directory client")
    }

    /// Handler state for the HTTP API. A missing DSN leaves the store unset;
    /// a configured DSN that fails to connect is an error.
    pub async fn app_state(&self) -> Result<AppState> {
        let store: Option<Arc<dyn Datastore>> = if env_util::db_url().is_ok() {
            Some(Arc::new(Db::connect_from_env().await?))
        } else {
            None
        };

        Ok(AppState::new(
            store,
            Arc::new(self.recipe_directory()?),
            self.cuisines.clone(),
            self.meal_options.clone(),
        ))
    }
}
