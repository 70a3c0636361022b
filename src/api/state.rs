use std::sync::Arc;

use crate::api::error::ApiError;
use crate::database_ops::mealdb::{MealImportOptions, MealImporter, RecipeDirectory};
use crate::database_ops::store::Datastore;
use crate::normalization::cuisine::CuisineMap;
use crate::util::env::DB_URL_KEYS;

/// Shared handler state. Built once at startup and cloned per worker.
#[derive(Clone)]
pub struct AppState {
    store: Option<Arc<dyn Datastore>>,
    recipes: Arc<dyn RecipeDirectory>,
    cuisines: Arc<CuisineMap>,
    meal_options: MealImportOptions,
}

impl AppState {
    /// `store` is `None` when no database URL is configured; datastore routes then answer 500.
    pub fn new(
        store: Option<Arc<dyn Datastore>>,
        recipes: Arc<dyn RecipeDirectory>,
        cuisines: Arc<CuisineMap>,
        meal_options: MealImportOptions,
    ) -> Self {
        Self {
            store,
            recipes,
            cuisines,
            meal_options,
        }
    }

    pub fn store(&self) -> Result<&Arc<dyn Datastore>, ApiError> {
        self.store.as_ref().ok_or_else(|| {
            ApiError::Config(format!(
                "Datastore not configured: set one of {}",
                DB_URL_KEYS.join(", ")
            ))
        })
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    pub fn cuisines(&self) -> &CuisineMap {
        &self.cuisines
    }

    pub fn meal_importer(&self) -> Result<MealImporter, ApiError> {
        Ok(MealImporter::new(
            self.store()?.clone(),
            self.recipes.clone(),
            self.cuisines.clone(),
            self.meal_options.clone(),
        ))
    }
}
