// API request/response models (DTOs)

use serde::{Deserialize, Serialize};

use crate::database_ops::mealdb::{AllMealsReport, MealImportSummary};

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Body of `GET /populate-meals/{country}`.
#[derive(Debug, Serialize)]
pub struct PopulateMealsResponse {
    pub message: String,
    pub summary: MealImportSummary,
}

/// Body of `GET /populate-all-meals`: per-country outcomes plus totals.
#[derive(Debug, Serialize)]
pub struct PopulateAllMealsResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: AllMealsReport,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}
