// HTTP request handlers for API endpoints

use crate::api::error::ApiError;
use crate::api::models::{HealthResponse, PopulateAllMealsResponse, PopulateMealsResponse};
use crate::api::state::AppState;
use actix_web::{web, HttpResponse};

/// Health check endpoint
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let database = match state.store() {
        Ok(store) if store.ping().await => "connected",
        Ok(_) => "disconnected",
        Err(_) => "unconfigured",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Active cuisine mapping, in populate order.
pub async fn list_cuisines(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.cuisines().entries())
}

/// Name, cca3 and flag for every stored country.
pub async fn list_countries(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let rows = state
        .store()?
        .list_countries()
        .await
        .map_err(|e| ApiError::internal("Failed to fetch countries", e))?;
    Ok(HttpResponse::Ok().json(rows))
}

/// Full country record by exact common name.
pub async fn get_country(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let name = path.into_inner();
    let country = state
        .store()?
        .country_by_name(&name)
        .await
        .map_err(|e| ApiError::internal("Server error", e))?
        .ok_or_else(|| ApiError::NotFound("Country not found".to_string()))?;
    Ok(HttpResponse::Ok().json(country))
}

/// Stored meals for a country.
pub async fn list_meals(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let name = path.into_inner();
    let store = state.store()?;
    let country_id = store
        .country_id_by_name(&name)
        .await
        .map_err(|e| ApiError::internal("Server error", e))?
        .ok_or_else(|| ApiError::NotFound("Country not found".to_string()))?;
    let meals = store
        .meals_for_country(country_id)
        .await
        .map_err(|e| ApiError::internal("Failed to fetch meals", e))?;
    Ok(HttpResponse::Ok().json(meals))
}

/// Run the meal importer for one country.
pub async fn populate_meals(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let country = path.into_inner();
    // Reject unmapped names before touching configuration, network or datastore.
    if state.cuisines().cuisine_for(&country).is_none() {
        return Err(ApiError::BadRequest(
            "Cuisine not found for this country".to_string(),
        ));
    }

    tracing::info!(%country, "meal import requested");
    let summary = state.meal_importer()?.populate_meals(&country).await?;

    Ok(HttpResponse::Ok().json(PopulateMealsResponse {
        message: format!("Meals for {country} populated successfully"),
        summary,
    }))
}

/// Run the meal importer for every mapped country; per-country failures stay in the body.
pub async fn populate_all_meals(state: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    tracing::info!("meal import requested for all mapped countries");
    let report = state.meal_importer()?.populate_all_meals().await;

    Ok(HttpResponse::Ok().json(PopulateAllMealsResponse {
        message: "Meals populated for all countries".to_string(),
        report,
    }))
}
