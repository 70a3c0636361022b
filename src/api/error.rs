// Route-boundary error type; every handler returns `Result<HttpResponse, ApiError>`.

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;
use tracing::error;

use crate::api::models::ErrorBody;
use crate::database_ops::mealdb::MealImportError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid server configuration; the message names what to set.
    #[error("{0}")]
    Config(String),

    /// Public message only; the cause is logged where the error is built.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn internal(public: &str, cause: anyhow::Error) -> Self {
        error!(error = %format!("{cause:#}"), "{public}");
        ApiError::Internal(public.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Config(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

impl From<MealImportError> for ApiError {
    fn from(err: MealImportError) -> Self {
        match err {
            MealImportError::CuisineNotFound(_) => {
                ApiError::BadRequest("Cuisine not found for this country".to_string())
            }
            MealImportError::CountryNotFound(_) => {
                ApiError::NotFound("Country not found".to_string())
            }
            MealImportError::Upstream(cause) | MealImportError::Datastore(cause) => {
                ApiError::internal("Failed to populate meals", cause)
            }
        }
    }
}
