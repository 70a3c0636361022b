// API route configuration

use crate::api::handlers;
use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(handlers::health_check))
        .route("/cuisines", web::get().to(handlers::list_cuisines))
        .route("/countries", web::get().to(handlers::list_countries))
        .route("/countries/{country}", web::get().to(handlers::get_country))
        .route("/meals/{country}", web::get().to(handlers::list_meals))
        .route(
            "/populate-meals/{country}",
            web::get().to(handlers::populate_meals),
        )
        .route(
            "/populate-all-meals",
            web::get().to(handlers::populate_all_meals),
        );
}
