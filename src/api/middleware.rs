// Request logging, compression and CORS.

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::middleware::{Compress, Logger};

pub fn setup_middleware() -> (Logger, Compress) {
    let logger = Logger::new("%a \"%r\" %s %b %Dms");
    let compress = Compress::default();
    (logger, compress)
}

/// Browser origins come from `ALLOWED_ORIGINS`; requests without an Origin header pass.
pub fn setup_cors(allowed_origins: &[String]) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "OPTIONS"])
        .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
        .max_age(3600);

    for origin in allowed_origins {
        cors = cors.allowed_origin(origin.trim());
    }

    cors
}
