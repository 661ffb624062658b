//! CORS policy: a single trusted origin, credentials allowed.

use actix_cors::Cors;
use actix_web::http::{Method, header};

pub fn cors(origin: &str) -> Cors {
    Cors::default()
        .allowed_origin(origin)
        .allowed_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allowed_headers([header::ORIGIN, header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_LENGTH])
        .supports_credentials()
        .max_age(12 * 3600)
}
