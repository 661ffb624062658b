//! HTTP handlers and route configuration.

mod auth;
mod author;
mod health;
mod posts;
mod upload;
mod views;

use actix_web::web;

use crate::middleware::auth::RequireAuth;
use crate::middleware::error::AppError;

/// Route extractor failures through the JSON error body.
fn extractor_configs() -> (web::JsonConfig, web::PathConfig, web::QueryConfig) {
    let json = web::JsonConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid request body: {}", err)).into()
    });
    let path = web::PathConfig::default()
        .error_handler(|_err, _req| AppError::NotFound("Resource not found".to_string()).into());
    let query = web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("Invalid query string: {}", err)).into()
    });
    (json, path, query)
}

/// Configure all application routes under `/api/v1`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    let (json, path, query) = extractor_configs();

    cfg.service(
        web::scope("/api/v1")
            .app_data(json)
            .app_data(path)
            .app_data(query)
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/login", web::post().to(auth::login)),
            )
            .service(
                web::scope("/posts")
                    .service(
                        web::resource(["", "/"])
                            .route(web::get().to(posts::list_posts))
                            .route(web::post().to(posts::create_post).wrap(RequireAuth)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(posts::get_post))
                            .route(web::put().to(posts::update_post).wrap(RequireAuth))
                            .route(web::delete().to(posts::delete_post).wrap(RequireAuth)),
                    ),
            )
            .route("/author/{id}", web::get().to(author::get_author))
            .service(
                web::scope("/upload")
                    .wrap(RequireAuth)
                    .route("", web::post().to(upload::upload_file))
                    .route("/", web::post().to(upload::upload_file)),
            ),
    );
}
