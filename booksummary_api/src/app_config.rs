use actix_web::error::InternalError;
use actix_web::HttpResponse;
use paperclip::actix::web;

use crate::api::ErrorResponse;
use crate::handlers;

pub fn config_app(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/health").route(web::get().to(handlers::health)))
        .service(
            web::scope("/api")
                .service(web::resource("/search").route(web::get().to(handlers::search_books)))
                .service(
                    web::resource("/summarize").route(web::post().to(handlers::summarize_book)),
                ),
        );
}

/// Rejects unreadable request bodies with the same `{ error }` shape as the handlers
pub fn json_config() -> actix_web::web::JsonConfig {
    actix_web::web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("Invalid request body: {err}"),
        });
        InternalError::from_response(err, response).into()
    })
}

/// Rejects unparsable query strings with the same `{ error }` shape as the handlers
pub fn query_config() -> actix_web::web::QueryConfig {
    actix_web::web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(ErrorResponse {
            error: format!("Invalid query string: {err}"),
        });
        InternalError::from_response(err, response).into()
    })
}
