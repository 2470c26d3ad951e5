use actix_web::http::StatusCode;
use actix_web::web::Data;
use actix_web::Error;
use actix_web::HttpResponse;
use paperclip::actix::{
    api_v2_operation,
    web::{self},
};

use crate::api::{ErrorResponse, SearchBooksQuery, SearchBooksResponse, SummarizeRequest};
use crate::summary_service::{BookSummaryService, SummaryServiceError};

#[api_v2_operation]
pub async fn health() -> Result<HttpResponse, Error> {
    Ok(HttpResponse::Ok().finish())
}

#[api_v2_operation]
/// Returns 5-8 candidate books for a title, author or genre query
pub async fn search_books(
    service: Data<BookSummaryService>,
    query: web::Query<SearchBooksQuery>,
) -> Result<HttpResponse, Error> {
    Ok(match service.search_books(query.q.as_deref()).await {
        Ok(books) => HttpResponse::Ok().json(SearchBooksResponse { books }),
        Err(err) => error_response("Search books", err),
    })
}

#[api_v2_operation]
/// Returns the structured summary of a book together with its cover
pub async fn summarize_book(
    service: Data<BookSummaryService>,
    request: web::Json<SummarizeRequest>,
) -> Result<HttpResponse, Error> {
    Ok(
        match service.summarize_book(request.book_title.as_deref()).await {
            Ok(summary) => HttpResponse::Ok().json(summary),
            Err(err) => error_response("Summarize book", err),
        },
    )
}

fn error_response(operation: &str, err: SummaryServiceError) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    if status.is_server_error() {
        tracing::error!("{} failed {}", operation, err);
    } else {
        tracing::warn!("{} rejected {}", operation, err);
    }
    HttpResponse::build(status).json(ErrorResponse {
        error: err.to_string(),
    })
}
