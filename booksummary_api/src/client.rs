use anyhow::{bail, Context};
use reqwest::header::CACHE_CONTROL;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_tracing::TracingMiddleware;

use crate::api::{
    BookSearchResult, BookSummary, ErrorResponse, SearchBooksResponse, SummarizeRequest,
};

pub struct BookSummaryClient {
    url: String,
    client: ClientWithMiddleware,
}

impl BookSummaryClient {
    pub fn new(url: &str) -> anyhow::Result<Self> {
        let reqwest_client = reqwest::Client::builder()
            .build()
            .context("Failed to build reqwest client")?;
        let client = ClientBuilder::new(reqwest_client)
            // Insert the tracing middleware
            .with(TracingMiddleware::default())
            .build();

        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Calls GET /api/search?q={query} endpoint
    /// Returns candidate books, each with a cover if one was found
    pub async fn search_books(&self, query: &str) -> anyhow::Result<Vec<BookSearchResult>> {
        let response = self
            .client
            .get(format!("{}/api/search", self.url))
            .query(&[("q", query)])
            .send()
            .await?;

        if response.status().is_success() {
            let body: SearchBooksResponse = response.json().await?;
            Ok(body.books)
        } else {
            bail!(error_message(response, "Failed to search books").await)
        }
    }

    /// Calls POST /api/summarize endpoint
    pub async fn summarize(&self, book_title: &str) -> anyhow::Result<BookSummary> {
        let response = self
            .client
            .post(format!("{}/api/summarize", self.url))
            .header(CACHE_CONTROL, "no-cache")
            .json(&SummarizeRequest {
                book_title: Some(book_title.to_string()),
            })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            bail!(error_message(response, "Failed to fetch summary").await)
        }
    }
}

/// Message from the `{ error }` body, or the fallback when the body has none
async fn error_message(response: reqwest::Response, fallback: &str) -> String {
    response
        .json::<ErrorResponse>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| fallback.to_string())
}
