use std::sync::Arc;

use crate::api::{BookSearchResult, BookSummary};
use crate::cover_resolver::{resolve_cover, resolve_covers, CoverResolver};
use crate::generative_model::{GenerativeModel, GenerativeModelError};
use crate::model_output::{parse_search_results, parse_summary, ModelOutputError};
use crate::prompts::{search_prompt, summary_prompt};

#[derive(thiserror::Error, Debug)]
pub enum SummaryServiceError {
    #[error("Query is required")]
    MissingQuery,

    #[error("Book title is required")]
    MissingBookTitle,

    #[error("GOOGLE_API_KEY is not configured on the server.")]
    MissingCredential,

    #[error("Failed to generate search results.")]
    MalformedSearchResults(#[source] ModelOutputError),

    #[error("Failed to generate book summary.")]
    MalformedSummary(#[source] ModelOutputError),

    #[error("{0}")]
    RateLimited(String),

    #[error("{0}")]
    Upstream(String),
}

impl From<GenerativeModelError> for SummaryServiceError {
    fn from(err: GenerativeModelError) -> Self {
        match err {
            GenerativeModelError::MissingCredential => Self::MissingCredential,
            GenerativeModelError::RateLimited(message) => Self::RateLimited(message),
            other => Self::Upstream(other.to_string()),
        }
    }
}

impl SummaryServiceError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::MissingQuery | Self::MissingBookTitle => 400,
            Self::RateLimited(_) => 429,
            Self::MissingCredential
            | Self::MalformedSearchResults(_)
            | Self::MalformedSummary(_)
            | Self::Upstream(_) => 500,
        }
    }
}

/// Search and summarize flows: prompt the model, parse its answer strictly, attach covers
pub struct BookSummaryService {
    model: Arc<dyn GenerativeModel + Send + Sync>,
    cover_resolver: Arc<dyn CoverResolver + Send + Sync>,
}

impl BookSummaryService {
    pub fn new(
        model: Arc<dyn GenerativeModel + Send + Sync>,
        cover_resolver: Arc<dyn CoverResolver + Send + Sync>,
    ) -> Self {
        Self {
            model,
            cover_resolver,
        }
    }

    pub async fn search_books(
        &self,
        query: Option<&str>,
    ) -> Result<Vec<BookSearchResult>, SummaryServiceError> {
        let query = non_blank(query).ok_or(SummaryServiceError::MissingQuery)?;
        self.ensure_configured()?;

        let text = self.model.generate(&search_prompt(query)).await?;
        tracing::debug!("Raw model search response: {}", text);

        let mut books = parse_search_results(&text).map_err(|err| {
            tracing::error!("Failed to parse model search results ({}): {}", err, text);
            SummaryServiceError::MalformedSearchResults(err)
        })?;

        let titles_and_authors: Vec<(&str, &str)> = books
            .iter()
            .map(|book| (book.title.as_str(), book.author.as_str()))
            .collect();
        let covers = resolve_covers(self.cover_resolver.as_ref(), &titles_and_authors).await;

        for (book, cover) in books.iter_mut().zip(covers) {
            book.cover_image = cover;
        }
        tracing::info!("Found {} books for query {:?}", books.len(), query);
        Ok(books)
    }

    pub async fn summarize_book(
        &self,
        book_title: Option<&str>,
    ) -> Result<BookSummary, SummaryServiceError> {
        let book_title = non_blank(book_title).ok_or(SummaryServiceError::MissingBookTitle)?;
        self.ensure_configured()?;

        let text = self.model.generate(&summary_prompt(book_title)).await?;
        tracing::debug!("Raw model summary response: {}", text);

        let mut summary = parse_summary(&text).map_err(|err| {
            tracing::error!("Failed to parse model summary ({}): {}", err, text);
            SummaryServiceError::MalformedSummary(err)
        })?;

        summary.cover_image = resolve_cover(
            self.cover_resolver.as_ref(),
            &summary.title,
            &summary.author,
        )
        .await;
        tracing::info!("Summarized {:?} by {}", summary.title, summary.author);
        Ok(summary)
    }

    fn ensure_configured(&self) -> Result<(), SummaryServiceError> {
        if self.model.is_configured() {
            Ok(())
        } else {
            Err(SummaryServiceError::MissingCredential)
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
