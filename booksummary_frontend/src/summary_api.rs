use booksummary_api::api::{BookSearchResult, BookSummary};
use booksummary_api::client::BookSummaryClient;

/// The two calls the store makes against the book summary service
#[async_trait::async_trait]
pub trait SummaryApi {
    async fn search_books(&self, query: &str) -> anyhow::Result<Vec<BookSearchResult>>;
    async fn fetch_summary(&self, book_title: &str) -> anyhow::Result<BookSummary>;
}

#[async_trait::async_trait]
impl SummaryApi for BookSummaryClient {
    async fn search_books(&self, query: &str) -> anyhow::Result<Vec<BookSearchResult>> {
        BookSummaryClient::search_books(self, query).await
    }

    async fn fetch_summary(&self, book_title: &str) -> anyhow::Result<BookSummary> {
        self.summarize(book_title).await
    }
}
