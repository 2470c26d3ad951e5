use futures_util::stream::{self, StreamExt};

pub use google_books_cover_resolver::GoogleBooksCoverResolver;

mod google_books_cover_resolver;

/// Number of catalog lookups allowed in flight for a single request
pub const MAX_CONCURRENT_COVER_LOOKUPS: usize = 8;

#[async_trait::async_trait]
pub trait CoverResolver {
    /// Looks up a cover image URL, Ok(None) when the catalog knows no cover
    async fn find_cover(&self, title: &str, author: &str) -> anyhow::Result<Option<String>>;
}

/// Best-effort lookup, any failure is logged and turned into None
pub async fn resolve_cover(
    resolver: &(dyn CoverResolver + Send + Sync),
    title: &str,
    author: &str,
) -> Option<String> {
    match resolver.find_cover(title, author).await {
        Ok(cover) => cover,
        Err(err) => {
            tracing::warn!("Failed to resolve cover for {} by {}: {:#}", title, author, err);
            None
        }
    }
}

/// Resolves covers for all (title, author) pairs with bounded concurrency.
/// Returns one entry per input, in input order, after every lookup has settled.
pub async fn resolve_covers(
    resolver: &(dyn CoverResolver + Send + Sync),
    books: &[(&str, &str)],
) -> Vec<Option<String>> {
    stream::iter(books.iter())
        .map(|(title, author)| resolve_cover(resolver, title, author))
        .buffered(MAX_CONCURRENT_COVER_LOOKUPS)
        .collect()
        .await
}
