//! Strict parsing of the text returned by the generative model.
//!
//! The model is instructed to answer with bare JSON but regularly wraps it in
//! markdown code fences, so every payload is fence-stripped before being
//! deserialized into the typed schema from [`crate::api`] and validated.

use crate::api::{BookSearchResult, BookSummary};

/// Upper bound of candidates asked from the model
pub const MAX_SEARCH_RESULTS: usize = 8;
/// Lower bound of candidates asked from the model
pub const MIN_SEARCH_RESULTS: usize = 5;

#[derive(Debug, thiserror::Error)]
pub enum ModelOutputError {
    #[error("Model output is not valid JSON for the expected schema: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Model output has an empty required field {0}")]
    MissingField(&'static str),

    #[error("Model output contains no candidate books")]
    NoCandidates,
}

/// Removes markdown code fences (```json and ```) and surrounding whitespace
pub fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

pub fn parse_search_results(raw: &str) -> Result<Vec<BookSearchResult>, ModelOutputError> {
    let mut books: Vec<BookSearchResult> = serde_json::from_str(&strip_code_fences(raw))?;

    if books.is_empty() {
        return Err(ModelOutputError::NoCandidates);
    }
    for book in books.iter() {
        require_text("title", &book.title)?;
        require_text("author", &book.author)?;
    }

    if books.len() > MAX_SEARCH_RESULTS {
        tracing::warn!(
            "Model returned {} candidates, keeping first {}",
            books.len(),
            MAX_SEARCH_RESULTS
        );
        books.truncate(MAX_SEARCH_RESULTS);
    } else if books.len() < MIN_SEARCH_RESULTS {
        tracing::warn!("Model returned only {} candidates", books.len());
    }

    // Covers are resolved by us, never trusted from the model
    for book in books.iter_mut() {
        book.cover_image = None;
    }
    Ok(books)
}

pub fn parse_summary(raw: &str) -> Result<BookSummary, ModelOutputError> {
    let mut summary: BookSummary = serde_json::from_str(&strip_code_fences(raw))?;

    require_text("title", &summary.title)?;
    require_text("author", &summary.author)?;
    require_text("ideaInBrief", &summary.idea_in_brief)?;

    summary.cover_image = None;
    Ok(summary)
}

fn require_text(field: &'static str, value: &str) -> Result<(), ModelOutputError> {
    if value.trim().is_empty() {
        Err(ModelOutputError::MissingField(field))
    } else {
        Ok(())
    }
}
