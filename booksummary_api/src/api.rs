use paperclip::actix::Apiv2Schema;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// A candidate book returned by the search endpoint
pub struct BookSearchResult {
    pub title: String,
    pub author: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub year: String,
    /// Estimated page count, e.g. "300 pages"
    #[serde(default, deserialize_with = "string_or_number")]
    pub pages: String,
    /// Rating between 3.5 and 5.0, e.g. "4.5"
    #[serde(default, deserialize_with = "string_or_number")]
    pub rating: String,
    /// Estimated number of ratings, e.g. "2k+ ratings"
    #[serde(default, deserialize_with = "string_or_number")]
    pub rating_count: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    /// Cover thumbnail, null when the catalog had nothing usable
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct PlotSection {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct PlotSummary {
    pub sections: Vec<PlotSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Name and description pair, used both for characters and plot devices
pub struct NamedDescription {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub writing_style: String,
    pub psychological_depth: String,
    pub emotional_impact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
/// Structured summary of a single book.
/// Text fields other than title, author and year may contain markdown.
pub struct BookSummary {
    pub title: String,
    pub author: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "optional_string_or_number"
    )]
    pub year: Option<String>,
    /// Estimated read time of the summary, e.g. "12 min read"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_time: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub idea_in_brief: String,
    pub key_takeaways: Vec<String>,
    /// Free text summary produced by older prompts, kept for compatibility
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_summary: Option<PlotSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Vec<NamedDescription>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_devices: Option<Vec<NamedDescription>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faq: Option<Vec<FaqEntry>>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Apiv2Schema)]
pub struct SearchBooksQuery {
    /// Free text: a title, an author name or a genre
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
pub struct SearchBooksResponse {
    pub books: Vec<BookSearchResult>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, Apiv2Schema)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub book_title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Apiv2Schema)]
/// Body of every non-2xx response
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(serde_json::Number),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(value) => value,
            StringOrNumber::Number(value) => value.to_string(),
        }
    }
}

// The model is asked for strings but sometimes answers `"year": 2018` or `null`
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_string_or_number(deserializer)?.unwrap_or_default())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}
