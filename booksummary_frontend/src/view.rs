//! HTML rendering of the search and summary pages from store state.
//!
//! Pages are askama templates, so every plain string is escaped. Model-produced
//! prose fields (idea in brief, takeaways, section contents, descriptions,
//! analysis, answers) are markdown and go through `pulldown-cmark` first, with
//! raw HTML turned back into text and only web links kept.

use askama::Template;
use pulldown_cmark::{html, CowStr, Event, Parser, Tag};

use booksummary_api::api::{BookSearchResult, BookSummary};

use crate::store::SummaryState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocSection {
    pub id: String,
    pub title: String,
    pub subsections: Vec<TocEntry>,
}

impl TocSection {
    fn new(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            subsections: vec![],
        }
    }
}

/// Sections of the summary document, ids match the anchors of [`render_summary_page`]
pub fn table_of_contents(summary: &BookSummary) -> Vec<TocSection> {
    let mut sections = vec![
        TocSection::new("idea-in-brief", "Idea in Brief"),
        TocSection::new("key-takeaways", "Key Takeaways"),
    ];

    if let Some(plot_summary) = &summary.plot_summary {
        sections.push(TocSection {
            subsections: plot_summary
                .sections
                .iter()
                .enumerate()
                .map(|(idx, section)| TocEntry {
                    id: format!("plot-{idx}"),
                    title: section.title.clone(),
                })
                .collect(),
            ..TocSection::new("plot-summary", "Plot Summary")
        });
    }
    if let Some(characters) = &summary.characters {
        sections.push(TocSection {
            subsections: characters
                .iter()
                .enumerate()
                .map(|(idx, character)| TocEntry {
                    id: format!("char-{idx}"),
                    title: character.name.clone(),
                })
                .collect(),
            ..TocSection::new("characters", "Characters")
        });
    }
    if summary.plot_devices.is_some() {
        sections.push(TocSection::new("plot-devices", "Plot Devices"));
    }
    if summary.analysis.is_some() {
        sections.push(TocSection::new("analysis", "Analysis"));
    }
    if summary.faq.is_some() {
        sections.push(TocSection::new("faq", "FAQ"));
    }
    sections
}

/// Location of the results page for a query typed in the search bar, None for a blank query
pub fn search_page_path(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", query)
        .finish();
    Some(format!("/search?{encoded}"))
}

pub fn summary_page_path(book_title: &str) -> String {
    // byte_serialize turns spaces into '+' and literal '+' into %2B
    let encoded: String = url::form_urlencoded::byte_serialize(book_title.as_bytes()).collect();
    format!("/summary/{}", encoded.replace('+', "%20"))
}

#[derive(Template)]
#[template(path = "loader.html")]
struct LoaderTemplate<'a> {
    action: &'a str,
    subject: &'a str,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
}

struct BookCard<'a> {
    book: &'a BookSearchResult,
    href: String,
}

#[derive(Template)]
#[template(path = "search_results.html")]
struct SearchResultsTemplate<'a> {
    query: &'a str,
    noun: &'a str,
    cards: Vec<BookCard<'a>>,
}

/// Rendered markdown body under a plain text heading
struct Block {
    id: String,
    heading: String,
    body: String,
}

#[derive(Template)]
#[template(path = "summary.html")]
struct SummaryTemplate<'a> {
    book: &'a BookSummary,
    meta: Vec<&'a str>,
    toc: Vec<TocSection>,
    idea_in_brief: String,
    key_takeaways: Vec<String>,
    plot_sections: Option<Vec<Block>>,
    characters: Option<Vec<Block>>,
    plot_devices: Option<Vec<Block>>,
    analysis: Option<Vec<Block>>,
    faq: Option<Vec<Block>>,
}

pub fn render_search_page(state: &SummaryState, query: &str) -> askama::Result<String> {
    if state.is_searching() {
        return LoaderTemplate {
            action: "Searching for",
            subject: query,
        }
        .render();
    }
    if let Some(error) = &state.search_error {
        return ErrorTemplate { message: error }.render();
    }

    SearchResultsTemplate {
        query,
        noun: if state.search_results.len() == 1 {
            "book"
        } else {
            "books"
        },
        cards: state
            .search_results
            .iter()
            .map(|book| BookCard {
                book,
                href: summary_page_path(&book.title),
            })
            .collect(),
    }
    .render()
}

/// Empty string when there is no book to show and nothing is loading
pub fn render_summary_page(state: &SummaryState, book_title: &str) -> askama::Result<String> {
    if state.is_loading() {
        return LoaderTemplate {
            action: "Reading",
            subject: book_title,
        }
        .render();
    }
    if let Some(error) = &state.summary_error {
        return ErrorTemplate { message: error }.render();
    }
    let Some(book) = &state.current_book else {
        return Ok(String::new());
    };

    SummaryTemplate {
        book,
        meta: [book.year.as_deref(), book.read_time.as_deref()]
            .into_iter()
            .flatten()
            .collect(),
        toc: table_of_contents(book),
        idea_in_brief: markdown(&book.idea_in_brief),
        key_takeaways: book.key_takeaways.iter().map(|point| markdown(point)).collect(),
        plot_sections: book.plot_summary.as_ref().map(|plot_summary| {
            plot_summary
                .sections
                .iter()
                .enumerate()
                .map(|(idx, section)| Block {
                    id: format!("plot-{idx}"),
                    heading: section.title.clone(),
                    body: markdown(&section.content),
                })
                .collect()
        }),
        characters: book.characters.as_ref().map(|characters| {
            characters
                .iter()
                .enumerate()
                .map(|(idx, character)| Block {
                    id: format!("char-{idx}"),
                    heading: character.name.clone(),
                    body: markdown(&character.description),
                })
                .collect()
        }),
        plot_devices: book.plot_devices.as_ref().map(|devices| {
            devices
                .iter()
                .map(|device| Block {
                    id: String::new(),
                    heading: device.name.clone(),
                    body: markdown(&device.description),
                })
                .collect()
        }),
        analysis: book.analysis.as_ref().map(|analysis| {
            [
                ("Writing Style", &analysis.writing_style),
                ("Psychological Depth", &analysis.psychological_depth),
                ("Emotional Impact", &analysis.emotional_impact),
            ]
            .into_iter()
            .map(|(heading, text)| Block {
                id: String::new(),
                heading: heading.to_string(),
                body: markdown(text),
            })
            .collect()
        }),
        faq: book.faq.as_ref().map(|faq| {
            faq.iter()
                .map(|entry| Block {
                    id: String::new(),
                    heading: entry.question.clone(),
                    body: markdown(&entry.answer),
                })
                .collect()
        }),
    }
    .render()
}

fn markdown(text: &str) -> String {
    let events = Parser::new(text).map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: web_url(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: web_url(dest_url),
            title,
            id,
        }),
        event => event,
    });

    let mut out = String::new();
    html::push_html(&mut out, events);
    out
}

/// Keeps http(s), mailto and in-page targets, anything else becomes an empty link
fn web_url(url: CowStr<'_>) -> CowStr<'_> {
    let lowered = url.trim().to_ascii_lowercase();
    let allowed = ["http://", "https://", "mailto:", "#", "/"]
        .iter()
        .any(|prefix| lowered.starts_with(prefix));
    if allowed {
        url
    } else {
        CowStr::Borrowed("")
    }
}
