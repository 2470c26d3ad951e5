//! Instruction templates sent to the generative model

use crate::model_output::{MAX_SEARCH_RESULTS, MIN_SEARCH_RESULTS};

pub fn search_prompt(query: &str) -> String {
    format!(
        r#"
Task: Act as a book search engine. Return a list of {MIN_SEARCH_RESULTS}-{MAX_SEARCH_RESULTS} books that match the search query: "{query}".

Instructions:
- If the query looks like an author's name (e.g. "Akshat Gupta"), return their most popular books.
- If it looks like a book title, return matching books.
- If it looks like a genre or topic, return trending books in that category.

Output Format: Return strictly a JSON array of objects. Each object must have:
- title: Full title of the book.
- author: Author's name.
- year: Publication year (string).
- pages: Estimated page count (string, e.g. "300 pages").
- rating: A rating between 3.5 and 5.0 (string, e.g. "4.5").
- ratingCount: Estimated rating count (string, e.g. "2k+ ratings").
- tags: Array of 2-3 short genre tags (e.g. ["History", "Self-help"]).

IMPORTANT: Return ONLY valid JSON. No markdown formatting.
"#
    )
}

pub fn summary_prompt(book_title: &str) -> String {
    format!(
        r#"
Task: Act as a book summary expert. Generate a comprehensive summary for the book: "{book_title}".

Instructions:
- Provide an "Idea in Brief" (1-2 paragraphs).
- Provide 3-5 "Key Takeaways".
- Provide an estimated "Read Time" for this summary (e.g. "12 min read").
- Provide a "Plot Summary" divided into 3-4 sections with titles.
- Provide a list of "Characters" (name and short description).
- Provide a list of "Plot Devices" used (name and short description).
- Provide an "Analysis" covering Writing Style, Psychological Depth, and Emotional Impact.
- Provide 3-4 "FAQ" (question and answer).

Output Format: Return strictly a JSON object. No markdown formatting.
JSON structure:
{{
  "title": "Full Book Title",
  "author": "Author Name",
  "year": "Publication Year",
  "readTime": "String (e.g. '15 min read')",
  "ideaInBrief": "String (Markdown supported)",
  "keyTakeaways": ["String (Markdown supported)", ...],
  "plotSummary": {{
    "sections": [
      {{ "title": "Section Title", "content": "Section Content (Markdown supported)" }},
      ...
    ]
  }},
  "characters": [
    {{ "name": "Character Name", "description": "Description (Markdown supported)" }},
    ...
  ],
  "plotDevices": [
    {{ "name": "Device Name", "description": "Description (Markdown supported)" }},
    ...
  ],
  "analysis": {{
    "writingStyle": "Analysis (Markdown supported)",
    "psychologicalDepth": "Analysis (Markdown supported)",
    "emotionalImpact": "Analysis (Markdown supported)"
  }},
  "faq": [
    {{ "question": "Question", "answer": "Answer (Markdown supported)" }},
    ...
  ]
}}

IMPORTANT: Return ONLY valid JSON. No markdown formatting outside the JSON values.
"#
    )
}
