//! Parse output data model.

/// One logical unit of extracted, normalized, deduplicated content.
///
/// `content` uses `\n\n` as the canonical paragraph separator, carries no
/// leading or trailing whitespace and is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub title: String,
    pub content: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Raw cover image bytes plus enough metadata to store them as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    pub data: Vec<u8>,
    pub media_type: String,
    pub filename: String,
}

/// The externally visible result of ingesting a packaged book.
///
/// Chapters appear in spine order. Missing metadata degrades to
/// `"Unknown Title"` / `"Unknown Author"` rather than failing the parse.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub title: String,
    pub author: String,
    pub cover: Option<CoverImage>,
    pub chapters: Vec<Chapter>,
}
