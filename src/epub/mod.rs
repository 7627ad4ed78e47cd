//! EPUB ingestion: container parsing and the chapter pipeline entry points.

mod archive;
mod cover;
mod nav;
mod opf;

pub use archive::Archive;
pub use cover::resolve_cover;
pub use nav::find_body_start;
pub use opf::{GuideReference, ManifestItem, OpfData, PackageMetadata, parse_opf};

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use tracing::info;

use crate::book::ParseResult;
use crate::config::ParseConfig;
use crate::error::Result;
use crate::extract::{extract_chapters, merge_short_chapters};

pub const UNKNOWN_TITLE: &str = "Unknown Title";
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Parse a packaged book from disk.
///
/// # Example
///
/// ```no_run
/// use verbatim_core::{ParseConfig, parse_book};
///
/// let config = ParseConfig::default();
/// let book = parse_book("path/to/book.epub", &config)?;
/// println!("{} by {}", book.title, book.author);
/// # Ok::<(), verbatim_core::ParseError>(())
/// ```
pub fn parse_book<P: AsRef<Path>>(path: P, config: &ParseConfig) -> Result<ParseResult> {
    let file = File::open(path)?;
    parse_book_from_reader(file, config)
}

/// Parse a packaged book from any [`Read`] + [`Seek`] source, such as an
/// in-memory upload buffer.
///
/// The reader is held for the duration of the parse and released on every
/// exit path. The whole pipeline runs here: package parse, cover
/// resolution, body-start location, chapter extraction and merging.
pub fn parse_book_from_reader<R: Read + Seek>(
    reader: R,
    config: &ParseConfig,
) -> Result<ParseResult> {
    let mut archive = Archive::open(reader)?;

    let title = archive
        .metadata
        .title
        .clone()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string());
    let author = archive
        .metadata
        .creator
        .clone()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

    let cover = resolve_cover(&mut archive);
    let body_start = find_body_start(&mut archive);

    let chapters = extract_chapters(&mut archive, body_start.as_deref(), config);
    let chapters = merge_short_chapters(chapters, config.chapter_min_length);

    info!(%title, chapters = chapters.len(), "parsed book");

    Ok(ParseResult {
        title,
        author,
        cover,
        chapters,
    })
}
