//! Chapter extraction: the spine walk that turns content documents into
//! normalized, deduplicated chapters.

use std::collections::HashSet;
use std::io::{Read, Seek};

use scraper::Html;
use tracing::debug;

use crate::book::Chapter;
use crate::config::ParseConfig;
use crate::dom;
use crate::epub::Archive;
use crate::normalize::normalize;
use crate::util::titleize;

/// Heading candidates for a chapter title, most specific first.
const TITLE_TAGS: &[&str] = &["h1", "h2", "h3", "title"];
/// Block-level and line-break elements for the no-paragraphs fallback walk.
const BLOCK_TAGS: &[&str] = &["div", "p", "br"];

/// Walk the spine in order and produce one chapter per surviving item.
///
/// Items are dropped when they are not HTML-family, come before the
/// body-start cutoff, match a configured skip title, extract to nothing, or
/// duplicate content already seen in this parse. A single malformed item
/// never aborts the walk.
pub fn extract_chapters<R: Read + Seek>(
    archive: &mut Archive<R>,
    body_start: Option<&str>,
    config: &ParseConfig,
) -> Vec<Chapter> {
    let mut chapters = Vec::new();
    let mut seen_content: HashSet<String> = HashSet::new();
    // With no landmark to anchor on, the whole spine is main content
    let mut found_start = body_start.is_none();

    let spine = archive.spine.clone();
    for idref in spine {
        let Some(item) = archive.item(&idref) else {
            continue;
        };
        if !item.media_type.contains("html") {
            continue;
        }
        let href = item.href.clone();

        if let Some(start) = body_start
            && !found_start
            && href.contains(start)
        {
            found_start = true;
        }
        if !found_start {
            debug!(%href, "skipping front matter");
            continue;
        }

        let content = match archive.read_item_text(&idref) {
            Ok(content) => content,
            Err(err) => {
                debug!(%href, "unreadable spine item: {err}");
                continue;
            }
        };
        let doc = dom::parse_html(&content);

        let title = chapter_title(&doc).unwrap_or_else(|| titleize(&idref));
        if let Some(matcher) = config.skip_matcher()
            && matcher.is_match(&title)
        {
            debug!(%href, %title, "skipping chapter by title");
            continue;
        }

        let text = body_text(&doc);
        if text.trim().is_empty() {
            debug!(%href, "no extractable text");
            continue;
        }

        let text = normalize(&text, &config.replacements);
        if text.is_empty() {
            continue;
        }

        // Some packages repeat spine content; keep the first occurrence
        let mut hasher = sha1_smol::Sha1::new();
        hasher.update(text.as_bytes());
        if !seen_content.insert(hasher.digest().to_string()) {
            debug!(%href, "duplicate content");
            continue;
        }

        chapters.push(Chapter::new(title, text));
    }

    chapters
}

/// Fold undersized chapters into their successor, left to right.
///
/// The accumulator is emitted once it reaches `min_length`; whatever is
/// left at the end is emitted even if still short, so a trailing stub is
/// never silently dropped.
pub fn merge_short_chapters(chapters: Vec<Chapter>, min_length: usize) -> Vec<Chapter> {
    let mut iter = chapters.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for chapter in iter {
        if current.content.chars().count() < min_length {
            current = Chapter::new(
                join_titles(&current.title, &chapter.title),
                format!("{} {}", current.content, chapter.content)
                    .trim()
                    .to_string(),
            );
        } else {
            merged.push(std::mem::replace(&mut current, chapter));
        }
    }
    merged.push(current);
    merged
}

fn join_titles(first: &str, second: &str) -> String {
    let parts: Vec<&str> = [first, second]
        .into_iter()
        .filter(|t| !t.trim().is_empty())
        .collect();
    parts.join(" - ")
}

/// Chapter title: the first heading with any text, in tag preference
/// order; `None` when no candidate has text.
fn chapter_title(doc: &Html) -> Option<String> {
    for tag in TITLE_TAGS {
        if let Some(el) = dom::find_first(doc, tag) {
            let text = dom::text_content(el, &[]);
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Body text extraction policy, in priority order: paragraph elements,
/// then a block/line-break walk, then the whole body as one paragraph.
/// Paragraphs are joined with a blank line.
fn body_text(doc: &Html) -> String {
    let Some(body) = dom::find_first(doc, "body") else {
        return String::new();
    };

    let mut paragraphs: Vec<String> = dom::find_all(body, &["p"], dom::EXCLUDED_TAGS)
        .into_iter()
        .map(|p| dom::text_content(p, dom::EXCLUDED_TAGS))
        .filter(|text| !text.is_empty())
        .collect();

    if paragraphs.is_empty() {
        for el in dom::find_all(body, BLOCK_TAGS, dom::EXCLUDED_TAGS) {
            if el.value().name() == "br" {
                // Placeholder paragraph; dropped before joining
                paragraphs.push(String::new());
            } else {
                let text = dom::text_content(el, dom::EXCLUDED_TAGS);
                if !text.is_empty() {
                    paragraphs.push(text);
                }
            }
        }
    }

    if paragraphs.is_empty() {
        return dom::text_content(body, dom::EXCLUDED_TAGS);
    }

    paragraphs.retain(|p| !p.is_empty());
    paragraphs.join("\n\n")
}
