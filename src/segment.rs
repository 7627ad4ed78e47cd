//! Splitting chapter text into length-bounded passages.
//!
//! A deterministic single-pass greedy algorithm: paragraphs are accumulated
//! until the running candidate lands inside `[min_length, max_length]`, with
//! a sentence-level fallback for paragraphs that overshoot the maximum on
//! their own. Lengths are measured in characters, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::ParseConfig;

const PARAGRAPH_BREAK: &str = "\n\n";

static RE_PARAGRAPH_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n+").unwrap());
static RE_LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n+").unwrap());
// Sentence end: terminal punctuation, optional closing quote, then spacing.
// The punctuation and quote stay attached to the preceding sentence.
static RE_SENTENCE_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([.!?]["'”’]?)\s+"#).unwrap());

/// Split one chapter's normalized content into ordered passages.
///
/// Every passage length falls within the configured bounds except for two
/// documented cases: a trailing leftover with no earlier passage to merge
/// into may run short, and a single sentence longer than the maximum is
/// emitted whole — sentence integrity wins over the hard cap. Every
/// non-blank input produces at least one passage.
pub fn split_passages(content: &str, config: &ParseConfig) -> Vec<String> {
    let text = content.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let min = config.passage_min_length;
    let max = config.passage_max_length;

    let mut passages: Vec<String> = Vec::new();
    let mut current = String::new();

    for paragraph in RE_PARAGRAPH_SPLIT.split(text) {
        let paragraph = paragraph.trim();
        if paragraph.is_empty() {
            continue;
        }

        let candidate = if current.is_empty() {
            paragraph.to_string()
        } else {
            format!("{current}{PARAGRAPH_BREAK}{paragraph}")
        };
        let len = char_len(&candidate);

        if (min..=max).contains(&len) {
            passages.push(candidate);
            current.clear();
        } else if len > max {
            if char_len(&current) >= min {
                // Flush what we have; the paragraph starts a fresh
                // accumulator and is re-tested on the next round.
                passages.push(std::mem::take(&mut current));
                current = paragraph.to_string();
            } else if current.is_empty() {
                // A single paragraph already exceeds the maximum.
                split_oversized(paragraph, min, max, &mut passages);
            } else {
                // Too short to flush, too long combined: sentence-split the
                // whole candidate.
                split_oversized(&candidate, min, max, &mut passages);
                current.clear();
            }
        } else {
            current = candidate;
        }
    }

    flush_remainder(current, PARAGRAPH_BREAK, min, &mut passages);
    passages
}

/// Sentence-level fallback for paragraph groups that exceed the maximum.
fn split_oversized(text: &str, min: usize, max: usize, passages: &mut Vec<String>) {
    let mut current = String::new();

    for sentence in split_sentences(text) {
        let candidate = if current.is_empty() {
            sentence.clone()
        } else {
            format!("{current} {sentence}")
        };
        let len = char_len(&candidate);

        if (min..=max).contains(&len) {
            passages.push(candidate);
            current.clear();
        } else if len > max {
            if char_len(&current) >= min {
                passages.push(std::mem::take(&mut current));
                current = sentence;
            } else {
                // The sentence itself is overlong; emit it whole rather
                // than splitting inside a sentence.
                passages.push(candidate);
                current.clear();
            }
        } else {
            current = candidate;
        }
    }

    flush_remainder(current, " ", min, passages);
}

/// Emit or merge whatever is left in the accumulator: an undersized
/// remainder joins the previous passage when one exists, otherwise it
/// stands alone.
fn flush_remainder(current: String, separator: &str, min: usize, passages: &mut Vec<String>) {
    if current.is_empty() {
        return;
    }
    match passages.last_mut() {
        Some(last) if char_len(&current) < min => {
            last.push_str(separator);
            last.push_str(&current);
        }
        _ => passages.push(current),
    }
}

/// Split a paragraph group into sentences, flattening internal line breaks
/// and keeping each delimiter attached to its sentence.
fn split_sentences(text: &str) -> Vec<String> {
    let flattened = RE_LINE_BREAKS.replace_all(text, " ").into_owned();
    let mut sentences = Vec::new();
    let mut start = 0;

    for cap in RE_SENTENCE_BOUNDARY.captures_iter(&flattened) {
        let Some(delimiter) = cap.get(1) else { continue };
        let Some(whole) = cap.get(0) else { continue };
        let sentence = flattened[start..delimiter.end()].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = whole.end();
    }

    let tail = flattened[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
