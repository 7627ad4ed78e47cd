//! Read-only parse configuration.
//!
//! A [`ParseConfig`] is an immutable value object constructed once and passed
//! by reference into every pipeline component. Reloading configuration means
//! constructing a new instance; nothing is ever mutated in place, so parses
//! running concurrently on other threads keep seeing a consistent snapshot.

use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ParseError, Result};

const DEFAULT_PASSAGE_MIN_LENGTH: usize = 150;
const DEFAULT_PASSAGE_MAX_LENGTH: usize = 300;
const DEFAULT_CHAPTER_MIN_LENGTH: usize = 200;

/// Tunables for extraction, merging and passage splitting.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Lower bound for passage length, in characters.
    pub passage_min_length: usize,
    /// Upper bound for passage length, in characters.
    pub passage_max_length: usize,
    /// Chapters shorter than this are merged into their successor.
    pub chapter_min_length: usize,
    /// Chapters whose title whole-word-matches any of these terms
    /// (case-insensitive) are dropped during extraction.
    pub skip_patterns: Vec<String>,
    /// Literal replacements applied in order during normalization.
    pub replacements: Vec<(String, String)>,

    skip_matcher: Option<Regex>,
}

/// On-disk shape of the configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    passage: PassageSection,
    chapter: ChapterSection,
    skip_patterns: Vec<String>,
    replacements: Vec<(String, String)>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct PassageSection {
    min_length: usize,
    max_length: usize,
}

impl Default for PassageSection {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_PASSAGE_MIN_LENGTH,
            max_length: DEFAULT_PASSAGE_MAX_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ChapterSection {
    min_length: usize,
}

impl Default for ChapterSection {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_CHAPTER_MIN_LENGTH,
        }
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self::from_parts(ConfigFile::default())
    }
}

impl ParseConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults; invalid TOML is an error. To pick
    /// up edits, call this again and swap the returned value in — the old
    /// instance stays valid for parses already in flight.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string. Absent keys take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ParseError::Config(e.to_string()))?;
        Ok(Self::from_parts(file))
    }

    fn from_parts(file: ConfigFile) -> Self {
        let replacements: Vec<(String, String)> = file
            .replacements
            .into_iter()
            .filter(|(from, _)| !from.is_empty())
            .collect();
        let skip_matcher = build_skip_matcher(&file.skip_patterns);

        Self {
            passage_min_length: file.passage.min_length,
            passage_max_length: file.passage.max_length,
            chapter_min_length: file.chapter.min_length,
            skip_patterns: file.skip_patterns,
            replacements,
            skip_matcher,
        }
    }

    /// Compiled whole-word matcher for the configured skip terms, if any.
    pub fn skip_matcher(&self) -> Option<&Regex> {
        self.skip_matcher.as_ref()
    }

    pub fn with_passage_bounds(mut self, min_length: usize, max_length: usize) -> Self {
        self.passage_min_length = min_length;
        self.passage_max_length = max_length;
        self
    }

    pub fn with_chapter_min_length(mut self, min_length: usize) -> Self {
        self.chapter_min_length = min_length;
        self
    }

    pub fn with_skip_patterns(mut self, patterns: Vec<String>) -> Self {
        self.skip_matcher = build_skip_matcher(&patterns);
        self.skip_patterns = patterns;
        self
    }

    pub fn with_replacements(mut self, replacements: Vec<(String, String)>) -> Self {
        self.replacements = replacements
            .into_iter()
            .filter(|(from, _)| !from.is_empty())
            .collect();
        self
    }
}

/// Compile the skip terms into one case-insensitive whole-word alternation.
fn build_skip_matcher(patterns: &[String]) -> Option<Regex> {
    let terms: Vec<String> = patterns
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .map(regex::escape)
        .collect();
    if terms.is_empty() {
        return None;
    }
    // Escaped literal terms always compile
    Regex::new(&format!(r"(?i)\b(?:{})\b", terms.join("|"))).ok()
}
