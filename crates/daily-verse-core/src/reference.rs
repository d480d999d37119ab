//! Citation parsing.
//!
//! Bible Gateway hands out compact display citations such as `"Rev 3:14,20"` or
//! `"1 John 1:8-10, 2:1-2"`. The passage endpoint only reliably renders one
//! contiguous passage per request, so the citation is expanded into one
//! reference per comma/semicolon separated piece before fetching.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s+(\d+):(.*)$").unwrap());

static CHAPTER_VERSES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+):([^:]+)$").unwrap());

/// A single `book chapter:verses` location that can be looked up directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageRef {
    pub book: String,
    pub chapter: u32,
    /// Single verse, hyphenated range, or `None` for a whole chapter.
    pub verses: Option<String>,
}

impl PassageRef {
    pub fn new(book: &str, chapter: u32, verses: Option<&str>) -> Self {
        Self {
            book: book.to_string(),
            chapter,
            verses: verses.map(|v| v.to_string()),
        }
    }
}

impl fmt::Display for PassageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.verses {
            Some(verses) => write!(f, "{} {}:{}", self.book, self.chapter, verses),
            None => write!(f, "{} {}", self.book, self.chapter),
        }
    }
}

/// Expand a display citation into individually fetchable references.
///
/// - `"Rev 3:14,20"` -> `["Rev 3:14", "Rev 3:20"]`
/// - `"1 John 1:8-10, 2:1-2"` -> `["1 John 1:8-10", "1 John 2:1-2"]`
/// - `"John 3:16-18"` -> `["John 3:16-18"]`
/// - `"Psalm 23"` -> `["Psalm 23"]`
///
/// An empty citation yields no references. Anything that cannot be
/// understood is passed through untouched as a single reference.
pub fn parse_citation(citation: &str) -> Vec<String> {
    let citation = citation.trim();
    if citation.is_empty() {
        return Vec::new();
    }

    let mut expanded = Vec::new();
    for part in citation.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        match expand_part(part) {
            Some(refs) => expanded.extend(refs.iter().map(PassageRef::to_string)),
            None => expanded.push(part.to_string()),
        }
    }

    if expanded.is_empty() {
        expanded.push(citation.to_string());
    }
    expanded
}

/// Expand one `;`-separated piece. `None` means "pass it through as is".
fn expand_part(part: &str) -> Option<Vec<PassageRef>> {
    let caps = SEGMENT_RE.captures(part)?;
    let book = caps[1].trim();
    let mut chapter: u32 = caps[2].parse().ok()?;
    let rest = caps[3].trim();

    let segments: Vec<&str> = rest
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if segments.len() <= 1 {
        return Some(vec![PassageRef::new(book, chapter, Some(rest))]);
    }

    let mut refs = Vec::with_capacity(segments.len());
    for segment in segments {
        if segment.contains(':') {
            // A segment carrying its own chapter; later bare verses inherit it
            let caps = CHAPTER_VERSES_RE.captures(segment)?;
            chapter = caps[1].parse().ok()?;
            refs.push(PassageRef::new(book, chapter, Some(caps[2].trim())));
        } else {
            refs.push(PassageRef::new(book, chapter, Some(segment)));
        }
    }
    Some(refs)
}
