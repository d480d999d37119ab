//! Passage retrieval and HTML-to-text cleanup.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::source::PassageSource;

/// Elements dropped together with everything inside them.
const SKIPPED_ELEMENTS: &[&str] = &[
    "head", "script", "style", "noscript", "nav", "header", "footer", "h1", "h2", "h3",
];

static SKIPPED_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SKIPPED_ELEMENTS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect()
});

static BODY_START_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<div\b[^>]*\bclass\s*=\s*['"][^'"]*\bpassage-(?:text|content)\b"#).unwrap()
});

static BODY_END_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)<div\b[^>]*\bclass\s*=\s*['"][^'"]*\b(?:footnotes|crossrefs|passage-other-trans|publisher-info-bottom)\b|<footer\b"#,
    )
    .unwrap()
});

// Verse numbers, chapter numbers, footnote and cross-reference markers
static MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<sup\b[^>]*\bclass\s*=\s*['"][^'"]*\b(?:versenum|footnote|crossreference)\b[^'"]*['"][^>]*>.*?</sup\s*>|<span\b[^>]*\bclass\s*=\s*['"][^'"]*\bchapternum\b[^'"]*['"][^>]*>.*?</span\s*>"#,
    )
    .unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static LINE_BREAK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

static BLOCK_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)</?(?:p|div|li|ol|ul|h4|h5|h6|blockquote|table|tr)\b[^>]*>").unwrap()
});

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[A-Za-z][A-Za-z0-9]*);").unwrap());

static READ_FULL_CHAPTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:read full chapter|читать всю главу|читать главу полностью|читать полностью главу)$")
        .unwrap()
});

/// Fetches single references and turns the provider's page into plain text.
#[derive(Clone)]
pub struct PassageFetcher<S> {
    source: S,
}

impl<S: PassageSource> PassageFetcher<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Never fails: a reference that cannot be fetched comes back as `""`
    /// so the other references of the same citation still get through.
    pub async fn fetch(&self, reference: &str, translation: &str) -> String {
        match self.source.passage_html(reference, translation).await {
            Ok(html) => {
                let text = clean_passage_html(&html);
                if text.is_empty() {
                    warn!("No passage text found for \"{}\" ({})", reference, translation);
                } else {
                    debug!("Fetched \"{}\" ({}): {} chars", reference, translation, text.len());
                }
                text
            }
            Err(e) => {
                warn!(
                    "Failed to fetch passage for ref \"{}\" ({}): {:#}",
                    reference, translation, e
                );
                String::new()
            }
        }
    }
}

/// Extract the readable passage from a Bible Gateway passage page.
pub fn clean_passage_html(html: &str) -> String {
    let mut body = passage_body(html).to_string();

    for re in SKIPPED_RES.iter() {
        body = re.replace_all(&body, "").into_owned();
    }
    body = MARKER_RE.replace_all(&body, "").into_owned();

    // Markup whitespace is insignificant; structure comes from the tags
    body = WHITESPACE_RE.replace_all(&body, " ").into_owned();
    body = LINE_BREAK_RE.replace_all(&body, "\n").into_owned();
    body = BLOCK_TAG_RE.replace_all(&body, "\n\n").into_owned();
    body = TAG_RE.replace_all(&body, "").into_owned();

    let decoded = decode_entities(&body);
    let lines: Vec<&str> = decoded
        .lines()
        .map(str::trim)
        .filter(|line| !READ_FULL_CHAPTER_RE.is_match(line))
        .collect();

    normalize_whitespace(&lines.join("\n"))
}

/// The passage container and what follows it, up to the footnotes.
/// Pages without a recognizable container are used whole.
fn passage_body(html: &str) -> &str {
    let Some(start) = BODY_START_RE.find(html) else {
        return html;
    };
    let body = &html[start.start()..];
    match BODY_END_RE.find(body) {
        Some(end) if end.start() > 0 => &body[..end.start()],
        _ => body,
    }
}

/// Trim trailing space per line, squeeze blank-line runs down to one and
/// drop blank lines at both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim_end) {
        if line.is_empty() && out.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Decode named and numeric HTML character references.
/// Unknown names are left as they are.
pub fn decode_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32).map(String::from)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32).map(String::from)
            } else {
                named_entity(entity).map(String::from)
            };
            decoded.unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn named_entity(name: &str) -> Option<&'static str> {
    let s = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        "ensp" | "emsp" | "thinsp" => " ",
        "shy" | "zwj" | "zwnj" => "",
        "ndash" => "–",
        "mdash" => "—",
        "hellip" => "…",
        "lsquo" => "‘",
        "rsquo" => "’",
        "sbquo" => "‚",
        "ldquo" => "“",
        "rdquo" => "”",
        "bdquo" => "„",
        "laquo" => "«",
        "raquo" => "»",
        "middot" => "·",
        "bull" => "•",
        "copy" => "©",
        "reg" => "®",
        "trade" => "™",
        "para" => "¶",
        "sect" => "§",
        _ => return None,
    };
    Some(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use crate::source::VerseOfTheDay;

    const PAGE: &str = r##"<!DOCTYPE html>
<html><head><title>Revelation 3:20 NIV</title><style>.x{color:red}</style></head>
<body>
<nav class="top-nav"><a href="/">Bible Gateway</a> Log In</nav>
<header><h1>Bible Gateway passage</h1></header>
<div class="passage-text">
  <div class='passage-content passage-class-0'>
    <div class="version-NIV result-text-style-normal text-html">
      <h1 class="passage-display">Revelation 3:20</h1>
      <h3><span id="en-NIV-30761" class="text Rev-3-20">To the Church in Laodicea</span></h3>
      <p class="verse"><span id="en-NIV-30760" class="text Rev-3-20"><sup class="versenum">20&nbsp;</sup>Here I am! I stand at the door and knock.<sup data-fn='#fen-NIV-30760a' class='footnote'>[<a href="#fen-NIV-30760a">a</a>]</sup> If anyone hears my voice and opens the door, I will come in and eat with that person, and they with me.<sup class='crossreference' data-cr='#cen-NIV-30760A'>(<a href="#cen-NIV-30760A">A</a>)</sup></span></p>
      <a class="full-chap-link" href="/passage/?search=Revelation%203&amp;version=NIV">Read full chapter</a>
      <div class="footnotes"><h4>Footnotes</h4><ol><li id="fen-NIV-30760a">Or <i>knock</i></li></ol></div>
    </div>
  </div>
</div>
<footer>&copy; Bible Gateway</footer>
<script>window.bg = {};</script>
</body></html>"##;

    #[test]
    fn test_clean_passage_keeps_only_verse_text() {
        let text = clean_passage_html(PAGE);
        assert_eq!(
            text,
            "Here I am! I stand at the door and knock. If anyone hears my voice and opens the door, I will come in and eat with that person, and they with me."
        );
    }

    #[test]
    fn test_clean_passage_poetry_lines() {
        let html = r#"<div class="passage-text"><div class="poetry"><p class="line"><span class="chapternum">23&nbsp;</span>The <span class="small-caps">Lord</span> is my shepherd, I lack nothing.<br /><span class="indent-1"><sup class="versenum">2&nbsp;</sup>He makes me lie down in green pastures,</span></p><p class="line">he leads me beside quiet waters,</p></div></div>"#;
        assert_eq!(
            clean_passage_html(html),
            "The Lord is my shepherd, I lack nothing.\nHe makes me lie down in green pastures,\n\nhe leads me beside quiet waters,"
        );
    }

    #[test]
    fn test_clean_passage_drops_localized_call_to_action() {
        let html = r#"<div class="passage-text"><p>Се, стою у двери и стучу.</p><a href="/x">Читать всю главу</a></div>"#;
        assert_eq!(clean_passage_html(html), "Се, стою у двери и стучу.");
    }

    #[test]
    fn test_clean_passage_without_container_uses_whole_page() {
        let html = "<html><body><nav>menu</nav><p>In the beginning</p></body></html>";
        assert_eq!(clean_passage_html(html), "In the beginning");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            decode_entities("&ldquo;Love&rdquo; &amp; peace &#8212; &#x263A; &unknown;"),
            "“Love” & peace — ☺ &unknown;"
        );
    }

    #[test]
    fn test_decode_entities_single_pass() {
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_normalize_whitespace() {
        let text = "\n\n  \nfirst   \n\n\n\nsecond\n   \n\n";
        assert_eq!(normalize_whitespace(text), "first\n\nsecond");
    }

    struct FailingSource;

    #[async_trait]
    impl PassageSource for FailingSource {
        async fn verse_of_the_day(&self, _translation: &str) -> Result<VerseOfTheDay> {
            Err(anyhow!("offline"))
        }

        async fn passage_html(&self, _reference: &str, _translation: &str) -> Result<String> {
            Err(anyhow!("connection reset"))
        }
    }

    #[tokio::test]
    async fn test_fetch_failure_degrades_to_empty() {
        let fetcher = PassageFetcher::new(FailingSource);
        assert_eq!(fetcher.fetch("Rev 3:20", "NIV").await, "");
    }
}
