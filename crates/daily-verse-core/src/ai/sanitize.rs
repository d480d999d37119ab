//! Cleanup of model output before it goes into a message.

use std::sync::LazyLock;

use regex::Regex;

/// Openers the model likes to start with (Russian and English).
const LEADING_PHRASES: &[&str] = &[
    r"конечно",
    r"итак",
    r"давайте",
    r"здравствуйте",
    r"привет",
    r"добрый\s+(?:день|вечер|утро)",
    r"доброе\s+утро",
    r"вкратце",
    r"кратко",
    r"разумеется",
    r"действительно",
    r"несомненно",
    r"важно\s+отметить\s*,?\s+что",
    r"sure",
    r"certainly",
    r"of\s+course",
    r"absolutely",
    r"hello",
    r"hi",
    r"in\s+short",
    r"briefly",
];

/// Closers, anchored at the end of the text.
const TRAILING_PHRASES: &[&str] = &[
    r"надеюсь,?\s+это\s+помогло[.!]?",
    r"будем\s+помнить[.!]?",
    r"в\s+заключени[еи][,.\s].*",
    r"hope\s+this\s+helps[.!]?",
    r"in\s+conclusion[,.\s].*",
];

const QUOTE_PAIRS: &[(char, char)] = &[('"', '"'), ('“', '”'), ('«', '»'), ('„', '“')];

static LEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = LEADING_PHRASES.join("|");
    Regex::new(&format!(r"(?i)^(?:(?:{alternatives})\b[,!.:\s\-—]*)+")).unwrap()
});

static TRAILING_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = TRAILING_PHRASES.join("|");
    Regex::new(&format!(r"(?is)\s*\b(?:{alternatives})\s*$")).unwrap()
});

static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static PUNCTUATION_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\p{P}]*$").unwrap());

/// Strip filler openers and closers, one pair of enclosing quotes and
/// redundant whitespace. Text that is nothing but punctuation becomes `""`.
///
/// Passes repeat until nothing changes, so `sanitize(sanitize(x)) == sanitize(x)`.
pub fn sanitize(text: &str) -> String {
    let mut current = sanitize_once(text);
    loop {
        let next = sanitize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_once(text: &str) -> String {
    let text = text.trim();
    let text = LEADING_RE.replace(text, "");
    let text = TRAILING_RE.replace(&text, "");
    let text = strip_enclosing_quotes(text.trim());
    let text = WHITESPACE_RE.replace_all(text, " ");
    let text = text.trim();

    if PUNCTUATION_ONLY_RE.is_match(text) {
        String::new()
    } else {
        text.to_string()
    }
}

/// Remove quotes only when one pair wraps the whole text and that pair's
/// own marks do not appear inside it. Other quote styles may nest.
fn strip_enclosing_quotes(text: &str) -> &str {
    for &(open, close) in QUOTE_PAIRS {
        let Some(inner) = text
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        else {
            continue;
        };
        let nested = inner.chars().any(|c| c == open || c == close);
        if !nested {
            return inner.trim();
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_leading_phrases() {
        assert_eq!(
            sanitize("Конечно! Итак, этот стих говорит о любви Бога."),
            "этот стих говорит о любви Бога."
        );
        assert_eq!(
            sanitize("Sure, here the apostle speaks about patience."),
            "here the apostle speaks about patience."
        );
    }

    #[test]
    fn test_leading_phrase_needs_word_boundary() {
        assert_eq!(
            sanitize("His love endures forever."),
            "His love endures forever."
        );
    }

    #[test]
    fn test_strips_trailing_phrases() {
        assert_eq!(
            sanitize("Господь зовёт к покаянию. Надеюсь, это помогло."),
            "Господь зовёт к покаянию."
        );
        assert_eq!(
            sanitize("Christ knocks and waits. In conclusion, open the door."),
            "Christ knocks and waits."
        );
    }

    #[test]
    fn test_strips_single_quote_pair() {
        assert_eq!(sanitize("“Christ waits at the door.”"), "Christ waits at the door.");
        assert_eq!(sanitize("«Бог есть любовь.»"), "Бог есть любовь.");
        assert_eq!(
            sanitize(r#""Love" and "hope" remain."#),
            r#""Love" and "hope" remain."#
        );
    }

    #[test]
    fn test_strips_outer_pair_around_other_quote_style() {
        assert_eq!(
            sanitize("“Христос говорит: «Я есмь путь», и зовёт идти за Ним.”"),
            "Христос говорит: «Я есмь путь», и зовёт идти за Ним."
        );
        assert_eq!(sanitize("«“Бог рядом.”»"), "Бог рядом.");
        assert_eq!(
            sanitize("“A “word” here.”"),
            "“A “word” here.”"
        );
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(sanitize("  one\n\n two\t three  "), "one two three");
    }

    #[test]
    fn test_punctuation_only_is_empty() {
        assert_eq!(sanitize("... "), "");
        assert_eq!(sanitize("  !?, — …"), "");
        assert_eq!(sanitize(""), "");
        assert_eq!(sanitize("Конечно!"), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "“Конечно, смысл в том, что Бог рядом.”",
            "Итак,   «Давайте» разберём.\n\nНадеюсь, это помогло!",
            r#""""nested""""#,
            "Hello! „Text“",
            "...",
            "Plain sentence.",
            "В заключение, всё.",
        ];
        for sample in samples {
            let once = sanitize(sample);
            assert_eq!(sanitize(&once), once, "not idempotent for {sample:?}");
        }
    }

    #[test]
    fn test_quotes_then_leading_phrase() {
        assert_eq!(
            sanitize("“Конечно, смысл в том, что Бог рядом.”"),
            "смысл в том, что Бог рядом."
        );
    }
}
