//! Final message layout (Telegram legacy Markdown).

use crate::aggregator::DailyPassage;

const TITLE: &str = "📖 *Стих дня*";
const SECONDARY_MARK: &str = "🇬🇧";
const EXPLANATION_LABEL: &str = "💡 *Пояснение*";

/// Everything that goes into one day's message.
#[derive(Debug, Clone)]
pub struct DailyMessage {
    pub date: String,
    pub primary: DailyPassage,
    pub secondary: Option<DailyPassage>,
    pub explanation: String,
}

/// Lay the message out section by section. Sections without content
/// (secondary translation, explanation) are left out entirely.
pub fn compose_message(message: &DailyMessage) -> String {
    let mut sections = Vec::new();

    sections.push(format!(
        "{} — {}\n{}",
        TITLE,
        escape_markdown(&message.date),
        styled(&message.primary.display_ref, '_')
    ));
    sections.push(escape_markdown(&message.primary.content));

    if let Some(secondary) = message
        .secondary
        .as_ref()
        .filter(|s| !s.content.trim().is_empty())
    {
        sections.push(format!(
            "{} {}\n{}",
            SECONDARY_MARK,
            styled(&secondary.display_ref, '*'),
            styled(&secondary.content, '_')
        ));
    }

    if !message.explanation.trim().is_empty() {
        sections.push(format!(
            "{}\n{}",
            EXPLANATION_LABEL,
            escape_markdown(&message.explanation)
        ));
    }

    sections.join("\n\n")
}

fn is_markdown_special(c: char) -> bool {
    matches!(c, '_' | '*' | '`' | '[')
}

/// Escape the characters legacy Markdown treats as entity delimiters.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_markdown_special(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Wrap each line of `text` in a bold (`*`) or italic (`_`) entity.
///
/// Legacy Markdown rejects escapes inside an entity, so the entity is closed
/// before every special character and reopened after its escape.
fn styled(text: &str, marker: char) -> String {
    text.lines()
        .map(|line| {
            let mut out = String::with_capacity(line.len() + 2);
            let mut run = String::new();
            for c in line.chars() {
                if is_markdown_special(c) {
                    push_entity(&mut out, &run, marker);
                    run.clear();
                    out.push('\\');
                    out.push(c);
                } else {
                    run.push(c);
                }
            }
            push_entity(&mut out, &run, marker);
            out
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_entity(out: &mut String, run: &str, marker: char) {
    if run.is_empty() {
        return;
    }
    out.push(marker);
    out.push_str(run);
    out.push(marker);
}
