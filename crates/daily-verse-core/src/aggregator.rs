use futures_util::future::join_all;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, VerseError};
use crate::passage::{clean_passage_html, PassageFetcher};
use crate::reference::parse_citation;
use crate::source::PassageSource;

/// The day's passage for one translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyPassage {
    pub content: String,
    pub display_ref: String,
}

/// Turns the provider's verse of the day into the full passage text.
#[derive(Clone)]
pub struct ContentAggregator<S> {
    fetcher: PassageFetcher<S>,
}

impl<S: PassageSource> ContentAggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            fetcher: PassageFetcher::new(source),
        }
    }

    pub fn fetcher(&self) -> &PassageFetcher<S> {
        &self.fetcher
    }

    /// Fetch today's citation and every passage it names.
    ///
    /// Only the citation lookup is fatal. Passages that fail are skipped,
    /// and the rest keep the order the citation lists them in.
    pub async fn fetch_daily_passage(&self, translation: &str) -> Result<DailyPassage> {
        info!("Fetching verse from Bible Gateway for version: {}", translation);

        let votd = self
            .fetcher
            .source()
            .verse_of_the_day(translation)
            .await
            .map_err(|source| VerseError::CitationUnavailable {
                translation: translation.to_string(),
                source,
            })?;

        let refs = parse_citation(&votd.display_ref);
        let texts = join_all(
            refs.iter()
                .map(|reference| self.fetcher.fetch(reference, translation)),
        )
        .await;

        let mut content = join_passages(&texts);
        if content.is_empty() {
            warn!(
                "No passage text for \"{}\" ({}), using the short verse of the day text",
                votd.display_ref, translation
            );
            content = clean_passage_html(&votd.text);
        }

        info!(
            "Fetched \"{}\" ({}): {} of {} passages",
            votd.display_ref,
            translation,
            texts.iter().filter(|t| !t.is_empty()).count(),
            refs.len()
        );

        Ok(DailyPassage {
            content,
            display_ref: votd.display_ref,
        })
    }
}

/// Join fetched passages with newlines, skipping the ones that came back empty.
pub fn join_passages(texts: &[String]) -> String {
    texts
        .iter()
        .filter(|t| !t.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n")
}
