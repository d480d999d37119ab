pub mod biblegateway;

pub use biblegateway::BibleGatewayClient;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

/// The provider's "verse of the day" record for one translation.
#[derive(Debug, Clone, Deserialize)]
pub struct VerseOfTheDay {
    /// Short inline rendering, may contain HTML entities.
    #[serde(default)]
    pub text: String,
    pub display_ref: String,
}

/// Where scripture comes from.
///
/// Both calls are plain lookups with no side effects, so implementations
/// can be shared freely between concurrent fetches.
#[async_trait]
pub trait PassageSource: Send + Sync {
    async fn verse_of_the_day(&self, translation: &str) -> Result<VerseOfTheDay>;

    /// Raw HTML page for a single reference.
    async fn passage_html(&self, reference: &str, translation: &str) -> Result<String>;
}
