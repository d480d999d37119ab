use chrono::Local;
use tracing::{info, warn};

use crate::aggregator::ContentAggregator;
use crate::ai::{ExplanationGenerator, GeminiClient, TextModel};
use crate::config::Config;
use crate::error::{Result, VerseError};
use crate::message::{compose_message, DailyMessage};
use crate::source::{BibleGatewayClient, PassageSource};
use crate::telegram::Messenger;

const DATE_FORMAT: &str = "%d.%m.%Y";

/// Builds the day's message from its parts.
pub struct DailyMessageService<S, M> {
    aggregator: ContentAggregator<S>,
    explainer: ExplanationGenerator<M>,
    primary_version: String,
    secondary_version: String,
}

impl DailyMessageService<BibleGatewayClient, GeminiClient> {
    /// Production wiring: Bible Gateway for text, Gemini for explanations
    /// (disabled when no key is configured).
    pub fn from_config(config: &Config) -> Self {
        let model = config.google_api_key.as_deref().map(GeminiClient::new);
        Self::new(
            ContentAggregator::new(BibleGatewayClient::new()),
            ExplanationGenerator::new(model, config.max_retries()),
            config.primary_version(),
            config.secondary_version(),
        )
    }
}

impl<S: PassageSource, M: TextModel> DailyMessageService<S, M> {
    pub fn new(
        aggregator: ContentAggregator<S>,
        explainer: ExplanationGenerator<M>,
        primary_version: &str,
        secondary_version: &str,
    ) -> Self {
        Self {
            aggregator,
            explainer,
            primary_version: primary_version.to_string(),
            secondary_version: secondary_version.to_string(),
        }
    }

    /// Collect both translations and the explanation.
    ///
    /// Fails only if the primary citation cannot be retrieved; a missing
    /// secondary translation or explanation just shrinks the message.
    pub async fn build_message(&self, date: &str) -> Result<DailyMessage> {
        let (primary, secondary) = tokio::join!(
            self.aggregator.fetch_daily_passage(&self.primary_version),
            self.aggregator.fetch_daily_passage(&self.secondary_version),
        );

        let primary = primary?;
        let secondary = match secondary {
            Ok(passage) => Some(passage),
            Err(e) => {
                warn!("Secondary translation unavailable: {}", e);
                None
            }
        };

        let explanation = self
            .explainer
            .explain(&primary.content, &primary.display_ref)
            .await;

        Ok(DailyMessage {
            date: date.to_string(),
            primary,
            secondary,
            explanation,
        })
    }

    pub async fn daily_message_for(&self, date: &str) -> Result<String> {
        let message = self.build_message(date).await?;
        Ok(compose_message(&message))
    }

    /// Today's message, dated with the local date.
    pub async fn daily_message(&self) -> Result<String> {
        let date = Local::now().format(DATE_FORMAT).to_string();
        self.daily_message_for(&date).await
    }

    /// Build today's message and hand it to the messenger.
    pub async fn deliver<T: Messenger>(&self, messenger: &T, chat_id: &str) -> Result<()> {
        info!("Preparing to send daily verse...");
        let message = self.daily_message().await?;

        messenger
            .send(chat_id, &message)
            .await
            .map_err(VerseError::Delivery)?;

        info!("Successfully sent verse to chat ID: {}", chat_id);
        Ok(())
    }
}
