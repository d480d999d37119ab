pub mod aggregator;
pub mod ai;
pub mod config;
pub mod error;
pub mod message;
pub mod passage;
pub mod reference;
pub mod service;
pub mod source;
pub mod telegram;

// Re-export main types for convenience
pub use aggregator::{ContentAggregator, DailyPassage};
pub use ai::{sanitize, Backoff, ExplanationGenerator, GeminiClient, GeminiModel, Generation, ModelBudget, TextModel};
pub use config::Config;
pub use error::VerseError;
pub use message::{compose_message, DailyMessage};
pub use passage::{clean_passage_html, PassageFetcher};
pub use reference::{parse_citation, PassageRef};
pub use service::DailyMessageService;
pub use source::{BibleGatewayClient, PassageSource, VerseOfTheDay};
pub use telegram::{Messenger, TelegramClient};
