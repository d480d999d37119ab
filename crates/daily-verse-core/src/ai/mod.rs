pub mod explain;
pub mod gemini;
pub mod model;
pub mod sanitize;

pub use explain::{Backoff, ExplanationGenerator, ModelBudget};
pub use gemini::GeminiClient;
pub use model::GeminiModel;
pub use sanitize::sanitize;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

/// What came back from one generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Generation {
    pub text: String,
    pub block_reason: Option<String>,
    pub finish_reason: Option<String>,
    pub safety_categories: Vec<String>,
}

impl Generation {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Self::default()
        }
    }

    /// The model refused because the answer would reproduce known text.
    pub fn is_recitation_blocked(&self) -> bool {
        let mentions = |s: &str| s.to_uppercase().contains("RECITATION");
        self.block_reason.as_deref().is_some_and(mentions)
            || self.finish_reason.as_deref().is_some_and(mentions)
            || self.safety_categories.iter().any(|c| mentions(c))
    }
}

/// A text generation backend addressed by model name.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, model: &str, system: &str, prompt: &str) -> Result<Generation>;
}

#[async_trait]
impl<T: TextModel + ?Sized> TextModel for Arc<T> {
    async fn generate(&self, model: &str, system: &str, prompt: &str) -> Result<Generation> {
        (**self).generate(model, system, prompt).await
    }
}
