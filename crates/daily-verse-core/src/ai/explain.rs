//! Short AI explanations of the daily passage.
//!
//! The generator walks an ordered plan of models, each with its own attempt
//! budget. Attempts on one model are sequential with exponential backoff;
//! when the budget runs out the next model starts from attempt 1. Whatever
//! happens, the caller gets a string back, and an empty one means "no
//! explanation today".

use std::time::Duration;

use anyhow::Result;
use rand::Rng;
use tracing::{debug, error, info, warn};

use super::model::GeminiModel;
use super::sanitize::sanitize;
use super::{Generation, TextModel};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
const BASE_DELAY: Duration = Duration::from_millis(500);
const MAX_JITTER: Duration = Duration::from_millis(200);

const SYSTEM_INSTRUCTION: &str = "Ты — краткий и уважительный помощник-богослов, который объясняет библейские стихи по-русски. \
Напиши 2–4 предложения. Сразу переходи к сути, без приветствий и вступлений. \
Не используй списки, эмодзи, Markdown. Не давай выводов вроде «надеюсь, это помогло». \
Пиши только своими словами, не цитируй входной текст; не воспроизводи длинные фрагменты. \
Сфокусируйся на историко-культурном контексте (если уместно), ключевой мысли и практическом выводе.";

const RECITATION_GUARD: &str = "Пожалуйста, перефразируй своими словами, без цитирования и ссылок.";

/// Exponential backoff with bounded random jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    jitter: Duration,
}

impl Backoff {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// No waiting at all between attempts.
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Wait after failed attempt `attempt` (1-based): `base * 2^(attempt-1) + jitter`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::thread_rng().gen_range(0..jitter_ms)
        };
        self.exponential(attempt) + Duration::from_millis(jitter)
    }

    fn exponential(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        self.base.saturating_mul(1 << shift)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(BASE_DELAY, MAX_JITTER)
    }
}

/// One entry of the fallback plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelBudget {
    pub model: String,
    pub attempts: u32,
}

impl ModelBudget {
    pub fn new(model: &str, attempts: u32) -> Self {
        Self {
            model: model.to_string(),
            attempts: attempts.max(1),
        }
    }
}

pub struct ExplanationGenerator<M> {
    model: Option<M>,
    plan: Vec<ModelBudget>,
    backoff: Backoff,
}

impl<M: TextModel> ExplanationGenerator<M> {
    /// `None` disables explanations. A `max_retries` of zero means the default.
    pub fn new(model: Option<M>, max_retries: u32) -> Self {
        if model.is_none() {
            warn!("GOOGLE_API_KEY is not configured. AI explanations are disabled.");
        }

        let attempts = if max_retries == 0 {
            DEFAULT_MAX_RETRIES
        } else {
            max_retries
        };
        let plan = GeminiModel::all()
            .iter()
            .map(|m| ModelBudget::new(m.as_str(), attempts))
            .collect();

        Self {
            model,
            plan,
            backoff: Backoff::default(),
        }
    }

    pub fn with_plan(mut self, plan: Vec<ModelBudget>) -> Self {
        self.plan = plan;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub fn plan(&self) -> &[ModelBudget] {
        &self.plan
    }

    /// Explain `passage_text` in a few sentences. Never fails; `""` means
    /// explanations are disabled, every attempt failed, or the model said
    /// nothing worth keeping.
    pub async fn explain(&self, passage_text: &str, reference: &str) -> String {
        let Some(model) = &self.model else {
            return String::new();
        };
        if passage_text.trim().is_empty() {
            return String::new();
        }

        let prompt = build_user_prompt(passage_text, reference);

        for budget in &self.plan {
            for attempt in 1..=budget.attempts {
                let failure = match self.attempt(model, &budget.model, &prompt).await {
                    Ok(Some(text)) => {
                        let explanation = sanitize(&text);
                        if explanation.is_empty() {
                            warn!("AI explanation from {} was empty after cleanup", budget.model);
                        } else {
                            info!(
                                "AI explanation for {} from {} on attempt {}",
                                reference, budget.model, attempt
                            );
                        }
                        return explanation;
                    }
                    Ok(None) => "empty candidates".to_string(),
                    Err(e) => format!("{:#}", e),
                };

                if attempt < budget.attempts {
                    let delay = self.backoff.delay(attempt);
                    warn!(
                        "AI explanation {} attempt {} failed: {}. Retrying in {:?}...",
                        budget.model, attempt, failure, delay
                    );
                    tokio::time::sleep(delay).await;
                } else {
                    warn!(
                        "AI explanation failed on {} after {} attempts: {}",
                        budget.model, budget.attempts, failure
                    );
                }
            }
        }

        error!("AI explanation for {} failed on every model", reference);
        String::new()
    }

    /// One attempt. A recitation refusal gets a single immediate retry with
    /// a stricter prompt that does not count against the budget.
    async fn attempt(&self, model: &M, name: &str, prompt: &str) -> Result<Option<String>> {
        let generation = model.generate(name, SYSTEM_INSTRUCTION, prompt).await?;
        if !generation.text.trim().is_empty() {
            return Ok(Some(generation.text));
        }
        log_diagnostics(&generation, name, "produced empty text");

        if generation.is_recitation_blocked() {
            debug!("{} refused with recitation, retrying with amended prompt", name);
            let amended = format!("{}\n{}", prompt, RECITATION_GUARD);
            let retried = model.generate(name, SYSTEM_INSTRUCTION, &amended).await?;
            if !retried.text.trim().is_empty() {
                return Ok(Some(retried.text));
            }
            log_diagnostics(&retried, name, "recitation retry also empty");
        }

        Ok(None)
    }
}

fn build_user_prompt(passage_text: &str, reference: &str) -> String {
    format!(
        "Стих: {}\nТекст стиха:\n{}\n\n\
         Задача: кратко объясни смысл стиха (2–4 предложения) своими словами на русском.\n\
         Не цитируй текст из стиха; не приводи дословные фразы длиннее 10 слов подряд.",
        reference, passage_text
    )
}

fn log_diagnostics(generation: &Generation, model: &str, msg: &str) {
    warn!(
        "{} {}. blockReason={:?} finishReason={:?} safety={:?}",
        model, msg, generation.block_reason, generation.finish_reason, generation.safety_categories
    );
}
