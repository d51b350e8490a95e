//! Act summarization: download → extract → condense.
//!
//! Any failing step yields a single [`SummarizeError`]; there are no partial
//! summaries.

pub mod document;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{ExtractError, SummarizeError};
use crate::llm::{
    ChatMessage, CompletionRequest, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, FinishReason,
    LlmProvider, estimate_cost,
};

pub use prompt::{INSUFFICIENT_CONTENT_PHRASE, SUMMARY_MAX_CHARS, enforce_cap};

/// Produces a short summary of one act's document.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, document_url: Option<&str>) -> Result<String, SummarizeError>;
}

/// Sampling settings for the summary call.
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    pub max_chars: usize,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_chars: SUMMARY_MAX_CHARS,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Summarizer backed by an HTTP download and an LLM provider.
pub struct LlmSummarizer {
    http: reqwest::Client,
    llm: Arc<dyn LlmProvider>,
    config: SummarizerConfig,
}

impl LlmSummarizer {
    pub fn new(http: reqwest::Client, llm: Arc<dyn LlmProvider>, config: SummarizerConfig) -> Self {
        Self { http, llm, config }
    }

    /// Condense already-extracted act text.
    pub async fn condense(&self, act_text: &str) -> Result<String, SummarizeError> {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(prompt::build_summary_system_prompt(self.config.max_chars)),
            ChatMessage::user(prompt::build_summary_user_prompt(act_text)),
        ])
        .with_temperature(self.config.temperature)
        .with_max_tokens(self.config.max_tokens);

        let response = self.llm.complete(request).await?;
        debug!(
            model = self.llm.model_name(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            cost_usd = %estimate_cost(self.llm.as_ref(), &response),
            "summary generated"
        );
        if response.finish_reason == FinishReason::Length {
            warn!(
                max_tokens = self.config.max_tokens,
                "summary hit the output token budget"
            );
        }

        Ok(enforce_cap(&response.content, self.config.max_chars))
    }
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize(&self, document_url: Option<&str>) -> Result<String, SummarizeError> {
        let url = document_url.ok_or(SummarizeError::NoDocument)?;

        let bytes = document::fetch_document(&self.http, url).await?;

        let text = tokio::task::spawn_blocking(move || document::extract_text(&bytes))
            .await
            .map_err(|e| ExtractError::Malformed(format!("extraction task failed: {e}")))??;
        info!(url, chars = text.chars().count(), "act text extracted");

        self.condense(&text).await
    }
}
