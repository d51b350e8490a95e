//! Provider-neutral completion types and the `LlmProvider` trait.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

/// One turn of a chat-style completion request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Concatenated system instructions, if any.
    pub fn system_prompt(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n\n"))
        }
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    /// The output budget ran out; the text may end mid-sentence.
    Length,
}

impl FinishReason {
    /// `Length` when the reported output fills the requested budget.
    pub fn from_usage(output_tokens: u64, max_tokens: Option<u32>) -> Self {
        match max_tokens {
            Some(max) if output_tokens >= u64::from(max) => Self::Length,
            _ => Self::Stop,
        }
    }
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: FinishReason,
}

/// A chat-completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier, for logs.
    fn model_name(&self) -> &str;

    /// (input, output) cost in USD per token.
    fn cost_per_token(&self) -> (Decimal, Decimal);

    /// Run one completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

/// Estimated USD cost of one response.
pub fn estimate_cost(provider: &dyn LlmProvider, response: &CompletionResponse) -> Decimal {
    let (input, output) = provider.cost_per_token();
    input * Decimal::from(response.input_tokens) + output * Decimal::from(response.output_tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    struct Fixed;

    #[async_trait]
    impl LlmProvider for Fixed {
        fn model_name(&self) -> &str {
            "fixed"
        }
        fn cost_per_token(&self) -> (Decimal, Decimal) {
            (dec!(0.000003), dec!(0.000015))
        }
        async fn complete(
            &self,
            _request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            unimplemented!()
        }
    }

    #[test]
    fn system_prompt_joins_system_turns_only() {
        let req = CompletionRequest::new(vec![
            ChatMessage::system("a"),
            ChatMessage::user("ignored"),
            ChatMessage::system("b"),
        ]);
        assert_eq!(req.system_prompt().as_deref(), Some("a\n\nb"));
        assert!(CompletionRequest::new(vec![ChatMessage::user("x")])
            .system_prompt()
            .is_none());
    }

    #[test]
    fn builder_sets_sampling_options() {
        let req = CompletionRequest::new(vec![])
            .with_temperature(0.2)
            .with_max_tokens(128);
        assert_eq!(req.temperature, Some(0.2));
        assert_eq!(req.max_tokens, Some(128));
    }

    #[test]
    fn finish_reason_from_usage() {
        assert_eq!(FinishReason::from_usage(128, Some(128)), FinishReason::Length);
        assert_eq!(FinishReason::from_usage(127, Some(128)), FinishReason::Stop);
        assert_eq!(FinishReason::from_usage(4096, None), FinishReason::Stop);
    }

    #[test]
    fn cost_uses_both_token_counts() {
        let response = CompletionResponse {
            content: String::new(),
            input_tokens: 1000,
            output_tokens: 100,
            finish_reason: FinishReason::Stop,
        };
        assert_eq!(estimate_cost(&Fixed, &response), dec!(0.0045));
    }
}
